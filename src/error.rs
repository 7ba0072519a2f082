use thiserror::Error;

pub use crate::core::config::ConfigError;

#[derive(Debug, Error)]
pub enum CortexError {
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Ctrl-C error: {0}")]
    CtrlC(#[from] ctrlc::Error),
}

/// Failures of a single exchange with the model backend.
///
/// None of these end the session: the loop reports them and waits for the
/// next prompt.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no API key found in ${0}")]
    MissingApiKey(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("backend returned no content")]
    EmptyResponse,

    #[error("could not read response as {shape}: {reason}")]
    Coercion { shape: &'static str, reason: String },
}
