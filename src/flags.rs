use clap::Parser;
use tracing::Level;

/// Cortex - a shell that takes requests in plain language.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "cortex")]
#[command(version)]
#[command(about = "A conversational shell assistant.", long_about = None)]
pub struct Flags {
    /// Use this settings file instead of the default one
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<String>,

    /// Model to talk to for this session (not saved)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Only log errors
    #[arg(short, long, conflicts_with = "debug")]
    pub quiet: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Flags {
    pub fn log_level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::WARN
        }
    }
}
