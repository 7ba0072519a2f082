use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

mod loader;
mod paths;

pub use loader::ConfigStore;
pub use paths::{expand_tilde, ConfigPaths};

/// Shell used to run every command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellKind {
    Bash,
    Powershell,
}

impl ShellKind {
    pub fn for_host() -> Self {
        if cfg!(windows) {
            ShellKind::Powershell
        } else {
            ShellKind::Bash
        }
    }

    pub fn program(self) -> &'static str {
        match self {
            ShellKind::Bash => "bash",
            ShellKind::Powershell => "powershell",
        }
    }

    pub fn switch(self) -> &'static str {
        match self {
            ShellKind::Bash => "-c",
            ShellKind::Powershell => "-Command",
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// User facing settings. The model sees a snapshot of these with every
/// request and may change them through a [`SettingsPatch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub history_size: usize,
    pub shell: ShellKind,
    pub model: String,
    pub explain: bool,
    pub autocomplete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            history_size: 10,
            shell: ShellKind::for_host(),
            model: "gpt-4o-mini".to_string(),
            explain: false,
            autocomplete: false,
        }
    }
}

impl Settings {
    /// Overwrites every field the patch carries and leaves the rest alone.
    /// Returns true when at least one field changed.
    pub fn apply(&mut self, patch: &SettingsPatch) -> bool {
        let before = self.clone();

        if let Some(size) = patch.history_size {
            if size == 0 {
                warn!("ignoring history_size=0 from settings patch");
            } else {
                self.history_size = size;
            }
        }
        if let Some(shell) = patch.shell {
            self.shell = shell;
        }
        if let Some(model) = &patch.model {
            self.model = model.clone();
        }
        if let Some(explain) = patch.explain {
            self.explain = explain;
        }
        if let Some(autocomplete) = patch.autocomplete {
            self.autocomplete = autocomplete;
        }

        *self != before
    }

    pub fn summary(&self) -> String {
        format!(
            "Current settings: history_size={}, shell={}, model={}, explain={}, autocomplete={}",
            self.history_size, self.shell, self.model, self.explain, self.autocomplete
        )
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.history_size == 0 {
            return Err(ConfigError::Invalid(
                "history_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial settings produced by the model. Absent fields mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsPatch {
    pub history_size: Option<usize>,
    pub shell: Option<ShellKind>,
    pub model: Option<String>,
    pub explain: Option<bool>,
    pub autocomplete: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self.history_size.is_none()
            && self.shell.is_none()
            && self.model.is_none()
            && self.explain.is_none()
            && self.autocomplete.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 120,
        }
    }
}

/// What happens to the rest of an approved batch once a command fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    #[default]
    Continue,
    Stop,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub on_error: OnError,
}

/// Everything stored in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub backend: BackendConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}
