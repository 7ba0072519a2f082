pub mod config;
pub mod state;

pub use config::{Config, ConfigStore, OnError, Settings, SettingsPatch, ShellKind};
pub use state::{PromptMode, SessionContext};
