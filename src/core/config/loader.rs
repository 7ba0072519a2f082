use std::fs;

use tracing::{debug, warn};

use super::{Config, ConfigError, ConfigPaths};

/// Reads and rewrites the settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    paths: ConfigPaths,
}

impl ConfigStore {
    pub fn new(paths: ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    /// Loads the config file, writing defaults if it is missing. A malformed
    /// file is moved aside and replaced by defaults.
    pub fn load_or_init(&self) -> Result<Config, ConfigError> {
        let path = &self.paths.config_path;

        if !path.exists() {
            debug!(path = %path.display(), "config file missing, writing defaults");
            let config = Config::default();
            self.write(&config)?;
            return Ok(config);
        }

        match self.read() {
            Ok(config) => Ok(config),
            Err(ConfigError::Io(e)) => Err(ConfigError::Io(e)),
            Err(e) => {
                let backup = self.paths.backup_path();
                warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    "config file is malformed ({e}), restoring defaults"
                );
                fs::rename(path, &backup)?;
                let config = Config::default();
                self.write(&config)?;
                Ok(config)
            }
        }
    }

    /// Rewrites the whole file.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        self.write(config)
    }

    fn read(&self) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(&self.paths.config_path)?;
        let config: Config = toml::from_str(&content)?;
        config.settings.validate()?;
        Ok(config)
    }

    fn write(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.paths.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(config)?;
        fs::write(&self.paths.config_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{OnError, ShellKind};
    use std::path::Path;

    fn store_in(dir: &Path) -> ConfigStore {
        let path = dir.join("nested").join("config.toml");
        ConfigStore::new(ConfigPaths::new(path.to_str()).expect("paths"))
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());

        let config = store.load_or_init().expect("load");

        assert_eq!(config, Config::default());
        assert!(store.paths().config_path.exists());
        let written = fs::read_to_string(&store.paths().config_path).expect("read");
        assert!(written.contains("history_size = 10"));
        assert!(written.contains("explain = false"));
        assert!(written.contains("autocomplete = false"));
    }

    #[test]
    fn existing_file_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::create_dir_all(store.paths().config_path.parent().expect("parent")).expect("mkdir");
        fs::write(
            &store.paths().config_path,
            r#"
            [settings]
            history_size = 4
            shell = "bash"
            model = "gpt-4o"
            explain = true
            autocomplete = true

            [session]
            on_error = "stop"
            "#,
        )
        .expect("write");

        let config = store.load_or_init().expect("load");

        assert_eq!(config.settings.history_size, 4);
        assert_eq!(config.settings.shell, ShellKind::Bash);
        assert_eq!(config.settings.model, "gpt-4o");
        assert!(config.settings.explain);
        assert!(config.settings.autocomplete);
        assert_eq!(config.session.on_error, OnError::Stop);
    }

    #[test]
    fn malformed_file_is_backed_up_and_replaced() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::create_dir_all(store.paths().config_path.parent().expect("parent")).expect("mkdir");
        fs::write(&store.paths().config_path, "[settings\nhistory_size = ").expect("write");

        let config = store.load_or_init().expect("load");

        assert_eq!(config, Config::default());
        let backup = fs::read_to_string(store.paths().backup_path()).expect("backup");
        assert!(backup.starts_with("[settings"));
    }

    #[test]
    fn zero_history_size_counts_as_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        fs::create_dir_all(store.paths().config_path.parent().expect("parent")).expect("mkdir");
        fs::write(&store.paths().config_path, "[settings]\nhistory_size = 0\n").expect("write");

        let config = store.load_or_init().expect("load");

        assert_eq!(config.settings.history_size, 10);
    }

    #[test]
    fn saved_config_round_trips_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = store_in(dir.path());
        let mut config = store.load_or_init().expect("load");

        config.settings.explain = true;
        config.settings.history_size = 3;
        store.save(&config).expect("save");

        let reloaded = store.load_or_init().expect("reload");
        assert_eq!(reloaded, config);
    }
}
