use super::ConfigError;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub config_path: PathBuf,
}

impl ConfigPaths {
    /// Resolves the settings file, `<config_dir>/cortex/config.toml` unless
    /// an explicit path is given.
    pub fn new(custom: Option<&str>) -> Result<Self, ConfigError> {
        let config_path = match custom {
            Some(path) => expand_tilde(path)?,
            None => dirs::config_dir()
                .ok_or(ConfigError::ConfigDirNotFound)?
                .join("cortex")
                .join("config.toml"),
        };

        Ok(ConfigPaths { config_path })
    }

    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .config_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "config.toml".into());
        name.push(".bak");
        self.config_path.with_file_name(name)
    }
}

pub fn expand_tilde(path: &str) -> Result<PathBuf, ConfigError> {
    if path == "~" {
        return dirs::home_dir().ok_or(ConfigError::ConfigDirNotFound);
    }

    match path.strip_prefix("~/") {
        Some(stripped) => {
            let mut home_path = dirs::home_dir().ok_or(ConfigError::ConfigDirNotFound)?;
            for part in stripped.split('/') {
                if !part.is_empty() {
                    home_path.push(part);
                }
            }
            Ok(home_path)
        }
        // "~user/..." is left as is
        None => Ok(Path::new(path).to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_is_used_verbatim() {
        let paths = ConfigPaths::new(Some("/tmp/cortex/custom.toml")).expect("paths");
        assert_eq!(paths.config_path, PathBuf::from("/tmp/cortex/custom.toml"));
    }

    #[test]
    fn backup_sits_next_to_config() {
        let paths = ConfigPaths::new(Some("/etc/cortex/config.toml")).expect("paths");
        assert_eq!(
            paths.backup_path(),
            PathBuf::from("/etc/cortex/config.toml.bak")
        );
    }

    #[test]
    fn tilde_expands_to_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(
            expand_tilde("~/.config/cortex.toml").expect("expand"),
            home.join(".config").join("cortex.toml")
        );
        assert_eq!(expand_tilde("~").expect("expand"), home);
    }

    #[test]
    fn other_user_tilde_is_untouched() {
        assert_eq!(
            expand_tilde("~bob/cortex.toml").expect("expand"),
            PathBuf::from("~bob/cortex.toml")
        );
    }
}
