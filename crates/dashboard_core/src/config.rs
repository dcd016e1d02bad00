//! Runtime configuration for dashboard hosts.
//!
//! Values come from an optional TOML file and are then overridden by
//! `DASHBOARD_*` environment variables. Missing keys fall back to defaults.

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "DASHBOARD_DB_PATH";
pub const ENV_FILES_ROOT: &str = "DASHBOARD_FILES_ROOT";
pub const ENV_LOG_LEVEL: &str = "DASHBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "DASHBOARD_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Directory exposed through the file browser.
    pub files_root: PathBuf,
    pub log_level: String,
    /// Rotating log file directory; logs go to stderr when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("dashboard.db"),
            files_root: PathBuf::from("data/files"),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Loads `path` when given, then applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Replaces fields whose variable `lookup` returns a non-blank value for.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(db_path) = value(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(files_root) = value(ENV_FILES_ROOT) {
            self.files_root = PathBuf::from(files_root);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(log_dir) = value(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(log_dir));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DashboardConfig, ENV_DB_PATH, ENV_LOG_DIR};
    use std::path::PathBuf;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = DashboardConfig::from_toml_str("db_path = \"lab.db\"\n").unwrap();
        assert_eq!(config.db_path, PathBuf::from("lab.db"));
        assert_eq!(config.files_root, PathBuf::from("data/files"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn environment_overrides_file_values() {
        let config = DashboardConfig::from_toml_str("db_path = \"lab.db\"\n")
            .unwrap()
            .with_overrides(|key| match key {
                ENV_DB_PATH => Some("/srv/dashboard.db".to_string()),
                ENV_LOG_DIR => Some("   ".to_string()),
                _ => None,
            });
        assert_eq!(config.db_path, PathBuf::from("/srv/dashboard.db"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn unreadable_and_malformed_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            DashboardConfig::from_file(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "db_path = [").unwrap();
        assert!(matches!(
            DashboardConfig::from_file(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }
}
