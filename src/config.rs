// Configuration file handling
//
// Looks for `schedstore.yml` under the platform config directory
// (e.g. ~/.config/schedstore/schedstore.yml). Every key is optional.

use eyre::{Context, Result, eyre};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_FILE: &str = "scheduler.db";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub db_path: PathBuf,
    /// Fallback tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("schedstore").join("schedstore.yml"))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default location is
    /// read when present and built-in defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.db_path, PathBuf::from("scheduler.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = Config::from_yaml("db_path: /var/lib/sched/tasks.db\n").unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/sched/tasks.db"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_from_yaml_empty() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
    }

    #[test]
    fn test_from_yaml_invalid() {
        assert!(Config::from_yaml("db_path: [unclosed").is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schedstore.yml");
        fs::write(&path, "db_path: tasks.db\nlog_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.db_path, PathBuf::from("tasks.db"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp.path().join("missing.yml"))).is_err());
    }
}
