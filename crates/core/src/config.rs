//! Engine configuration loading.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(String),

    #[error("failed to read config file {0}: {1}")]
    ReadError(String, #[source] std::io::Error),

    #[error("failed to parse TOML in {0}: {1}")]
    ParseError(String, #[source] toml::de::Error),
}

/// Engine-wide settings. All fields have working defaults so a missing
/// config file is not an error.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one database file per vault. When `None`, the
    /// platform data dir is used (e.g. `~/.local/share/notedex`).
    pub data_dir: Option<PathBuf>,
    /// Number of documents committed per transaction during a full rebuild.
    pub batch_size: usize,
    /// Result cap substituted when a search request carries no usable limit.
    pub search_limit: usize,
    /// Result cap substituted when a suggest request carries no usable limit.
    pub suggest_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            batch_size: 100,
            search_limit: 50,
            suggest_limit: 15,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an explicit path, or from the default
    /// location. An explicit path must exist; the default location is
    /// optional and its absence yields `EngineConfig::default()`.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match config_path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_config_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Ok(Self::default());
        }

        let s = fs::read_to_string(&path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e))?;

        toml::from_str(&s)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e))
    }

    /// Directory the engine stores vault databases in.
    pub fn resolved_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => dir.clone(),
            None => default_data_dir(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        return Path::new(&xdg).join("notedex").join("config.toml");
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("notedex")
        .join("config.toml")
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(|| PathBuf::from(".")).join("notedex")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.batch_size, 100);
        assert_eq!(cfg.search_limit, 50);
        assert_eq!(cfg.suggest_limit, 15);
        assert!(cfg.data_dir.is_none());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
data_dir = "/tmp/notedex-test"
batch_size = 25
"#,
        )
        .unwrap();

        let cfg = EngineConfig::load(Some(&path)).unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/notedex-test")));
        assert_eq!(cfg.batch_size, 25);
        // Unspecified fields keep their defaults
        assert_eq!(cfg.search_limit, 50);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = EngineConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "batch_size = 'not a number").unwrap();

        let result = EngineConfig::load(Some(&path));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_, _)));
    }
}
