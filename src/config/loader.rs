// src/config/loader.rs
//! Configuration loading from TOML files with path discovery

use crate::config::{constants::paths, SystemConfig};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Explicitly requested file does not exist
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML syntax or deserialization failure
    #[error("configuration parse error: {0}")]
    Parse(String),

    /// Underlying filesystem failure
    #[error("configuration I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value that parsed but is semantically invalid
    #[error("invalid configuration: {field}: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Loads [`SystemConfig`] from the first configuration file that exists.
///
/// Search order: the `FRAMEGRAB_CONFIG` environment variable, then
/// `framegrab.toml` in the working directory, then the system-wide file.
/// When no file exists, defaults apply.
pub struct ConfigLoader {
    config_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader with the default search paths.
    pub fn new() -> Self {
        Self {
            config_paths: Self::discover_config_paths(),
        }
    }

    /// Create a loader restricted to the given paths.
    pub fn with_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            config_paths: paths,
        }
    }

    /// Load the first existing configuration file, or defaults if none.
    pub fn load(&self) -> Result<SystemConfig, ConfigError> {
        for path in &self.config_paths {
            if path.exists() {
                let config = Self::load_file(path)?;
                return Ok(config);
            }
        }

        let config = SystemConfig::default();
        config.validate()?;
        Ok(config)
    }

    /// Load and validate one specific configuration file.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<SystemConfig, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)?;
        let config: SystemConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Paths this loader will consult, in order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.config_paths
    }

    fn discover_config_paths() -> Vec<PathBuf> {
        let mut discovered = Vec::new();

        if let Ok(path) = std::env::var(paths::ENV_CONFIG_PATH) {
            discovered.push(PathBuf::from(path));
        }
        discovered.push(PathBuf::from(paths::DEFAULT_CONFIG_FILE));
        discovered.push(PathBuf::from(paths::SYSTEM_CONFIG_FILE));

        discovered
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_file_applies_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\npool_capacity = 3").unwrap();

        let config = ConfigLoader::load_file(file.path()).unwrap();
        assert_eq!(config.engine.pool_capacity, 3);
        assert_eq!(
            config.engine.fill_timeout_ms,
            crate::config::constants::acquisition::DEFAULT_FILL_TIMEOUT_MS
        );
    }

    #[test]
    fn test_load_file_rejects_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "engine = not-a-table").unwrap();

        assert!(matches!(
            ConfigLoader::load_file(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\npool_capacity = 0").unwrap();

        assert!(matches!(
            ConfigLoader::load_file(file.path()),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_reported() {
        assert!(matches!(
            ConfigLoader::load_file("/nonexistent/framegrab.toml"),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_loader_falls_back_to_defaults() {
        let loader = ConfigLoader::with_paths(vec![PathBuf::from("/nonexistent/framegrab.toml")]);
        let config = loader.load().unwrap();
        assert_eq!(
            config.engine.pool_capacity,
            crate::config::constants::pool::DEFAULT_CAPACITY
        );
    }
}
