//! Configuration file loading.

use crate::config::schema::CabinConfig;
use crate::error::{CabinError, Result};
use crate::paths::CabinHome;
use std::fs;
use std::path::{Path, PathBuf};

/// Read/write access to the configuration file under the cabin home.
///
/// Consumers treat a parse failure as a failed health check, not a fatal
/// error; [`Configuration::read`] surfaces it as [`CabinError::ConfigParse`]
/// and leaves the decision to the caller.
#[derive(Debug, Clone)]
pub struct Configuration {
    path: PathBuf,
}

impl Configuration {
    pub fn new(home: &CabinHome) -> Self {
        Self {
            path: home.config_file(),
        }
    }

    /// Use an explicit file path instead of the home-derived one.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and parse the configuration.
    pub fn read(&self) -> Result<CabinConfig> {
        let content = fs::read_to_string(&self.path).map_err(|_| CabinError::ConfigNotFound {
            path: self.path.clone(),
        })?;

        serde_json::from_str(&content).map_err(|e| CabinError::ConfigParse {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Pretty-print the configuration back to disk.
    pub fn write(&self, config: &CabinConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| CabinError::Other(anyhow::anyhow!(e)))?;
        fs::write(&self.path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn read_missing_file_is_not_found() {
        let temp = TempDir::new().unwrap();
        let config = Configuration::at(temp.path().join("config.json"));

        assert!(matches!(
            config.read(),
            Err(CabinError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn read_malformed_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        let config = Configuration::at(&path);
        assert!(matches!(config.read(), Err(CabinError::ConfigParse { .. })));
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let config = Configuration::at(temp.path().join("config.json"));

        config.write(&CabinConfig::default()).unwrap();
        let loaded = config.read().unwrap();

        assert_eq!(loaded, CabinConfig::default());
    }

    #[test]
    fn write_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let config = Configuration::at(temp.path().join("nested").join("config.json"));

        config.write(&CabinConfig::default()).unwrap();
        assert!(config.path().is_file());
    }
}
