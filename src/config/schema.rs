//! Configuration schema definitions for Cabin.
//!
//! This module contains the struct definitions that map to the JSON
//! configuration file format.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for config.json.
///
/// All three keys are required; a file missing any of them fails to parse,
/// which the health check reports as an invalid configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CabinConfig {
    /// Top-level domain served for local sites (e.g. "test").
    pub tld: String,

    /// Loopback address the web server binds to.
    pub loopback: String,

    /// Directories scanned for servable sites.
    pub paths: Vec<PathBuf>,
}

impl Default for CabinConfig {
    fn default() -> Self {
        Self {
            tld: "test".to_string(),
            loopback: "127.0.0.1".to_string(),
            paths: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_complete_config() {
        let raw = r#"{"tld": "test", "loopback": "127.0.0.1", "paths": ["/home/u/Sites"]}"#;
        let config: CabinConfig = serde_json::from_str(raw).unwrap();

        assert_eq!(config.tld, "test");
        assert_eq!(config.loopback, "127.0.0.1");
        assert_eq!(config.paths.len(), 1);
    }

    #[test]
    fn missing_required_key_is_a_parse_error() {
        let raw = r#"{"tld": "test", "loopback": "127.0.0.1"}"#;
        assert!(serde_json::from_str::<CabinConfig>(raw).is_err());
    }

    #[test]
    fn default_round_trips() {
        let config = CabinConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CabinConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }
}
