//! Well-known install-home paths.
//!
//! Cabin keeps its state under a single home directory (by default
//! `~/.config/cabin`): the servable-site registry, driver scripts, logs,
//! certificates, the JSON configuration, and the control socket nginx
//! proxies FastCGI traffic through.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Subdirectories every complete installation carries.
pub const SUBDIRECTORIES: [&str; 4] = ["Drivers", "Sites", "Log", "Certificates"];

/// Configuration file name under the home directory.
pub const CONFIG_FILE: &str = "config.json";

/// Control socket file name under the home directory.
pub const SOCKET_FILE: &str = "cabin.sock";

/// The resolved install home.
#[derive(Debug, Clone)]
pub struct CabinHome {
    root: PathBuf,
}

impl CabinHome {
    /// Resolve the install home, honoring `CABIN_HOME` for relocation.
    pub fn resolve() -> Self {
        let root = std::env::var("CABIN_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_default()
                    .join(".config")
                    .join("cabin")
            });
        Self { root }
    }

    /// Use an explicit root instead of the default location.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the JSON configuration file.
    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Path of the control socket.
    pub fn socket_file(&self) -> PathBuf {
        self.root.join(SOCKET_FILE)
    }

    /// The required subdirectories, in a fixed order.
    pub fn subdirectories(&self) -> Vec<PathBuf> {
        SUBDIRECTORIES.iter().map(|d| self.root.join(d)).collect()
    }

    /// Whether the home contains every required directory and the config file.
    pub fn is_scaffolded(&self) -> bool {
        self.subdirectories().iter().all(|d| d.is_dir()) && self.config_file().is_file()
    }

    /// Create the home directory tree. Existing directories are left alone.
    pub fn scaffold(&self) -> Result<()> {
        for dir in self.subdirectories() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
