//! Error types for Cabin operations.
//!
//! This module defines [`CabinError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Health-check failures are never errors; they are recorded in the report
//! - Use `CabinError` for fatal install/link/resolution failures that must
//!   abort the surrounding workflow
//! - Use `anyhow::Error` (via `CabinError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for Cabin operations.
#[derive(Debug, Error)]
pub enum CabinError {
    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Shell command failed or could not be spawned.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Package installation failed. Aborts the surrounding install workflow.
    #[error("Unable to install [{package}]:\n{output}")]
    PackageInstallFailed { package: String, output: String },

    /// Creating or removing the PHP symlink failed.
    #[error("Unable to link [{package}]: {message}")]
    PhpLinkFailed { package: String, message: String },

    /// The linked PHP could not be matched against any supported version.
    #[error("Unable to determine linked PHP from '{input}'")]
    UnresolvedPhpVersion { input: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Cabin operations.
pub type Result<T> = std::result::Result<T, CabinError>;
