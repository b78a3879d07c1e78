//! Service and package abstraction over the two backend families.
//!
//! "Is X installed", "is X running", "is X running as root", and
//! "install/link/restart X" mean different things to Homebrew (per-user and
//! per-root `brew services` instances) and to apt+systemd (system-wide,
//! root-only units). [`ServiceBackend`] is the capability the rest of the
//! system depends on; [`Homebrew`] and [`Apt`] are its two variants and
//! callers never branch on which one is active.

pub mod apt;
pub mod homebrew;
pub mod php;
pub mod record;

pub use apt::Apt;
pub use homebrew::Homebrew;
pub use php::{are_php_versions_equal, parse_php_path, PhpIdentity};
pub use record::ServiceRecord;

use crate::error::{CabinError, Result};
use crate::shell::{Platform, Runner};
use std::path::PathBuf;

/// Uniform interface to the host's package and service managers.
pub trait ServiceBackend {
    /// Backend family label, for logs and check descriptions.
    fn name(&self) -> &'static str;

    /// Whether the package manager itself is installed and reachable.
    fn available(&self) -> bool;

    /// Whether an exact package token is installed.
    fn installed(&self, package: &str) -> bool;

    /// Install a package unless it is already present.
    ///
    /// Requested repositories are enabled first; packages from the limited
    /// PHP set additionally enable the backend's supplemental PHP repository
    /// with a warning. Install failure is fatal and aborts the caller.
    fn ensure_installed(&self, package: &str, options: &[&str], repositories: &[&str])
        -> Result<()>;

    /// Remove a package. Failures are logged, never fatal.
    fn uninstall(&self, package: &str);

    /// Drop the package manager's download caches. Failures are logged,
    /// never fatal.
    fn cleanup_cache(&self);

    /// The memoized service snapshot for this backend instance.
    ///
    /// The first call fetches and normalizes the raw listing exactly once;
    /// callers needing fresh state construct a new backend.
    fn services(&self) -> &[ServiceRecord];

    fn is_service_running(&self, name: &str, exact: bool) -> bool {
        record::is_running(self.services(), name, exact)
    }

    fn is_service_running_as_root(&self, name: &str, exact: bool) -> bool {
        record::is_running_as_root(self.services(), name, exact)
    }

    fn is_service_running_as_user(&self, name: &str, exact: bool) -> bool {
        record::is_running_as_user(self.services(), name, exact)
    }

    fn start_service(&self, service: &str) -> Result<()>;
    fn stop_service(&self, service: &str) -> Result<()>;
    fn restart_service(&self, service: &str) -> Result<()>;

    /// PHP version tokens this backend can install, newest first.
    fn supported_php_versions(&self) -> &'static [&'static str];

    /// The subset of supported versions that live outside the default
    /// repositories and need the supplemental one enabled.
    fn limited_php_versions(&self) -> &'static [&'static str];

    /// The fixed, well-known PHP executable path for this backend.
    fn php_executable_path(&self) -> PathBuf;

    /// The FastCGI process manager service companion to a PHP formula.
    fn fpm_service_name(&self, formula: &str) -> String;

    /// Identity of whatever the well-known PHP executable resolves to.
    fn linked_php_identity(&self) -> PhpIdentity {
        php::linked_identity(&self.php_executable_path())
    }

    /// The canonical "currently active PHP" label ("php@8.2", "php8.2").
    fn linked_php_formula(&self) -> Result<String> {
        self.linked_php_identity()
            .formula()
            .ok_or_else(|| CabinError::UnresolvedPhpVersion {
                input: self.php_executable_path().display().to_string(),
            })
    }

    /// The supported version token matching the linked formula.
    ///
    /// Every usable installation has a determinable linked PHP; failure to
    /// match is a configuration error, never silently swallowed.
    fn linked_php(&self) -> Result<String> {
        let formula = self.linked_php_formula()?;

        php::match_supported(&formula, self.supported_php_versions())
            .map(|v| v.to_string())
            .ok_or(CabinError::UnresolvedPhpVersion { input: formula })
    }

    /// Point the well-known PHP executable at a version.
    fn link_php(&self, version: &str) -> Result<()>;

    /// Remove a version's claim on the well-known PHP executable.
    fn unlink_php(&self, version: &str) -> Result<()>;

    /// Restart the FPM service backing the currently linked PHP.
    fn restart_linked_php(&self) -> Result<()> {
        let formula = self.linked_php()?;
        self.restart_service(&self.fpm_service_name(&formula))
    }

    /// Whether any supported PHP version is installed.
    fn has_installed_php(&self) -> bool {
        self.supported_php_versions()
            .iter()
            .any(|version| self.installed(version))
    }
}

/// Pick the backend variant for the current platform.
pub fn detect(runner: &dyn Runner) -> Box<dyn ServiceBackend + '_> {
    match Platform::current() {
        Platform::MacOS => Box::new(Homebrew::new(runner)),
        Platform::Linux => Box::new(Apt::new(runner)),
    }
}
