//! Homebrew backend: brew formulae plus `brew services` instances.
//!
//! Unlike the init-managed backend, brew services can run per-user and
//! per-root simultaneously, so the snapshot merges both listings and tags
//! ownership from the entry's `user` field.

use crate::error::{CabinError, Result};
use crate::services::record::{self, ServiceRecord};
use crate::services::ServiceBackend;
use crate::shell::Runner;
use std::path::PathBuf;
use std::sync::OnceLock;

const SUPPORTED_PHP_VERSIONS: &[&str] = &[
    "php@8.4",
    "php@8.3",
    "php@8.2",
    "php@8.1",
    "php@8.0",
    "php@7.4",
];

/// Formulae that left homebrew-core and now live on the supplemental tap.
const LIMITED_PHP_VERSIONS: &[&str] = &["php@8.0", "php@7.4"];

const PHP_TAP: &str = "shivammathur/php";

pub struct Homebrew<'a> {
    runner: &'a dyn Runner,
    services: OnceLock<Vec<ServiceRecord>>,
}

impl<'a> Homebrew<'a> {
    pub fn new(runner: &'a dyn Runner) -> Self {
        Self {
            runner,
            services: OnceLock::new(),
        }
    }

    fn brew_prefix() -> PathBuf {
        if cfg!(target_arch = "aarch64") {
            PathBuf::from("/opt/homebrew")
        } else {
            PathBuf::from("/usr/local")
        }
    }

    fn tap(&self, repository: &str) {
        self.runner
            .run_or(&format!("brew tap {}", repository), &mut |code, err| {
                tracing::warn!("failed to tap {} (exit {:?}): {}", repository, code, err);
            });
    }

    fn install_or_fail(&self, package: &str, options: &[&str]) -> Result<()> {
        tracing::info!("Installing {}...", package);

        let mut command = format!("brew install {}", package);
        if !options.is_empty() {
            command.push(' ');
            command.push_str(&options.join(" "));
        }

        let mut failure: Option<String> = None;
        self.runner.run_or(&command, &mut |_, err| {
            failure = Some(err.to_string());
        });

        match failure {
            Some(output) => Err(CabinError::PackageInstallFailed {
                package: package.to_string(),
                output,
            }),
            None => Ok(()),
        }
    }

    /// Fetch both service listings. Root-owned instances come first so they
    /// win the name dedupe when a service shows up in both.
    fn fetch_services(&self) -> Vec<ServiceRecord> {
        let mut records = Vec::new();

        let root_raw = self
            .runner
            .run_elevated_or("brew services list --json", &mut |code, err| {
                tracing::debug!("root service listing failed (exit {:?}): {}", code, err);
            });
        records.extend(record::parse_brew_listing(&root_raw));

        let user_raw = self
            .runner
            .run_or("brew services list --json", &mut |code, err| {
                tracing::debug!("user service listing failed (exit {:?}): {}", code, err);
            });
        records.extend(record::parse_brew_listing(&user_raw));

        record::dedupe_by_name(records)
    }

    fn service_command(&self, verb: &str, service: &str) -> Result<()> {
        let command = format!("brew services {} {}", verb, service);
        let result = self.runner.run_elevated(&command)?;

        if result.success {
            Ok(())
        } else {
            Err(CabinError::CommandFailed {
                command,
                code: result.exit_code,
            })
        }
    }
}

impl ServiceBackend for Homebrew<'_> {
    fn name(&self) -> &'static str {
        "Homebrew"
    }

    fn available(&self) -> bool {
        self.runner
            .run("brew --version")
            .map(|r| r.success)
            .unwrap_or(false)
    }

    fn installed(&self, package: &str) -> bool {
        let Ok(result) = self.runner.run("brew list --formula") else {
            return false;
        };

        result.stdout.lines().any(|line| line.trim() == package)
    }

    fn ensure_installed(
        &self,
        package: &str,
        options: &[&str],
        repositories: &[&str],
    ) -> Result<()> {
        if self.installed(package) {
            tracing::debug!("{} is already installed", package);
            return Ok(());
        }

        for repository in repositories {
            self.tap(repository);
        }

        if LIMITED_PHP_VERSIONS.contains(&package) {
            tracing::warn!(
                "{} is no longer in homebrew-core; enabling the {} tap",
                package,
                PHP_TAP
            );
            self.tap(PHP_TAP);
        }

        self.install_or_fail(package, options)
    }

    fn uninstall(&self, package: &str) {
        self.runner.run_or(
            &format!("brew uninstall --force {}", package),
            &mut |code, err| {
                tracing::warn!("failed to uninstall {} (exit {:?}): {}", package, code, err);
            },
        );
    }

    fn cleanup_cache(&self) {
        self.runner.quietly("brew cleanup");
    }

    fn services(&self) -> &[ServiceRecord] {
        self.services.get_or_init(|| self.fetch_services())
    }

    fn start_service(&self, service: &str) -> Result<()> {
        tracing::info!("Starting {}...", service);
        self.service_command("start", service)
    }

    fn stop_service(&self, service: &str) -> Result<()> {
        tracing::info!("Stopping {}...", service);
        self.service_command("stop", service)
    }

    fn restart_service(&self, service: &str) -> Result<()> {
        tracing::info!("Restarting {}...", service);
        self.service_command("restart", service)
    }

    fn supported_php_versions(&self) -> &'static [&'static str] {
        SUPPORTED_PHP_VERSIONS
    }

    fn limited_php_versions(&self) -> &'static [&'static str] {
        LIMITED_PHP_VERSIONS
    }

    fn php_executable_path(&self) -> PathBuf {
        Self::brew_prefix().join("bin").join("php")
    }

    /// Brew runs the FPM daemon under the formula's own service name.
    fn fpm_service_name(&self, formula: &str) -> String {
        formula.to_string()
    }

    fn link_php(&self, version: &str) -> Result<()> {
        let mut failure: Option<String> = None;
        self.runner.run_or(
            &format!("brew link --force --overwrite {}", version),
            &mut |_, err| {
                failure = Some(err.to_string());
            },
        );

        match failure {
            Some(message) => Err(CabinError::PhpLinkFailed {
                package: version.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }

    fn unlink_php(&self, version: &str) -> Result<()> {
        let mut failure: Option<String> = None;
        self.runner
            .run_or(&format!("brew unlink {}", version), &mut |_, err| {
                failure = Some(err.to_string());
            });

        match failure {
            Some(message) => Err(CabinError::PhpLinkFailed {
                package: version.to_string(),
                message,
            }),
            None => Ok(()),
        }
    }
}
