//! Apt + systemd backend: Debian packages fronted by a system-wide init
//! manager.
//!
//! Services on this backend only exist as system units owned by root; there
//! is no per-user service concept, so "running as the current user" always
//! answers false here.

use crate::error::{CabinError, Result};
use crate::services::record::{self, ServiceRecord};
use crate::services::ServiceBackend;
use crate::shell::Runner;
use std::path::PathBuf;
use std::sync::OnceLock;

const SUPPORTED_PHP_VERSIONS: &[&str] = &[
    "php8.4", "php8.3", "php8.2", "php8.1", "php8.0", "php7.4",
];

/// Versions past their distro support window, only available from the PPA.
const LIMITED_PHP_VERSIONS: &[&str] = &["php8.0", "php7.4"];

const PHP_PPA: &str = "ppa:ondrej/php";

const LIST_UNITS: &str = "systemctl list-units --all --type=service --no-pager --output=json";

pub struct Apt<'a> {
    runner: &'a dyn Runner,
    services: OnceLock<Vec<ServiceRecord>>,
}

impl<'a> Apt<'a> {
    pub fn new(runner: &'a dyn Runner) -> Self {
        Self {
            runner,
            services: OnceLock::new(),
        }
    }

    fn enable_repository(&self, repository: &str) {
        self.runner.run_elevated_or(
            &format!("add-apt-repository -y {}", repository),
            &mut |code, err| {
                tracing::warn!("failed to enable {} (exit {:?}): {}", repository, code, err);
            },
        );
        self.runner
            .run_elevated_or("apt-get update", &mut |code, err| {
                tracing::debug!("apt-get update failed (exit {:?}): {}", code, err);
            });
    }

    fn install_or_fail(&self, package: &str, options: &[&str]) -> Result<()> {
        tracing::info!("Installing {}...", package);

        let mut command = format!("apt-get install -y {}", package);
        if !options.is_empty() {
            command.push(' ');
            command.push_str(&options.join(" "));
        }

        let mut failure: Option<String> = None;
        self.runner.run_elevated_or(&command, &mut |_, err| {
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

    fn fetch_services(&self) -> Vec<ServiceRecord> {
        let raw = self.runner.run_or(LIST_UNITS, &mut |code, err| {
            tracing::debug!("unit listing failed (exit {:?}): {}", code, err);
        });

        record::parse_systemd_listing(&raw)
    }

    fn service_command(&self, verb: &str, service: &str) -> Result<()> {
        let command = format!("systemctl {} {}", verb, service);
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

impl ServiceBackend for Apt<'_> {
    fn name(&self) -> &'static str {
        "apt"
    }

    fn available(&self) -> bool {
        self.runner
            .run("apt-get --version")
            .map(|r| r.success)
            .unwrap_or(false)
    }

    fn installed(&self, package: &str) -> bool {
        let Ok(result) = self.runner.run(&format!("dpkg -s {}", package)) else {
            return false;
        };

        result.success && result.stdout.contains("Status: install ok installed")
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
            self.enable_repository(repository);
        }

        if LIMITED_PHP_VERSIONS.contains(&package) {
            tracing::warn!(
                "{} is past its distro support window; enabling {}",
                package,
                PHP_PPA
            );
            self.enable_repository(PHP_PPA);
        }

        self.install_or_fail(package, options)
    }

    fn uninstall(&self, package: &str) {
        self.runner.run_elevated_or(
            &format!("apt-get purge -y {}", package),
            &mut |code, err| {
                tracing::warn!("failed to uninstall {} (exit {:?}): {}", package, code, err);
            },
        );
    }

    fn cleanup_cache(&self) {
        self.runner
            .run_elevated_or("apt-get autoremove -y", &mut |code, err| {
                tracing::debug!("autoremove failed (exit {:?}): {}", code, err);
            });
        self.runner
            .run_elevated_or("apt-get autoclean", &mut |code, err| {
                tracing::debug!("autoclean failed (exit {:?}): {}", code, err);
            });
    }

    fn services(&self) -> &[ServiceRecord] {
        self.services.get_or_init(|| self.fetch_services())
    }

    fn is_service_running_as_user(&self, _name: &str, _exact: bool) -> bool {
        // Units here are system-scoped; there is no per-user instance.
        false
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
        PathBuf::from("/usr/bin/php")
    }

    /// Debian ships FPM as a sibling service named after the version.
    fn fpm_service_name(&self, formula: &str) -> String {
        format!("{}-fpm", formula)
    }

    fn link_php(&self, version: &str) -> Result<()> {
        let mut failure: Option<String> = None;
        self.runner.run_elevated_or(
            &format!("update-alternatives --set php /usr/bin/{}", version),
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
        self.runner.run_elevated_or(
            &format!("update-alternatives --remove php /usr/bin/{}", version),
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
}
