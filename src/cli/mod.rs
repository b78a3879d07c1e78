//! Command-line interface and thin command dispatch.
//!
//! The heavy lifting lives in [`crate::health`] and [`crate::services`];
//! this layer only parses arguments, wires up the backend for the current
//! platform, and renders results.

use crate::config::{CabinConfig, Configuration};
use crate::error::Result;
use crate::health;
use crate::paths::CabinHome;
use crate::services::{self, php, ServiceBackend};
use crate::shell::ShellRunner;
use clap::{Parser, Subcommand};
use console::style;

#[derive(Debug, Parser)]
#[command(
    name = "cabin",
    version,
    about = "Local development environment manager for PHP sites"
)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Diagnose the local environment and print remediation hints.
    Doctor,

    /// Scaffold the cabin home and install the required services.
    Install,

    /// Switch the linked PHP version.
    Use {
        /// Version in any spelling: "8.2", "php8.2", "php@8.2".
        version: String,
    },

    /// Start managed services (all of them when none is named).
    Start { service: Option<String> },

    /// Stop managed services (all of them when none is named).
    Stop { service: Option<String> },

    /// Restart managed services (all of them when none is named).
    Restart { service: Option<String> },
}

/// Execute the parsed command. Returns the process exit code.
pub fn dispatch(cli: &Cli) -> Result<i32> {
    let runner = ShellRunner;
    let backend = services::detect(&runner);
    let home = CabinHome::resolve();
    let config = Configuration::new(&home);

    match &cli.command {
        Commands::Doctor => {
            let report = health::run(&health::checks(&home, &config, backend.as_ref()));
            print!("{}", report.render());
            Ok(if report.success { 0 } else { 1 })
        }
        Commands::Install => {
            install(&home, &config, backend.as_ref())?;
            println!("{}", style("Cabin installed successfully.").green());
            Ok(0)
        }
        Commands::Use { version } => {
            let linked = use_php(backend.as_ref(), version)?;
            println!("{}", style(format!("Now using {}.", linked)).green());
            Ok(0)
        }
        Commands::Start { service } => {
            for service in named_or_all(backend.as_ref(), service.as_deref()) {
                backend.start_service(&service)?;
            }
            Ok(0)
        }
        Commands::Stop { service } => {
            for service in named_or_all(backend.as_ref(), service.as_deref()) {
                backend.stop_service(&service)?;
            }
            Ok(0)
        }
        Commands::Restart { service } => {
            for service in named_or_all(backend.as_ref(), service.as_deref()) {
                backend.restart_service(&service)?;
            }
            Ok(0)
        }
    }
}

/// Scaffold the home, regenerate an unreadable config, and install whatever
/// is missing. Install failures abort the whole workflow.
fn install(home: &CabinHome, config: &Configuration, backend: &dyn ServiceBackend) -> Result<()> {
    home.scaffold()?;

    if config.read().is_err() {
        config.write(&CabinConfig::default())?;
    }

    backend.ensure_installed("dnsmasq", &[], &[])?;

    if !backend.installed("nginx-full") {
        backend.ensure_installed("nginx", &[], &[])?;
    }

    if !backend.has_installed_php() {
        let newest = backend.supported_php_versions()[0];
        backend.ensure_installed(newest, &[], &[])?;
    }

    Ok(())
}

/// Install (if needed) and link the requested PHP version, then restart its
/// FPM service. Returns the canonical version token.
fn use_php(backend: &dyn ServiceBackend, version: &str) -> Result<String> {
    let target = php::match_supported(version, backend.supported_php_versions())
        .map(str::to_string)
        .ok_or_else(|| crate::error::CabinError::UnresolvedPhpVersion {
            input: version.to_string(),
        })?;

    backend.ensure_installed(&target, &[], &[])?;

    if let Ok(current) = backend.linked_php() {
        if current != target {
            backend.unlink_php(&current)?;
        }
    }

    backend.link_php(&target)?;
    backend.restart_service(&backend.fpm_service_name(&target))?;

    Ok(target)
}

/// The named service, or every service cabin manages.
fn named_or_all(backend: &dyn ServiceBackend, service: Option<&str>) -> Vec<String> {
    if let Some(service) = service {
        return vec![service.to_string()];
    }

    let mut all = vec!["dnsmasq".to_string(), "nginx".to_string()];
    if let Ok(linked) = backend.linked_php() {
        all.push(backend.fpm_service_name(&linked));
    }
    all
}
