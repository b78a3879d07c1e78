//! The declared check battery.
//!
//! Order matters for report readability and hint dedup order, not for
//! correctness. Predicates are read-only; the configuration check is the
//! only one allowed to read config state, and none of them mutate anything.

use crate::config::Configuration;
use crate::health::engine::Check;
use crate::paths::CabinHome;
use crate::services::ServiceBackend;

/// Build the fixed battery of environment checks.
///
/// The linked-PHP lookup happens once, here, before any predicate executes;
/// its label is interpolated into the FPM check descriptions. When no PHP is
/// linked the label falls back to plain "php" and those checks fail.
pub fn checks<'a>(
    home: &'a CabinHome,
    config: &'a Configuration,
    backend: &'a dyn ServiceBackend,
) -> Vec<Check<'a>> {
    let linked = backend
        .linked_php()
        .unwrap_or_else(|_| "php".to_string());
    let fpm = backend.fpm_service_name(&linked);
    let fpm_for_root = fpm.clone();
    let manager = backend.name();

    vec![
        Check::new(
            "Is Cabin fully installed?",
            move || home.is_scaffolded(),
            "Run `cabin install`.",
        ),
        Check::new(
            "Is the Cabin configuration valid?",
            move || config.read().is_ok(),
            format!(
                "Remove {} and run `cabin install` to regenerate it.",
                config.path().display()
            ),
        ),
        Check::new(
            format!("Is {} available?", manager),
            move || backend.available(),
            format!("Install {}, then run `cabin install`.", manager),
        ),
        Check::new(
            "Is dnsmasq installed?",
            move || backend.installed("dnsmasq"),
            "Run `cabin install`.",
        ),
        Check::new(
            "Is dnsmasq running?",
            move || backend.is_service_running("dnsmasq", true),
            "Run `cabin restart`.",
        ),
        Check::new(
            "Is dnsmasq running as root?",
            move || backend.is_service_running_as_root("dnsmasq", true),
            "Run `cabin restart`.",
        ),
        Check::new(
            "Is nginx installed?",
            move || backend.installed("nginx") || backend.installed("nginx-full"),
            "Run `cabin install`.",
        ),
        Check::new(
            "Is nginx running?",
            move || backend.is_service_running("nginx", true),
            "Run `cabin restart`.",
        ),
        Check::new(
            "Is nginx running as root?",
            move || backend.is_service_running_as_root("nginx", true),
            "Run `cabin restart`.",
        ),
        Check::new(
            "Is PHP installed?",
            move || backend.has_installed_php(),
            "Run `cabin install`.",
        ),
        Check::new(
            format!("Is the linked PHP ({}) running?", linked),
            move || backend.is_service_running(&fpm, false),
            "Run `cabin restart`.",
        ),
        Check::new(
            format!("Is the linked PHP ({}) running as root?", linked),
            move || backend.is_service_running_as_root(&fpm_for_root, false),
            "Run `cabin restart`.",
        ),
        Check::new(
            "Is the Cabin socket present?",
            move || home.socket_file().exists(),
            "Run `cabin install`.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_declares_thirteen_checks() {
        // Descriptions are computed eagerly, so building the battery against
        // a backend that resolves nothing must still work.
        struct NoBackend;

        impl ServiceBackend for NoBackend {
            fn name(&self) -> &'static str {
                "apt"
            }
            fn available(&self) -> bool {
                false
            }
            fn installed(&self, _package: &str) -> bool {
                false
            }
            fn ensure_installed(
                &self,
                _package: &str,
                _options: &[&str],
                _repositories: &[&str],
            ) -> crate::error::Result<()> {
                Ok(())
            }
            fn uninstall(&self, _package: &str) {}
            fn cleanup_cache(&self) {}
            fn services(&self) -> &[crate::services::ServiceRecord] {
                &[]
            }
            fn start_service(&self, _service: &str) -> crate::error::Result<()> {
                Ok(())
            }
            fn stop_service(&self, _service: &str) -> crate::error::Result<()> {
                Ok(())
            }
            fn restart_service(&self, _service: &str) -> crate::error::Result<()> {
                Ok(())
            }
            fn supported_php_versions(&self) -> &'static [&'static str] {
                &["php8.3"]
            }
            fn limited_php_versions(&self) -> &'static [&'static str] {
                &[]
            }
            fn php_executable_path(&self) -> std::path::PathBuf {
                std::path::PathBuf::from("/nonexistent/php")
            }
            fn fpm_service_name(&self, formula: &str) -> String {
                format!("{}-fpm", formula)
            }
            fn link_php(&self, _version: &str) -> crate::error::Result<()> {
                Ok(())
            }
            fn unlink_php(&self, _version: &str) -> crate::error::Result<()> {
                Ok(())
            }
        }

        let home = CabinHome::at("/tmp/cabin-test-home");
        let config = Configuration::new(&home);
        let backend = NoBackend;

        let battery = checks(&home, &config, &backend);

        assert_eq!(battery.len(), 13);
        assert_eq!(battery[0].description(), "Is Cabin fully installed?");
        // Unresolvable linked PHP falls back to the generic label.
        assert_eq!(
            battery[10].description(),
            "Is the linked PHP (php) running?"
        );
    }
}
