//! Normalized service records and snapshot queries.
//!
//! Each backend's native listing (brew's JSON service table, systemd's unit
//! table) is reduced once per run to a list of [`ServiceRecord`]s; every
//! running-status and ownership question is answered from that snapshot.

use serde::Deserialize;

/// A single service known to the backend's service manager.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRecord {
    /// Service name with any unit-type suffix stripped.
    pub name: String,

    /// Whether the service is currently active.
    pub running: bool,

    /// Backend-native status label ("started", "running", "dead", ...).
    pub status: String,

    /// Whether the instance runs under a privileged account.
    pub owner_is_root: bool,

    /// The unit identifier or launchd plist backing this record.
    pub unit_ref: String,

    /// Last exit code, when the backend reports one.
    pub exit_code: Option<i32>,

    /// Error log path, when the backend reports one.
    pub error_log: Option<String>,
}

/// Raw entry from `brew services list --json`.
#[derive(Debug, Deserialize)]
pub struct BrewServiceEntry {
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub error_log_path: Option<String>,
}

/// Raw entry from `systemctl list-units --output=json`.
#[derive(Debug, Deserialize)]
pub struct SystemdUnitEntry {
    pub unit: String,
    #[serde(default)]
    pub active: String,
    #[serde(default)]
    pub sub: String,
}

/// Normalize a brew JSON listing. Unparseable input yields an empty snapshot.
pub fn parse_brew_listing(raw: &str) -> Vec<ServiceRecord> {
    let entries: Vec<BrewServiceEntry> = serde_json::from_str(raw).unwrap_or_default();

    entries
        .into_iter()
        .map(|entry| ServiceRecord {
            running: entry.status == "started",
            owner_is_root: entry.user.as_deref() == Some("root"),
            unit_ref: entry.file.unwrap_or_default(),
            exit_code: entry.exit_code,
            error_log: entry.error_log_path,
            status: entry.status,
            name: entry.name,
        })
        .collect()
}

/// Normalize a systemd unit listing. Services on this backend always run
/// under the init manager's privileged account, so ownership is forced to
/// root. Unparseable input yields an empty snapshot.
pub fn parse_systemd_listing(raw: &str) -> Vec<ServiceRecord> {
    let entries: Vec<SystemdUnitEntry> = serde_json::from_str(raw).unwrap_or_default();

    entries
        .into_iter()
        .map(|entry| {
            let name = entry
                .unit
                .strip_suffix(".service")
                .unwrap_or(&entry.unit)
                .to_string();
            let status = if entry.sub.is_empty() {
                entry.active.clone()
            } else {
                entry.sub.clone()
            };

            ServiceRecord {
                name,
                running: entry.active == "active",
                status,
                owner_is_root: true,
                unit_ref: entry.unit,
                exit_code: None,
                error_log: None,
            }
        })
        .collect()
}

/// Keep the first record seen for each name so names stay unique within a
/// snapshot.
pub fn dedupe_by_name(records: Vec<ServiceRecord>) -> Vec<ServiceRecord> {
    let mut seen: Vec<String> = Vec::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());

    for record in records {
        if seen.contains(&record.name) {
            continue;
        }
        seen.push(record.name.clone());
        unique.push(record);
    }

    unique
}

fn matches(record: &ServiceRecord, name: &str, exact: bool) -> bool {
    if exact {
        record.name == name
    } else {
        record.name.contains(name)
    }
}

/// Whether a matching service is running.
pub fn is_running(records: &[ServiceRecord], name: &str, exact: bool) -> bool {
    records.iter().any(|r| matches(r, name, exact) && r.running)
}

/// Whether a matching service is running under a privileged account.
pub fn is_running_as_root(records: &[ServiceRecord], name: &str, exact: bool) -> bool {
    records
        .iter()
        .any(|r| matches(r, name, exact) && r.running && r.owner_is_root)
}

/// Whether a matching service is running under the invoking user's account.
pub fn is_running_as_user(records: &[ServiceRecord], name: &str, exact: bool) -> bool {
    records
        .iter()
        .any(|r| matches(r, name, exact) && r.running && !r.owner_is_root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn systemd_entry_normalizes() {
        let raw = r#"[{"unit": "nginx.service", "active": "active", "sub": "running"}]"#;
        let records = parse_systemd_listing(raw);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "nginx");
        assert!(records[0].running);
        assert!(records[0].owner_is_root);
        assert_eq!(records[0].unit_ref, "nginx.service");
        assert_eq!(records[0].status, "running");
    }

    #[test]
    fn systemd_inactive_unit_is_not_running() {
        let raw = r#"[{"unit": "dnsmasq.service", "active": "inactive", "sub": "dead"}]"#;
        let records = parse_systemd_listing(raw);

        assert!(!records[0].running);
        assert_eq!(records[0].status, "dead");
    }

    #[test]
    fn empty_or_garbage_listing_is_empty_snapshot() {
        assert!(parse_systemd_listing("").is_empty());
        assert!(parse_systemd_listing("not json at all").is_empty());
        assert!(parse_brew_listing("").is_empty());
    }

    #[test]
    fn brew_entry_normalizes() {
        let raw = r#"[{
            "name": "nginx",
            "status": "started",
            "user": "root",
            "file": "/Library/LaunchDaemons/homebrew.mxcl.nginx.plist",
            "exit_code": 0
        }]"#;
        let records = parse_brew_listing(raw);

        assert_eq!(records[0].name, "nginx");
        assert!(records[0].running);
        assert!(records[0].owner_is_root);
        assert_eq!(records[0].exit_code, Some(0));
        assert!(records[0].unit_ref.contains("LaunchDaemons"));
    }

    #[test]
    fn brew_user_service_is_not_root_owned() {
        let raw = r#"[{"name": "php@8.2", "status": "started", "user": "sam"}]"#;
        let records = parse_brew_listing(raw);

        assert!(records[0].running);
        assert!(!records[0].owner_is_root);
    }

    #[test]
    fn brew_stopped_service_is_not_running() {
        let raw = r#"[{"name": "dnsmasq", "status": "none", "user": null}]"#;
        let records = parse_brew_listing(raw);

        assert!(!records[0].running);
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let raw = r#"[
            {"name": "nginx", "status": "started", "user": "root"},
            {"name": "nginx", "status": "none", "user": "sam"}
        ]"#;
        let records = dedupe_by_name(parse_brew_listing(raw));

        assert_eq!(records.len(), 1);
        assert!(records[0].owner_is_root);
    }

    #[test]
    fn substring_and_exact_lookup_differ() {
        let raw = r#"[{"unit": "php8.2-fpm.service", "active": "active", "sub": "running"}]"#;
        let records = parse_systemd_listing(raw);

        assert!(is_running(&records, "php", false));
        assert!(!is_running(&records, "php", true));
        assert!(is_running(&records, "php8.2-fpm", true));
    }

    #[test]
    fn running_queries_on_empty_snapshot_are_false() {
        let records: Vec<ServiceRecord> = Vec::new();

        assert!(!is_running(&records, "nginx", true));
        assert!(!is_running_as_root(&records, "nginx", false));
        assert!(!is_running_as_user(&records, "nginx", false));
    }

    #[test]
    fn ownership_queries_respect_owner() {
        let raw = r#"[{"name": "php@8.2", "status": "started", "user": "sam"}]"#;
        let records = parse_brew_listing(raw);

        assert!(is_running_as_user(&records, "php", false));
        assert!(!is_running_as_root(&records, "php", false));
    }
}
