//! Health-check aggregation engine.
//!
//! Runs a declared battery of checks and reduces the outcomes to a single
//! report. Every predicate runs, in declaration order, regardless of earlier
//! failures: a broken DNS resolver must not hide an unrelated web-server
//! finding. The report is a plain value; nothing survives a run.

use console::style;

/// A single named check: a read-only predicate plus a remediation hint.
pub struct Check<'a> {
    description: String,
    predicate: Box<dyn Fn() -> bool + 'a>,
    debug: String,
}

impl<'a> Check<'a> {
    pub fn new(
        description: impl Into<String>,
        predicate: impl Fn() -> bool + 'a,
        debug: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            predicate: Box::new(predicate),
            debug: debug.into(),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Outcome of one check.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub description: String,
    pub passed: bool,
}

/// Aggregated outcome of a full battery run.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Logical AND of every individual result.
    pub success: bool,

    /// One entry per declared check, in declaration order.
    pub results: Vec<CheckResult>,

    /// Remediation hints from failing checks, deduplicated by exact string
    /// equality, first-seen order preserved.
    pub debug_instructions: Vec<String>,
}

impl HealthReport {
    /// The remediation hints joined with newlines.
    pub fn debug_block(&self) -> String {
        self.debug_instructions.join("\n")
    }

    /// Human-readable rendering: one line per check, then the hints.
    pub fn render(&self) -> String {
        let mut out = String::new();

        for result in &self.results {
            let marker = if result.passed {
                style("✓").green()
            } else {
                style("✗").red()
            };
            out.push_str(&format!("{} {}\n", marker, result.description));
        }

        if !self.success {
            out.push('\n');
            out.push_str(&self.debug_block());
            out.push('\n');
        }

        out
    }
}

/// Run every declared check unconditionally, in declaration order.
pub fn run(checks: &[Check<'_>]) -> HealthReport {
    let mut results = Vec::with_capacity(checks.len());
    let mut debug_instructions: Vec<String> = Vec::new();
    let mut success = true;

    for check in checks {
        let passed = (check.predicate)();

        if !passed {
            success = false;
            if !debug_instructions.contains(&check.debug) {
                debug_instructions.push(check.debug.clone());
            }
        }

        results.push(CheckResult {
            description: check.description.clone(),
            passed,
        });
    }

    HealthReport {
        success,
        results,
        debug_instructions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn empty_battery_succeeds() {
        let report = run(&[]);

        assert!(report.success);
        assert!(report.results.is_empty());
        assert!(report.debug_instructions.is_empty());
    }

    #[test]
    fn all_passing_yields_success_and_no_hints() {
        let checks = vec![
            Check::new("first", || true, "hint a"),
            Check::new("second", || true, "hint b"),
        ];
        let report = run(&checks);

        assert!(report.success);
        assert!(report.debug_instructions.is_empty());
        assert_eq!(report.results.len(), 2);
    }

    #[test]
    fn early_failure_does_not_short_circuit() {
        let first = Cell::new(0u32);
        let second = Cell::new(0u32);
        let third = Cell::new(0u32);

        let checks = vec![
            Check::new(
                "fails",
                || {
                    first.set(first.get() + 1);
                    false
                },
                "fix the first thing",
            ),
            Check::new(
                "passes",
                || {
                    second.set(second.get() + 1);
                    true
                },
                "unused",
            ),
            Check::new(
                "also fails",
                || {
                    third.set(third.get() + 1);
                    false
                },
                "fix the third thing",
            ),
        ];

        let report = run(&checks);

        assert!(!report.success);
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 1);
        assert_eq!(third.get(), 1);
        assert_eq!(
            report.debug_instructions,
            vec!["fix the first thing", "fix the third thing"]
        );
    }

    #[test]
    fn duplicate_hints_appear_once_in_first_seen_order() {
        let checks = vec![
            Check::new("a", || false, "restart the services"),
            Check::new("b", || false, "reinstall"),
            Check::new("c", || false, "restart the services"),
        ];
        let report = run(&checks);

        assert_eq!(
            report.debug_instructions,
            vec!["restart the services", "reinstall"]
        );
        assert_eq!(report.debug_block(), "restart the services\nreinstall");
    }

    #[test]
    fn results_preserve_declaration_order() {
        let checks = vec![
            Check::new("one", || false, "x"),
            Check::new("two", || true, "y"),
        ];
        let report = run(&checks);

        assert_eq!(report.results[0].description, "one");
        assert!(!report.results[0].passed);
        assert_eq!(report.results[1].description, "two");
        assert!(report.results[1].passed);
    }

    #[test]
    fn render_includes_hints_only_on_failure() {
        let passing = run(&[Check::new("ok", || true, "never shown")]);
        assert!(!passing.render().contains("never shown"));

        let failing = run(&[Check::new("bad", || false, "do the fix")]);
        assert!(failing.render().contains("do the fix"));
    }
}
