//! Config validation with field paths and user-friendly messages.

use crate::schema::GateConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// All errors and warnings found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &GateConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_approval(config, &mut report);
    validate_exec(config, &mut report);
    validate_commands(config, &mut report);
    report
}

fn validate_approval(config: &GateConfig, report: &mut ValidationReport) {
    let Some(approval) = &config.approval else { return };

    if approval.timeout_ms == Some(0) {
        report.error("approval.timeoutMs", "timeoutMs must be > 0");
    }

    let allowlist = approval.allowlist.as_deref().unwrap_or_default();
    let blocklist = approval.blocklist.as_deref().unwrap_or_default();

    for (name, list) in [("allowlist", allowlist), ("blocklist", blocklist)] {
        for (i, pattern) in list.iter().enumerate() {
            if pattern.trim().is_empty() {
                report.warn(format!("approval.{name}[{i}]"), "Blank pattern is ignored");
            }
        }
    }

    for (i, pattern) in allowlist.iter().enumerate() {
        let lower = pattern.to_lowercase();
        if !lower.trim().is_empty() && blocklist.iter().any(|b| b.to_lowercase() == lower) {
            report.warn(
                format!("approval.allowlist[{i}]"),
                format!("Pattern '{pattern}' is also blocklisted; the blocklist wins"),
            );
        }
    }
}

fn validate_exec(config: &GateConfig, report: &mut ValidationReport) {
    let Some(exec) = &config.exec else { return };
    if exec.timeout_secs == Some(0) {
        report.error("exec.timeoutSecs", "timeoutSecs must be > 0");
    }
    if exec.max_output_chars == Some(0) {
        report.error("exec.maxOutputChars", "maxOutputChars must be > 0");
    }
}

fn validate_commands(config: &GateConfig, report: &mut ValidationReport) {
    let Some(commands) = &config.commands else { return };
    if let Some(prefix) = &commands.prefix {
        if prefix.trim().is_empty() {
            report.error("commands.prefix", "Command prefix cannot be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;
    use crate::schema::{ApprovalSection, CommandsSection, ExecSection};

    #[test]
    fn defaults_are_valid() {
        let report = validate(&apply_all_defaults(GateConfig::default()));
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn zero_limits_are_errors() {
        let cfg = GateConfig {
            approval: Some(ApprovalSection { timeout_ms: Some(0), ..Default::default() }),
            exec: Some(ExecSection { timeout_secs: Some(0), max_output_chars: Some(0) }),
            ..Default::default()
        };
        let report = validate(&cfg);
        let paths: Vec<&str> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["approval.timeoutMs", "exec.timeoutSecs", "exec.maxOutputChars"]);
    }

    #[test]
    fn blank_and_overlapping_patterns_warn() {
        let cfg = GateConfig {
            approval: Some(ApprovalSection {
                allowlist: Some(vec!["RM -RF".into(), " ".into()]),
                blocklist: Some(vec!["rm -rf".into()]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings.iter().any(|w| w.message.contains("blocklist wins")));
    }

    #[test]
    fn empty_prefix_is_error() {
        let cfg = GateConfig {
            commands: Some(CommandsSection { prefix: Some("  ".into()) }),
            ..Default::default()
        };
        assert!(!validate(&cfg).is_valid());
    }
}
