//! Config defaults: applies sensible default values to parsed config.

use crate::schema::{ApprovalSection, CommandsSection, ExecSection, GateConfig, LoggingSection};

/// Read-only status verbs that may run without approval.
pub const DEFAULT_ALLOWLIST: &[&str] = &[
    "aidevops status",
    "aidevops repos",
    "aidevops features",
    "aidevops help",
    "git status",
    "git log",
    "uptime",
    "df -h",
];

/// Destructive fragments that never run.
pub const DEFAULT_BLOCKLIST: &[&str] = &[
    "rm -rf",
    "rm -fr",
    "mkfs",
    "dd if=",
    ":(){",
    "shutdown",
    "reboot",
    "chmod -r 777",
    "> /dev/sd",
    "sudo ",
];

/// Default time a request may stay pending (5 minutes).
pub const DEFAULT_APPROVAL_TIMEOUT_MS: u64 =
    clawgate_core::DEFAULT_APPROVAL_TIMEOUT.as_millis() as u64;

pub const DEFAULT_EXEC_TIMEOUT_SECS: u64 = clawgate_core::DEFAULT_EXEC_TIMEOUT.as_secs();

pub const DEFAULT_MAX_OUTPUT_CHARS: usize = clawgate_core::DEFAULT_MAX_OUTPUT_CHARS;

pub const DEFAULT_COMMAND_PREFIX: &str = "!";

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: GateConfig) -> GateConfig {
    let config = apply_approval_defaults(config);
    let config = apply_exec_defaults(config);
    let config = apply_commands_defaults(config);
    apply_logging_defaults(config)
}

fn owned(patterns: &[&str]) -> Vec<String> {
    patterns.iter().map(|p| p.to_string()).collect()
}

/// Lists that are present, even empty, are kept as written.
fn apply_approval_defaults(mut config: GateConfig) -> GateConfig {
    let approval = config.approval.get_or_insert_with(ApprovalSection::default);
    approval.allowlist.get_or_insert_with(|| owned(DEFAULT_ALLOWLIST));
    approval.blocklist.get_or_insert_with(|| owned(DEFAULT_BLOCKLIST));
    approval.timeout_ms.get_or_insert(DEFAULT_APPROVAL_TIMEOUT_MS);
    approval.require_approval_by_default.get_or_insert(true);
    config
}

fn apply_exec_defaults(mut config: GateConfig) -> GateConfig {
    let exec = config.exec.get_or_insert_with(ExecSection::default);
    exec.timeout_secs.get_or_insert(DEFAULT_EXEC_TIMEOUT_SECS);
    exec.max_output_chars.get_or_insert(DEFAULT_MAX_OUTPUT_CHARS);
    config
}

fn apply_commands_defaults(mut config: GateConfig) -> GateConfig {
    let commands = config.commands.get_or_insert_with(CommandsSection::default);
    commands.prefix.get_or_insert_with(|| DEFAULT_COMMAND_PREFIX.to_string());
    config
}

fn apply_logging_defaults(mut config: GateConfig) -> GateConfig {
    let logging = config.logging.get_or_insert_with(LoggingSection::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_section() {
        let config = apply_all_defaults(GateConfig::default());
        let approval = config.approval.as_ref().unwrap();
        assert_eq!(approval.timeout_ms, Some(DEFAULT_APPROVAL_TIMEOUT_MS));
        assert_eq!(approval.blocklist.as_ref().unwrap().len(), DEFAULT_BLOCKLIST.len());
        assert_eq!(config.exec.as_ref().unwrap().timeout_secs, Some(30));
        assert_eq!(config.command_prefix(), "!");
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn keeps_explicit_values() {
        let config = GateConfig {
            approval: Some(ApprovalSection {
                allowlist: Some(vec![]),
                timeout_ms: Some(1_000),
                require_approval_by_default: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };
        let config = apply_all_defaults(config);
        let approval = config.approval_config();
        assert!(approval.allowlist.is_empty());
        assert!(!approval.blocklist.is_empty());
        assert_eq!(approval.approval_timeout.as_millis(), 1_000);
        assert!(!approval.require_approval_by_default);
    }
}
