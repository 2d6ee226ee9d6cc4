//! Gateway configuration schema, typed for serde YAML/JSON.
//!
//! Every section and field is optional on disk; `defaults::apply_all_defaults`
//! fills the gaps and the accessors below fall back to the same defaults.

use clawgate_core::ApprovalConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::defaults::{
    DEFAULT_APPROVAL_TIMEOUT_MS, DEFAULT_COMMAND_PREFIX, DEFAULT_EXEC_TIMEOUT_SECS,
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_OUTPUT_CHARS,
};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    /// Command classification and approval policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval: Option<ApprovalSection>,

    /// Subprocess limits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exec: Option<ExecSection>,

    /// Chat command surface
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalSection {
    /// Prefix patterns that run without approval.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist: Option<Vec<String>>,
    /// Substring patterns that never run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocklist: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_approval_by_default: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsSection {
    /// Leading text that marks a chat message as a command (e.g. `!`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling JSON log files. Console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

impl GateConfig {
    /// The immutable policy handed to the gateway.
    pub fn approval_config(&self) -> ApprovalConfig {
        let section = self.approval.clone().unwrap_or_default();
        ApprovalConfig {
            allowlist: section.allowlist.unwrap_or_default(),
            blocklist: section.blocklist.unwrap_or_default(),
            approval_timeout: Duration::from_millis(
                section.timeout_ms.unwrap_or(DEFAULT_APPROVAL_TIMEOUT_MS),
            ),
            require_approval_by_default: section.require_approval_by_default.unwrap_or(true),
        }
    }

    pub fn exec_timeout(&self) -> Duration {
        let secs = self
            .exec
            .as_ref()
            .and_then(|e| e.timeout_secs)
            .unwrap_or(DEFAULT_EXEC_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn max_output_chars(&self) -> usize {
        self.exec
            .as_ref()
            .and_then(|e| e.max_output_chars)
            .unwrap_or(DEFAULT_MAX_OUTPUT_CHARS)
    }

    pub fn command_prefix(&self) -> &str {
        self.commands
            .as_ref()
            .and_then(|c| c.prefix.as_deref())
            .unwrap_or(DEFAULT_COMMAND_PREFIX)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> Option<&std::path::Path> {
        self.logging.as_ref().and_then(|l| l.dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_yaml() {
        let yaml = r#"
approval:
  allowlist: ["aidevops status"]
  blocklist: ["rm -rf"]
  timeoutMs: 60000
  requireApprovalByDefault: false
exec:
  timeoutSecs: 5
commands:
  prefix: "/"
"#;
        let config: GateConfig = serde_yaml::from_str(yaml).unwrap();
        let approval = config.approval_config();
        assert_eq!(approval.allowlist, vec!["aidevops status".to_string()]);
        assert_eq!(approval.approval_timeout, Duration::from_secs(60));
        assert!(!approval.require_approval_by_default);
        assert_eq!(config.exec_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_output_chars(), DEFAULT_MAX_OUTPUT_CHARS);
        assert_eq!(config.command_prefix(), "/");
    }

    #[test]
    fn empty_config_uses_builtin_fallbacks() {
        let config = GateConfig::default();
        let approval = config.approval_config();
        assert!(approval.allowlist.is_empty());
        assert!(approval.require_approval_by_default);
        assert_eq!(approval.approval_timeout, Duration::from_millis(DEFAULT_APPROVAL_TIMEOUT_MS));
        assert_eq!(config.log_level(), "info");
        assert!(config.log_dir().is_none());
    }
}
