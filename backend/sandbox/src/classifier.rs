/// Command classification: blocklist substrings, then allowlist prefixes,
/// then the default policy.
use clawgate_core::{ApprovalConfig, Classification};
use tracing::{debug, warn};

/// Stateless verdict engine built from an `ApprovalConfig`.
///
/// Patterns are case-folded once at construction but otherwise kept verbatim,
/// so a trailing space in `"sudo "` still matters. Blank patterns are dropped,
/// otherwise a blank blocklist entry would match every command.
#[derive(Debug, Clone)]
pub struct Classifier {
    allowlist: Vec<String>,
    blocklist: Vec<String>,
    require_approval_by_default: bool,
}

impl Classifier {
    pub fn new(config: &ApprovalConfig) -> Self {
        Self {
            allowlist: normalize_patterns(&config.allowlist),
            blocklist: normalize_patterns(&config.blocklist),
            require_approval_by_default: config.require_approval_by_default,
        }
    }

    pub fn classify(&self, command: &str) -> Classification {
        let normalized = command.trim().to_lowercase();

        // Blocklist wins even when the allowlist also matches.
        if let Some(pattern) = self.blocklist.iter().find(|p| normalized.contains(p.as_str())) {
            warn!(command = %command, pattern = %pattern, "Command matched blocklist");
            return Classification::Blocked;
        }

        if let Some(pattern) = self.allowlist.iter().find(|p| normalized.starts_with(p.as_str())) {
            debug!(command = %command, pattern = %pattern, "Command matched allowlist");
            return Classification::Allowed;
        }

        if self.require_approval_by_default {
            Classification::ApprovalRequired
        } else {
            Classification::Allowed
        }
    }
}

fn normalize_patterns(patterns: &[String]) -> Vec<String> {
    patterns
        .iter()
        .filter(|p| !p.trim().is_empty())
        .map(|p| p.to_lowercase())
        .collect()
}
