use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default time a request may stay pending before it is auto-rejected.
pub const DEFAULT_APPROVAL_TIMEOUT: Duration = Duration::from_secs(300);

/// Default wall-clock ceiling for a single command.
pub const DEFAULT_EXEC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of characters kept from each captured stream.
pub const DEFAULT_MAX_OUTPUT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Verdict assigned to a command before anything runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Run immediately.
    Allowed,
    /// Park until the requester approves or the timeout fires.
    ApprovalRequired,
    /// Never run.
    Blocked,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Allowed => write!(f, "allowed"),
            Classification::ApprovalRequired => write!(f, "approval-required"),
            Classification::Blocked => write!(f, "blocked"),
        }
    }
}

// ---------------------------------------------------------------------------
// Approval config
// ---------------------------------------------------------------------------

/// Immutable policy handed to the gateway at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalConfig {
    /// Prefix patterns that run without approval.
    pub allowlist: Vec<String>,
    /// Substring patterns that never run. Checked before the allowlist.
    pub blocklist: Vec<String>,
    pub approval_timeout: Duration,
    /// Verdict for commands that match neither list.
    pub require_approval_by_default: bool,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            allowlist: Vec::new(),
            blocklist: Vec::new(),
            approval_timeout: DEFAULT_APPROVAL_TIMEOUT,
            require_approval_by_default: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Approval request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalState {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl ApprovalState {
    pub fn is_pending(&self) -> bool {
        matches!(self, ApprovalState::Pending)
    }
}

impl fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ApprovalState::Pending => "pending",
            ApprovalState::Approved => "approved",
            ApprovalState::Rejected => "rejected",
            ApprovalState::Expired => "expired",
        };
        f.write_str(s)
    }
}

/// A command parked until its requester decides on it.
///
/// Callers only ever hold copies; the live entry is owned by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    /// Four lowercase hex characters.
    pub id: String,
    pub command: String,
    pub requester_id: String,
    pub requester_name: String,
    pub created_at: DateTime<Utc>,
    pub state: ApprovalState,
}

// ---------------------------------------------------------------------------
// Exec result
// ---------------------------------------------------------------------------

/// Outcome of running a command. Every failure mode is folded in here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    /// Process exit code, or -1 for timeouts and spawn failures.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    /// True when either stream was cut.
    pub truncated: bool,
}

impl ExecResult {
    /// A result for a command that never produced an exit status.
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: stderr.into(),
            timed_out: false,
            truncated: false,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
