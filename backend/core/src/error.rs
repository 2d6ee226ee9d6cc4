use thiserror::Error;

/// Faults that can escape the gateway's data-shaped results.
///
/// Registry misses are `None` and command failures live in `ExecResult`;
/// only configuration, notification and process-level problems surface here.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("failed to spawn command: {0}")]
    Spawn(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
