pub mod error;
pub mod traits;
pub mod types;

pub use error::GateError;
pub use traits::NotificationSink;
pub use types::{
    ApprovalConfig, ApprovalRequest, ApprovalState, Classification, ExecResult,
    DEFAULT_APPROVAL_TIMEOUT, DEFAULT_EXEC_TIMEOUT, DEFAULT_MAX_OUTPUT_CHARS,
};
