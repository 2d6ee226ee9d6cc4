pub mod classifier;
pub mod executor;
pub mod gateway;
pub mod registry;

pub use classifier::Classifier;
pub use executor::{ExecSettings, execute, truncate_output, TRUNCATION_MARKER};
pub use gateway::{ExecGateway, Submission};
pub use registry::{ApprovalRegistry, format_timeout};
