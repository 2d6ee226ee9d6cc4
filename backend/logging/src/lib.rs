//! Structured logging for ClawGate.
//!
//! Console output for operators plus optional NDJSON files with daily rotation.

pub mod logger;

pub use logger::init_logger;
