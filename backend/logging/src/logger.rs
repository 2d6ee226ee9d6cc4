//! Structured Logger
//!
//! Wraps `tracing` to provide a console layer, an optional JSON file layer
//! with daily rotation, and environment-based level control.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file prefix; the appender adds `.YYYY-MM-DD`.
pub const LOG_FILE_PREFIX: &str = "clawgate.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` overrides `level`. Console output goes to stderr so command
/// output on stdout stays clean. When `log_dir` is set, NDJSON is also
/// written to `<log_dir>/clawgate.log.YYYY-MM-DD`. Calling this twice is a no-op.
pub fn init_logger(log_dir: Option<&Path>, level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let file_layer = log_dir.map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, LOG_FILE_PREFIX);
        fmt::layer().json().with_writer(file_appender).with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
