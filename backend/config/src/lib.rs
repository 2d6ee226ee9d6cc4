//! `clawgate-config`: configuration for the command approval gateway.
//!
//! Provides:
//! - Typed config schema (approval policy, exec limits, chat commands, logging)
//! - YAML read/write with atomic replace
//! - `${ENV_VAR}` substitution
//! - Default value application
//! - Validation with field paths

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

pub use defaults::apply_all_defaults;
pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{config_dir, config_file_path, load_config, write_config};
pub use schema::{ApprovalSection, CommandsSection, ExecSection, GateConfig, LoggingSection};
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::Result;
use clawgate_core::GateError;
use std::path::Path;

/// Load a config file, fill in defaults and validate it.
///
/// This is the main entry point at startup. Validation warnings are logged;
/// validation errors fail the load.
pub async fn load_and_prepare(path: &Path) -> Result<GateConfig> {
    let config = apply_all_defaults(load_config(path).await?);

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        return Err(GateError::Config(first.to_string()).into());
    }

    Ok(config)
}
