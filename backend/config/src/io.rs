//! Config file read/write.

use crate::env::resolve_env_vars;
use crate::schema::GateConfig;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the config directory.
/// Priority: `CLAWGATE_CONFIG_DIR` env > `~/.clawgate/` > `./.clawgate`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CLAWGATE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".clawgate"),
        None => PathBuf::from(".clawgate"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk, substituting `${VAR}` references.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<GateConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(GateConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(GateConfig::default());
    }

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;
    if value.is_null() {
        return Ok(GateConfig::default());
    }

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: GateConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config structure at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically (write to temp file, rename).
pub async fn write_config(config: &GateConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await.with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp config: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp config to: {}", path.display()))?;

    info!(path = %path.display(), "Wrote config");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::apply_all_defaults;

    #[tokio::test]
    async fn write_then_load_preserves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = config_file_path(&dir.path().join("nested"));
        let config = apply_all_defaults(GateConfig::default());

        write_config(&config, &path).await.unwrap();
        assert!(!path.with_extension("yaml.tmp").exists());

        let loaded = load_config(&path).await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "").await.unwrap();
        assert_eq!(load_config(&path).await.unwrap(), GateConfig::default());
    }

    #[tokio::test]
    async fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "approval: [unclosed").await.unwrap();
        let err = load_config(&path).await.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));
    }

    #[tokio::test]
    async fn wrong_types_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "approval:\n  timeoutMs: soon\n").await.unwrap();
        assert!(load_config(&path).await.is_err());
    }
}
