// src/config/validate.rs

use std::collections::HashSet;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BootstrapperError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = BootstrapperError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.step))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_steps(cfg)?;
    validate_global_config(cfg)?;
    validate_steps(cfg)?;
    Ok(())
}

fn ensure_has_steps(cfg: &RawConfigFile) -> Result<()> {
    if cfg.step.is_empty() {
        return Err(BootstrapperError::ConfigError(
            "config must contain at least one [[step]] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.drain_timeout_ms == 0 {
        return Err(BootstrapperError::ConfigError(
            "[config].drain_timeout_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_steps(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();

    for (idx, step) in cfg.step.iter().enumerate() {
        if step.name.trim().is_empty() {
            return Err(BootstrapperError::ConfigError(format!(
                "step #{} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(step.name.as_str()) {
            return Err(BootstrapperError::ConfigError(format!(
                "step name '{}' is used more than once",
                step.name
            )));
        }
        if step.exe.trim().is_empty() {
            return Err(BootstrapperError::ConfigError(format!(
                "step '{}' has an empty `exe`",
                step.name
            )));
        }
        if step.timeout_ms == Some(0) {
            return Err(BootstrapperError::ConfigError(format!(
                "step '{}': timeout_ms must be >= 1; omit it for no timeout",
                step.name
            )));
        }
        if let Some(var) = step.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(BootstrapperError::ConfigError(format!(
                "step '{}': invalid environment variable name {:?}",
                step.name, var
            )));
        }
    }
    Ok(())
}
