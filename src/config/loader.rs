// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{BootstrapperError, Result};

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| BootstrapperError::IoError {
        path: path.to_path_buf(),
        source,
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, validate it, and anchor relative
/// step working directories at the directory holding the file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = ConfigFile::try_from(raw_config)?;
    config.resolve_working_dirs(&config_root_dir(path));
    Ok(config)
}

/// Default config location: `Bootstrapper.toml` in the current directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Bootstrapper.toml")
}

/// - If the config path has a non-empty parent (e.g. "ci/Bootstrapper.toml"),
///   we use that directory.
/// - If it's just a bare filename (parent = ""), we fall back to the current
///   working directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
