// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] is what the process executor returns. Timeouts and
//!   non-zero exit codes are *not* errors; they are carried in
//!   [`ExecutionResult`](crate::exec::ExecutionResult).
//! - [`BootstrapperError`] covers config loading and wraps `ExecError` for
//!   the application layer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    /// Malformed invocation request, detected before any OS resource is
    /// acquired.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The OS refused or failed to create the child process.
    #[error("failed to spawn '{executable}'")]
    Spawn {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on a spawned child failed.
    #[error("failed waiting for process {pid:?}")]
    Wait {
        pid: Option<u32>,
        #[source]
        source: std::io::Error,
    },

    /// A stream drain task died abnormally (usually a panicking sink).
    #[error("{stream} drain task failed: {reason}")]
    Drain { stream: &'static str, reason: String },
}

#[derive(Error, Debug)]
pub enum BootstrapperError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Step not found: {0}")]
    StepNotFound(String),

    #[error("IO error reading {path:?}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, BootstrapperError>;
