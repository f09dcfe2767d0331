// src/exec/mod.rs

//! Process execution layer.
//!
//! This module runs external executables with `tokio::process::Command` and
//! reports how they ended.
//!
//! - [`spec`] describes one invocation (`InvocationSpec`, `Timeout`).
//! - [`executor`] owns the spawn / wait / cleanup lifecycle.
//! - [`running`] is the scope guard around a live child.
//! - [`drain`] holds the per-pipe reader tasks.
//! - [`env`] applies the environment overlay before spawn.
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `RealExecutorBackend` that the step pipeline uses in production, and
//!   which tests can replace with a fake implementation.

pub mod backend;
pub mod drain;
pub mod env;
pub mod executor;
pub mod result;
pub mod running;
pub mod spec;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor::{DEFAULT_DRAIN_TIMEOUT, ProcessExecutor, TimeoutPolicy};
pub use result::ExecutionResult;
pub use running::ProcessState;
pub use spec::{InvocationSpec, Timeout};
