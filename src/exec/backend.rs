// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The step pipeline talks to an `ExecutorBackend` instead of a concrete
//! [`ProcessExecutor`]. This makes it easy to swap in a fake executor in
//! tests while keeping the production implementation in [`executor`].
//!
//! [`executor`]: super::executor

use std::future::Future;
use std::pin::Pin;

use crate::errors::ExecError;
use crate::exec::{ExecutionResult, InvocationSpec, ProcessExecutor};

/// Trait abstracting how a single invocation is carried out.
///
/// Production code uses [`RealExecutorBackend`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ExecutorBackend: Send {
    fn execute<'a>(
        &'a mut self,
        spec: &'a InvocationSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    executor: ProcessExecutor,
}

impl RealExecutorBackend {
    pub fn new(executor: ProcessExecutor) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &ProcessExecutor {
        &self.executor
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn execute<'a>(
        &'a mut self,
        spec: &'a InvocationSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>> {
        Box::pin(self.executor.execute(spec))
    }
}
