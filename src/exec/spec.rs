// src/exec/spec.rs

//! Invocation descriptor handed to the executor.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::errors::ExecError;

/// How long the executor waits for a child to exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeout {
    /// Wait for natural exit, however long that takes.
    #[default]
    Infinite,
    /// Stop waiting after the given duration.
    After(Duration),
}

impl Timeout {
    /// `None` maps to [`Timeout::Infinite`].
    pub fn from_millis(ms: Option<u64>) -> Self {
        match ms {
            Some(ms) => Timeout::After(Duration::from_millis(ms)),
            None => Timeout::Infinite,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Timeout::Infinite => None,
            Timeout::After(d) => Some(*d),
        }
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::Infinite => write!(f, "infinite"),
            Timeout::After(d) => write!(f, "{}ms", d.as_millis()),
        }
    }
}

/// One request to run an external executable.
///
/// The executor only borrows this; it is never mutated during a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationSpec {
    /// Executable path or bare name (resolved via the search path).
    pub executable: String,
    pub args: Vec<String>,
    /// `None` inherits the bootstrapper's current directory.
    pub working_dir: Option<PathBuf>,
    pub timeout: Timeout,
    /// Variables injected into the child's environment, applied in key
    /// order on top of the inherited environment.
    pub env: BTreeMap<String, String>,
}

impl InvocationSpec {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
            ..Default::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Checks that must pass before any OS resource is touched.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.executable.trim().is_empty() {
            return Err(ExecError::InvalidArgument(
                "executable must not be empty".to_string(),
            ));
        }
        if let Some(name) = self.env.keys().find(|k| k.is_empty() || k.contains('=')) {
            return Err(ExecError::InvalidArgument(format!(
                "invalid environment variable name {name:?}"
            )));
        }
        Ok(())
    }
}
