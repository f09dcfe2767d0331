// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::{InvocationSpec, Timeout, TimeoutPolicy};

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [config]
/// kill_on_timeout = false
/// drain_timeout_ms = 5000
///
/// [[step]]
/// name = "begin"
/// exe = "dotnet"
/// args = ["tool", "run", "scanner", "begin"]
/// timeout_ms = 60000
///
/// [step.env]
/// SCANNER_HOME = "/opt/scanner"
/// ```
///
/// All sections except `[[step]]` are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    /// Steps in execution order.
    #[serde(default)]
    pub step: Vec<StepConfig>,
}

/// Validated configuration. Build it through `ConfigFile::try_from` (see
/// `validate.rs`) or [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub step: Vec<StepConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, step: Vec<StepConfig>) -> Self {
        Self { config, step }
    }

    pub fn find_step(&self, name: &str) -> Option<&StepConfig> {
        self.step.iter().find(|s| s.name == name)
    }

    /// Resolve relative `working_dir` entries against `base` (normally the
    /// directory holding the config file).
    pub fn resolve_working_dirs(&mut self, base: &std::path::Path) {
        for step in self.step.iter_mut() {
            if let Some(dir) = step.working_dir.as_mut() {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }
    }
}

/// `[config]` section: executor-wide behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Kill children whose deadline passed instead of leaving them running.
    #[serde(default)]
    pub kill_on_timeout: bool,

    /// How long to wait for remaining output after a child has exited.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

fn default_drain_timeout_ms() -> u64 {
    crate::exec::DEFAULT_DRAIN_TIMEOUT.as_millis() as u64
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            kill_on_timeout: false,
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl ConfigSection {
    pub fn timeout_policy(&self) -> TimeoutPolicy {
        if self.kill_on_timeout {
            TimeoutPolicy::Kill
        } else {
            TimeoutPolicy::Abandon
        }
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }
}

/// One `[[step]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    pub name: String,

    /// Executable path or name looked up on the search path.
    pub exe: String,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Omit for no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    /// Keep going with later steps when this one fails.
    #[serde(default)]
    pub continue_on_failure: bool,

    /// Treat any stderr output as a failure, even with exit code 0.
    #[serde(default)]
    pub fail_on_error_output: bool,
}

impl StepConfig {
    pub fn to_invocation(&self) -> InvocationSpec {
        InvocationSpec {
            executable: self.exe.clone(),
            args: self.args.clone(),
            working_dir: self.working_dir.clone(),
            timeout: Timeout::from_millis(self.timeout_ms),
            env: self.env.clone(),
        }
    }
}
