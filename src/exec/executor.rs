// src/exec/executor.rs

//! Run one external process to completion or timeout.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::env::{apply_overlay, process_env};
use crate::exec::result::ExecutionResult;
use crate::exec::running::{HandleStats, RunningProcess, WaitOutcome};
use crate::exec::spec::InvocationSpec;
use crate::sink::OutputSink;

/// Default bound on joining the drain tasks after the child has exited.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// What to do with a child that is still running when its deadline passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Stop waiting and leave the child running. This is the default: callers
    /// downstream rely on a timed-out tool not being torn down underneath it.
    #[default]
    Abandon,
    /// Kill and reap the child.
    Kill,
}

/// Spawns external processes and reports how they ended.
///
/// An executor holds no per-run state; every [`execute`](Self::execute) call
/// gets its own child, drain tasks and error flag, so one executor can be
/// reused sequentially or shared across tasks.
pub struct ProcessExecutor {
    sink: Option<Arc<dyn OutputSink>>,
    timeout_policy: TimeoutPolicy,
    drain_timeout: Duration,
    stats: Arc<HandleStats>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            sink: None,
            timeout_policy: TimeoutPolicy::default(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
            stats: Arc::new(HandleStats::default()),
        }
    }

    /// Attach the sink that receives diagnostics and captured output.
    pub fn with_sink(mut self, sink: Arc<dyn OutputSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn with_timeout_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout_policy = policy;
        self
    }

    pub fn with_drain_timeout(mut self, grace: Duration) -> Self {
        self.drain_timeout = grace;
        self
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.timeout_policy
    }

    /// Number of children this executor has spawned.
    pub fn spawned(&self) -> u64 {
        self.stats.spawned.load(Ordering::SeqCst)
    }

    /// Number of child handles currently held. Zero whenever no `execute`
    /// call is in flight.
    pub fn open_handles(&self) -> usize {
        self.stats.open.load(Ordering::SeqCst)
    }

    /// Spawn `spec`, stream its output to the sink and wait for it.
    ///
    /// Returns `Ok` for every run that got as far as spawning and waiting,
    /// including non-zero exits and timeouts; inspect the result fields.
    ///
    /// **Timeouts do not kill the child** under the default
    /// [`TimeoutPolicy::Abandon`]: the call stops waiting and reports
    /// `succeeded = false`, `timed_out = true`, while the process keeps
    /// running. Its pipes stay open and whatever it writes afterwards is
    /// read and discarded.
    pub async fn execute(&self, spec: &InvocationSpec) -> Result<ExecutionResult, ExecError> {
        let sink = self.sink.clone().ok_or_else(|| {
            ExecError::InvalidArgument("no output sink attached to the executor".to_string())
        })?;
        spec.validate()?;

        let child = build_command(spec, sink.as_ref())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                executable: spec.executable.clone(),
                source,
            })?;

        let mut running = RunningProcess::start(child, sink.clone(), self.stats.clone());
        let pid = running.pid();

        sink.log_message(&describe_launch(spec, pid));
        info!(
            exe = %spec.executable,
            pid = ?pid,
            timeout = %spec.timeout,
            "process spawned"
        );

        let result = match running.wait(spec.timeout).await? {
            WaitOutcome::Exited(status) => {
                running.finish_draining(self.drain_timeout).await?;

                // No code means the child was terminated by a signal.
                let code = status.code().unwrap_or(-1);
                sink.log_message(&format!("Process returned exit code {code}"));
                info!(pid = ?pid, exit_code = code, success = code == 0, "process exited");
                ExecutionResult::exited(code, running.errors_logged(), pid)
            }
            WaitOutcome::TimedOut => {
                sink.log_warning(&format!(
                    "Timed out after {} waiting for process {} to exit",
                    spec.timeout,
                    display_pid(pid)
                ));
                match self.timeout_policy {
                    TimeoutPolicy::Abandon => {
                        warn!(pid = ?pid, timeout = %spec.timeout, "deadline passed; process left running");
                        running.detach_output();
                    }
                    TimeoutPolicy::Kill => {
                        warn!(pid = ?pid, timeout = %spec.timeout, "deadline passed; killing process");
                        running.kill().await?;
                    }
                }
                ExecutionResult::timed_out(running.errors_logged(), pid)
            }
        };

        drop(running);
        debug!(pid = ?pid, ?result, "invocation finished");
        Ok(result)
    }
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn build_command(spec: &InvocationSpec, sink: &dyn OutputSink) -> Command {
    let mut cmd = Command::new(&spec.executable);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);
    if let Some(dir) = &spec.working_dir {
        cmd.current_dir(dir);
    }
    apply_overlay(&mut cmd, &spec.env, sink, process_env);
    cmd
}

fn describe_launch(spec: &InvocationSpec, pid: Option<u32>) -> String {
    let working_dir = match &spec.working_dir {
        Some(dir) => dir.display().to_string(),
        None => std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_else(|_| "<current directory>".to_string()),
    };

    format!(
        "Executing file {}\n  Args: {}\n  Working directory: {}\n  Timeout: {}\n  Process id: {}",
        resolved_executable(&spec.executable).display(),
        spec.args.join(" "),
        working_dir,
        spec.timeout,
        display_pid(pid),
    )
}

/// Resolve a bare executable name through the search path for display.
/// Paths and unresolvable names are shown as given.
fn resolved_executable(executable: &str) -> PathBuf {
    let path = PathBuf::from(executable);
    if path.components().count() > 1 || path.is_absolute() {
        return path;
    }
    which::which(executable).unwrap_or(path)
}

fn display_pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "<exited>".to_string(), |p| p.to_string())
}
