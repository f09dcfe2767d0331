// src/exec/running.rs

//! The live half of an invocation: child handle plus its two drain tasks.
//!
//! `RunningProcess` is a scope guard. Whatever way `execute` leaves (normal
//! return, timeout, `?` on an error, a panic, or the future being dropped),
//! `Drop` aborts any drain task still attached and then releases the child
//! handle. Dropping the handle never kills the child; the runtime reaps it in
//! the background once it exits.
//!
//! A child left running past its deadline keeps writing, so its drains are
//! detached instead of aborted: they read to EOF and discard what they get,
//! which keeps the pipes open for as long as the child lives.

use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use crate::errors::ExecError;
use crate::exec::drain::{Channel, spawn_drain};
use crate::exec::spec::Timeout;
use crate::sink::OutputSink;

/// Lifecycle of one invocation.
///
/// `Created → Spawned → (Exited | TimedOut) → Cleaned`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Created,
    Spawned,
    Exited,
    TimedOut,
    Cleaned,
}

/// Counters shared between an executor and every guard it creates.
#[derive(Debug, Default)]
pub struct HandleStats {
    pub(crate) spawned: AtomicU64,
    pub(crate) open: AtomicUsize,
}

/// Result of waiting on the child.
#[derive(Debug)]
pub enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
}

pub struct RunningProcess {
    child: Child,
    pid: Option<u32>,
    stdout_drain: Option<JoinHandle<std::io::Result<usize>>>,
    stderr_drain: Option<JoinHandle<std::io::Result<usize>>>,
    errors_seen: Arc<AtomicBool>,
    detached: Arc<AtomicBool>,
    state: ProcessState,
    stats: Arc<HandleStats>,
}

impl RunningProcess {
    /// Take ownership of a freshly spawned child and start draining both
    /// pipes immediately.
    pub fn start(mut child: Child, sink: Arc<dyn OutputSink>, stats: Arc<HandleStats>) -> Self {
        stats.spawned.fetch_add(1, Ordering::SeqCst);
        stats.open.fetch_add(1, Ordering::SeqCst);

        let pid = child.id();
        let errors_seen = Arc::new(AtomicBool::new(false));
        let detached = Arc::new(AtomicBool::new(false));

        let stdout_drain = child.stdout.take().map(|out| {
            spawn_drain(
                out,
                Channel::Stdout,
                sink.clone(),
                errors_seen.clone(),
                detached.clone(),
            )
        });
        let stderr_drain = child.stderr.take().map(|err| {
            spawn_drain(
                err,
                Channel::Stderr,
                sink,
                errors_seen.clone(),
                detached.clone(),
            )
        });

        let mut running = Self {
            child,
            pid,
            stdout_drain,
            stderr_drain,
            errors_seen,
            detached,
            state: ProcessState::Created,
            stats,
        };
        running.transition(ProcessState::Spawned);
        running
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    pub fn state(&self) -> ProcessState {
        self.state
    }

    /// Whether any stderr line has been seen so far in this run.
    pub fn errors_logged(&self) -> bool {
        self.errors_seen.load(Ordering::SeqCst)
    }

    /// Wait for the child to exit, up to `timeout`.
    ///
    /// On expiry the wait is abandoned; the child is left running.
    pub async fn wait(&mut self, timeout: Timeout) -> Result<WaitOutcome, ExecError> {
        let waited = match timeout {
            Timeout::Infinite => Some(self.child.wait().await),
            Timeout::After(limit) => tokio::time::timeout(limit, self.child.wait()).await.ok(),
        };

        match waited {
            Some(Ok(status)) => {
                self.transition(ProcessState::Exited);
                Ok(WaitOutcome::Exited(status))
            }
            Some(Err(source)) => Err(ExecError::Wait {
                pid: self.pid,
                source,
            }),
            None => {
                self.transition(ProcessState::TimedOut);
                Ok(WaitOutcome::TimedOut)
            }
        }
    }

    /// Terminate a child whose deadline passed and reap it.
    pub async fn kill(&mut self) -> Result<(), ExecError> {
        self.child.kill().await.map_err(|source| ExecError::Wait {
            pid: self.pid,
            source,
        })
    }

    /// Join both drain tasks so lines already written by an exited child are
    /// delivered before the result is computed.
    ///
    /// Both joins share one deadline `grace` from now: a grandchild holding
    /// a pipe open must not hang the caller. A drain still running at the
    /// deadline is detached and keeps the pipe open until the grandchild
    /// closes it.
    pub async fn finish_draining(&mut self, grace: Duration) -> Result<(), ExecError> {
        let deadline = Instant::now() + grace;
        let mut lingering = false;
        let slots = [
            (Channel::Stdout, &mut self.stdout_drain),
            (Channel::Stderr, &mut self.stderr_drain),
        ];

        for (channel, slot) in slots {
            let Some(handle) = slot.as_mut() else {
                continue;
            };

            let joined = tokio::time::timeout_at(deadline, handle).await;
            match joined {
                Ok(res) => {
                    *slot = None;
                    match res {
                        Ok(Ok(lines)) => {
                            trace!(pid = ?self.pid, stream = channel.as_str(), lines, "drain joined");
                        }
                        Ok(Err(e)) => {
                            warn!(pid = ?self.pid, stream = channel.as_str(), error = %e, "error reading child output");
                        }
                        Err(join) => {
                            return Err(ExecError::Drain {
                                stream: channel.as_str(),
                                reason: join.to_string(),
                            });
                        }
                    }
                }
                Err(_) => {
                    warn!(
                        pid = ?self.pid,
                        stream = channel.as_str(),
                        grace_ms = grace.as_millis() as u64,
                        "output stream still open after process exit; detaching"
                    );
                    lingering = true;
                }
            }
        }

        if lingering {
            self.detach_output();
        }
        Ok(())
    }

    /// Stop forwarding output without closing the pipes.
    ///
    /// The drain tasks keep reading to EOF and drop every line, so a child
    /// that outlives this guard never sees a broken pipe. Lines read after
    /// this call do not reach the sink or the error flag.
    pub fn detach_output(&mut self) {
        self.detached.store(true, Ordering::SeqCst);
        let detached = [self.stdout_drain.take(), self.stderr_drain.take()]
            .into_iter()
            .flatten()
            .count();
        if detached > 0 {
            debug!(pid = ?self.pid, detached, "drains detached from sink");
        }
    }

    fn transition(&mut self, next: ProcessState) {
        debug!(pid = ?self.pid, from = ?self.state, to = ?next, "process state");
        self.state = next;
    }
}

impl Drop for RunningProcess {
    fn drop(&mut self) {
        // Anything still attached here is on a kill or error path.
        for handle in [self.stdout_drain.take(), self.stderr_drain.take()]
            .into_iter()
            .flatten()
        {
            handle.abort();
        }

        self.transition(ProcessState::Cleaned);
        self.stats.open.fetch_sub(1, Ordering::SeqCst);
        // `child` is released when the fields drop, after this body.
    }
}
