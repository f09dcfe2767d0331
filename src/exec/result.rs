// src/exec/result.rs

/// Outcome of one invocation.
///
/// Owned by the caller; the executor keeps nothing after returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exited before the deadline with exit code exactly zero.
    pub succeeded: bool,
    /// Only set when the process exited before the deadline. A process
    /// terminated by a signal reports `-1`.
    pub exit_code: Option<i32>,
    /// At least one line arrived on stderr during the run.
    ///
    /// This is a coarse heuristic ("something was printed to stderr"), not a
    /// judgment on success: plenty of tools log progress to stderr and exit
    /// with 0.
    pub errors_logged: bool,
    /// The deadline passed before the process exited.
    pub timed_out: bool,
    pub process_id: Option<u32>,
}

impl ExecutionResult {
    pub(crate) fn exited(code: i32, errors_logged: bool, process_id: Option<u32>) -> Self {
        Self {
            succeeded: code == 0,
            exit_code: Some(code),
            errors_logged,
            timed_out: false,
            process_id,
        }
    }

    pub(crate) fn timed_out(errors_logged: bool, process_id: Option<u32>) -> Self {
        Self {
            succeeded: false,
            exit_code: None,
            errors_logged,
            timed_out: true,
            process_id,
        }
    }
}
