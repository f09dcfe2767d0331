// src/sink.rs

//! Where captured child output and executor diagnostics go.
//!
//! The executor calls the sink from two drain tasks at once (stdout and
//! stderr), so implementations must tolerate concurrent calls. Lines from the
//! same stream always arrive in order.

use tracing::{error, info, warn};

/// Receiver for diagnostics and captured output lines.
pub trait OutputSink: Send + Sync {
    /// Informational message produced by the executor itself.
    fn log_message(&self, message: &str);

    /// One line the child wrote to stdout (without the line terminator).
    fn log_output(&self, line: &str);

    /// One line the child wrote to stderr (without the line terminator).
    fn log_error(&self, line: &str);

    /// Executor warning (e.g. a timeout). Defaults to a plain message.
    fn log_warning(&self, message: &str) {
        self.log_message(message);
    }
}

/// Sink used by the CLI: everything becomes a `tracing` event.
///
/// The executor runs its drain tasks inside the caller's span, so events
/// emitted here carry whatever step context the caller entered.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn log_message(&self, message: &str) {
        info!("{}", message);
    }

    fn log_output(&self, line: &str) {
        info!(stream = "stdout", "{}", line);
    }

    fn log_error(&self, line: &str) {
        error!(stream = "stderr", "{}", line);
    }

    fn log_warning(&self, message: &str) {
        warn!("{}", message);
    }
}
