// src/exec/drain.rs

//! Stream drain tasks.
//!
//! Each child pipe gets its own Tokio task that reads until EOF and forwards
//! every line to the sink. Both pipes are always consumed so the child can
//! never block on a full pipe buffer while we wait for it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug};

use crate::sink::OutputSink;

/// Which pipe a drain task is reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
        }
    }
}

/// Spawn a task that forwards every line of `reader` to `sink`.
///
/// Lines are split on `\n`; a trailing `\r` is stripped and invalid UTF-8 is
/// replaced rather than ending the drain early. For [`Channel::Stderr`],
/// `errors_seen` is raised on the first line.
///
/// Once `detached` is set the task keeps reading to EOF but drops every line,
/// so a child left running after its deadline never writes into a closed
/// pipe.
///
/// The task resolves to the number of lines forwarded.
pub fn spawn_drain<R>(
    reader: R,
    channel: Channel,
    sink: Arc<dyn OutputSink>,
    errors_seen: Arc<AtomicBool>,
    detached: Arc<AtomicBool>,
) -> JoinHandle<std::io::Result<usize>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let task = async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::with_capacity(256);
        let mut count = 0usize;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            if detached.load(Ordering::SeqCst) {
                continue;
            }

            let line = String::from_utf8_lossy(trim_line_end(&buf));
            match channel {
                Channel::Stdout => sink.log_output(&line),
                Channel::Stderr => {
                    errors_seen.store(true, Ordering::SeqCst);
                    sink.log_error(&line);
                }
            }
            count += 1;
        }

        debug!(
            stream = channel.as_str(),
            lines = count,
            detached = detached.load(Ordering::SeqCst),
            "stream reached EOF"
        );
        Ok(count)
    };

    // Keep the caller's span so sink events carry its context.
    tokio::spawn(task.instrument(Span::current()))
}

fn trim_line_end(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
