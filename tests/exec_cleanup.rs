// tests/exec_cleanup.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use bootstrapper::errors::ExecError;
use bootstrapper::exec::{InvocationSpec, ProcessExecutor, Timeout};
use bootstrapper::sink::OutputSink;
use bootstrapper_test_utils::{RecordingSink, init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

/// Sink that blows up on the first stdout line.
struct PanickingSink;

impl OutputSink for PanickingSink {
    fn log_message(&self, _message: &str) {}
    fn log_output(&self, line: &str) {
        panic!("sink rejected line {line:?}");
    }
    fn log_error(&self, _line: &str) {}
}

#[tokio::test]
async fn handles_released_after_success_failure_and_timeout() -> TestResult {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());

    with_timeout(exec.execute(&InvocationSpec::new("true"))).await?;
    assert_eq!(exec.open_handles(), 0);

    with_timeout(exec.execute(&InvocationSpec::new("false"))).await?;
    assert_eq!(exec.open_handles(), 0);

    let slow = InvocationSpec::new("sleep")
        .arg("2")
        .timeout(Timeout::After(Duration::from_millis(50)));
    let result = with_timeout(exec.execute(&slow)).await?;
    assert!(result.timed_out);
    assert_eq!(exec.open_handles(), 0);

    assert_eq!(exec.spawned(), 3);
    Ok(())
}

#[tokio::test]
async fn spawn_failure_leaves_nothing_open() -> TestResult {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());

    let err = with_timeout(exec.execute(&InvocationSpec::new(
        "/nonexistent/bootstrapper-missing-tool",
    )))
    .await
    .unwrap_err();

    match err {
        ExecError::Spawn { executable, source } => {
            assert_eq!(executable, "/nonexistent/bootstrapper-missing-tool");
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected Spawn error, got {other:?}"),
    }
    assert_eq!(exec.spawned(), 0);
    assert_eq!(exec.open_handles(), 0);
    assert!(sink.output_lines().is_empty());
    Ok(())
}

#[tokio::test]
async fn dropping_the_execute_future_still_cleans_up() -> TestResult {
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());

    let spec = InvocationSpec::new("sleep").arg("2");
    let outer = tokio::time::timeout(Duration::from_millis(100), exec.execute(&spec)).await;

    assert!(outer.is_err(), "outer timeout should have cancelled the call");
    assert_eq!(exec.spawned(), 1);
    assert_eq!(exec.open_handles(), 0);
    Ok(())
}

#[tokio::test]
async fn panicking_sink_surfaces_as_drain_error_after_cleanup() -> TestResult {
    init_tracing();
    let exec = ProcessExecutor::new().with_sink(Arc::new(PanickingSink));

    let spec = InvocationSpec::new("sh").args(["-c", "echo boom"]);
    let err = with_timeout(exec.execute(&spec)).await.unwrap_err();

    assert!(
        matches!(err, ExecError::Drain { stream: "stdout", .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(exec.open_handles(), 0);
    Ok(())
}
