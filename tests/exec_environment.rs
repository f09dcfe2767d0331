// tests/exec_environment.rs
#![cfg(unix)]

use std::error::Error;
use std::sync::Arc;

use bootstrapper::exec::{InvocationSpec, ProcessExecutor};
use bootstrapper_test_utils::{RecordingSink, init_tracing, with_timeout};

use tokio::sync::Mutex;

type TestResult = Result<(), Box<dyn Error>>;

/// Held by every test in this binary for its whole body. Spawning reads the
/// environment, so no test may spawn while another one is writing it.
static ENV_LOCK: Mutex<()> = Mutex::const_new(());

#[tokio::test]
async fn overlay_overwrites_inherited_variable() -> TestResult {
    let _env = ENV_LOCK.lock().await;
    init_tracing();
    // SAFETY: `ENV_LOCK` is held, so no other test thread is reading the
    // environment, and this test's current-thread runtime has not spawned yet.
    unsafe { std::env::set_var("BOOTSTRAPPER_OVERLAY_EXISTING", "old-value") };

    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());
    let spec = InvocationSpec::new("sh")
        .args(["-c", "echo \"$BOOTSTRAPPER_OVERLAY_EXISTING\""])
        .env("BOOTSTRAPPER_OVERLAY_EXISTING", "new-value");

    let result = with_timeout(exec.execute(&spec)).await?;

    assert!(result.succeeded);
    assert_eq!(sink.output_lines(), vec!["new-value"]);

    let overwrite = sink
        .position_of_message("Overwriting the value of environment variable 'BOOTSTRAPPER_OVERLAY_EXISTING'")
        .expect("overwrite diagnostic");
    let launch = sink.position_of_message("Executing file").expect("launch diagnostic");
    assert!(overwrite < launch, "overwrite must be reported before the process is started");

    let message = &sink.messages()[0];
    assert!(message.contains("Old value: old-value"));
    assert!(message.contains("new value: new-value"));

    // Only the child sees the overlay.
    assert_eq!(
        std::env::var("BOOTSTRAPPER_OVERLAY_EXISTING").as_deref(),
        Ok("old-value")
    );
    Ok(())
}

#[tokio::test]
async fn overlay_sets_new_variable() -> TestResult {
    let _env = ENV_LOCK.lock().await;
    init_tracing();
    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());
    let spec = InvocationSpec::new("sh")
        .args(["-c", "echo \"$BOOTSTRAPPER_OVERLAY_FRESH\""])
        .env("BOOTSTRAPPER_OVERLAY_FRESH", "hello");

    let result = with_timeout(exec.execute(&spec)).await?;

    assert!(result.succeeded);
    assert_eq!(sink.output_lines(), vec!["hello"]);
    assert!(
        sink.messages()
            .iter()
            .any(|m| m.contains("Setting environment variable 'BOOTSTRAPPER_OVERLAY_FRESH'"))
    );
    assert!(std::env::var("BOOTSTRAPPER_OVERLAY_FRESH").is_err());
    Ok(())
}

#[tokio::test]
async fn inherited_environment_is_kept() -> TestResult {
    let _env = ENV_LOCK.lock().await;
    init_tracing();
    // SAFETY: as above, `ENV_LOCK` keeps every other test off the environment.
    unsafe { std::env::set_var("BOOTSTRAPPER_INHERITED", "from-parent") };

    let sink = Arc::new(RecordingSink::new());
    let exec = ProcessExecutor::new().with_sink(sink.clone());
    let spec = InvocationSpec::new("sh")
        .args(["-c", "echo \"$BOOTSTRAPPER_INHERITED:$BOOTSTRAPPER_EXTRA\""])
        .env("BOOTSTRAPPER_EXTRA", "extra");

    let result = with_timeout(exec.execute(&spec)).await?;

    assert!(result.succeeded);
    assert_eq!(sink.output_lines(), vec!["from-parent:extra"]);
    Ok(())
}
