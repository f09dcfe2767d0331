// tests/config_demos.rs

use std::error::Error;
use std::path::PathBuf;

use bootstrapper::config::{load_and_validate, load_from_path};
use bootstrapper::errors::BootstrapperError;
use bootstrapper::exec::{Timeout, TimeoutPolicy};
use bootstrapper_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos").join(name)
}

/// Sanity-check that demos/bootstrapper.toml is wired the way its comments describe.
#[test]
fn bootstrapper_demo_is_parsed_correctly() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(demo("bootstrapper.toml"))?;

    assert!(!cfg.config.kill_on_timeout);
    assert_eq!(cfg.config.timeout_policy(), TimeoutPolicy::Abandon);
    assert_eq!(cfg.config.drain_timeout_ms, 2000);

    let names: Vec<&str> = cfg.step.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["begin", "build", "end"]);

    let begin = cfg.find_step("begin").expect("begin must exist");
    assert_eq!(begin.exe, "sh");
    assert_eq!(begin.timeout_ms, Some(60000));
    assert_eq!(begin.env.get("ANALYSIS_PHASE").map(String::as_str), Some("begin"));
    // "." is anchored at the config file's directory.
    assert_eq!(begin.working_dir, Some(demo(".")));

    let build = cfg.find_step("build").expect("build must exist");
    assert!(build.continue_on_failure);
    assert_eq!(build.to_invocation().timeout, Timeout::Infinite);

    let end = cfg.find_step("end").expect("end must exist");
    assert!(end.fail_on_error_output);
    assert!(end.working_dir.is_none());

    Ok(())
}

#[test]
fn timeouts_demo_is_parsed_correctly() -> TestResult {
    init_tracing();

    let cfg = load_and_validate(demo("timeouts.toml"))?;

    assert_eq!(cfg.config.timeout_policy(), TimeoutPolicy::Kill);
    let slow = cfg.find_step("slow").expect("slow must exist");
    assert_eq!(slow.timeout_ms, Some(500));
    Ok(())
}

#[test]
fn missing_file_reports_the_path() {
    init_tracing();

    let path = demo("does-not-exist.toml");
    match load_from_path(&path) {
        Err(BootstrapperError::IoError { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected IoError, got {other:?}"),
    }
}

#[test]
fn malformed_toml_is_a_toml_error() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Bootstrapper.toml");
    std::fs::write(&path, "[[step]\nname = ")?;

    assert!(matches!(
        load_and_validate(&path),
        Err(BootstrapperError::TomlError(_))
    ));
    Ok(())
}

#[test]
fn relative_working_dir_is_resolved_against_config_dir() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Bootstrapper.toml");
    std::fs::write(
        &path,
        "[[step]]\nname = \"a\"\nexe = \"true\"\nworking_dir = \"sub/dir\"\n",
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.step[0].working_dir, Some(dir.path().join("sub/dir")));
    Ok(())
}
