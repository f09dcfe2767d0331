// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{ConfigFile, StepConfig, load_and_validate};
use crate::errors::BootstrapperError;
use crate::exec::{ProcessExecutor, RealExecutorBackend, TimeoutPolicy};
use crate::pipeline::{PipelineReport, StepOutcome, run_steps};
use crate::sink::TracingSink;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - step selection (`--step`)
/// - the process executor with a `tracing` sink
/// - the sequential step pipeline
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?;

    let steps = select_steps(&cfg, args.step.as_deref())?;

    if args.dry_run {
        print_dry_run(&cfg, &steps);
        return Ok(());
    }

    let policy = if args.kill_on_timeout {
        TimeoutPolicy::Kill
    } else {
        cfg.config.timeout_policy()
    };

    let executor = ProcessExecutor::new()
        .with_sink(Arc::new(TracingSink))
        .with_timeout_policy(policy)
        .with_drain_timeout(cfg.config.drain_timeout());
    let mut backend = RealExecutorBackend::new(executor);

    info!(steps = steps.len(), ?policy, "starting steps");
    let report = run_steps(&mut backend, &steps).await;
    summarize(&report)
}

/// All steps, or only the one named by `--step`.
fn select_steps(cfg: &ConfigFile, only: Option<&str>) -> Result<Vec<StepConfig>> {
    match only {
        None => Ok(cfg.step.clone()),
        Some(name) => {
            let step = cfg
                .find_step(name)
                .ok_or_else(|| BootstrapperError::StepNotFound(name.to_string()))?;
            Ok(vec![step.clone()])
        }
    }
}

fn summarize(report: &PipelineReport) -> Result<()> {
    for step in &report.steps {
        match &step.outcome {
            StepOutcome::Ran { result, failed } => debug!(
                step = %step.name,
                failed,
                exit_code = ?result.exit_code,
                timed_out = result.timed_out,
                "step summary"
            ),
            StepOutcome::Errored(msg) => debug!(step = %step.name, error = %msg, "step summary"),
        }
    }

    if report.succeeded() {
        info!(steps = report.steps.len(), "all steps succeeded");
        return Ok(());
    }

    let failed: Vec<&str> = report.failed_steps().map(|s| s.name.as_str()).collect();
    match &report.aborted_at {
        Some(at) => bail!("step '{at}' failed; remaining steps were skipped"),
        None => bail!("steps failed: {}", failed.join(", ")),
    }
}

/// Simple dry-run output: print steps and their invocations.
fn print_dry_run(cfg: &ConfigFile, steps: &[StepConfig]) {
    println!("bootstrapper dry-run");
    println!("  config.kill_on_timeout = {}", cfg.config.kill_on_timeout);
    println!("  config.drain_timeout_ms = {}", cfg.config.drain_timeout_ms);
    println!();

    println!("steps ({}):", steps.len());
    for step in steps {
        println!("  - {}", step.name);
        println!("      exe: {}", step.exe);
        if !step.args.is_empty() {
            println!("      args: {:?}", step.args);
        }
        if let Some(ref dir) = step.working_dir {
            println!("      working_dir: {}", dir.display());
        }
        match step.timeout_ms {
            Some(ms) => println!("      timeout_ms: {ms}"),
            None => println!("      timeout_ms: infinite"),
        }
        for (name, value) in &step.env {
            println!("      env: {name}={value}");
        }
        if step.continue_on_failure {
            println!("      continue_on_failure: true");
        }
        if step.fail_on_error_output {
            println!("      fail_on_error_output: true");
        }
    }

    debug!("dry-run complete (no execution)");
}
