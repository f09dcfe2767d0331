// src/pipeline.rs

//! Sequential step runner.
//!
//! Steps run one after another through an [`ExecutorBackend`]. The first
//! failing step stops the run unless it is marked `continue_on_failure`.

use tracing::{Instrument, error, info, info_span, warn};

use crate::config::StepConfig;
use crate::exec::{ExecutionResult, ExecutorBackend};

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The process ran; `failed` applies the step's own failure rules.
    Ran {
        result: ExecutionResult,
        failed: bool,
    },
    /// The executor returned an error (invalid spec, spawn failure, ...).
    Errored(String),
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        match self {
            StepOutcome::Ran { failed, .. } => *failed,
            StepOutcome::Errored(_) => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub name: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
    /// Name of the step that stopped the run, if any.
    pub aborted_at: Option<String>,
}

impl PipelineReport {
    pub fn succeeded(&self) -> bool {
        self.steps.iter().all(|s| !s.outcome.is_failure())
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|s| s.outcome.is_failure())
    }
}

/// Whether `result` counts as a failure under `step`'s rules.
pub fn step_failed(step: &StepConfig, result: &ExecutionResult) -> bool {
    !result.succeeded || (step.fail_on_error_output && result.errors_logged)
}

/// Run `steps` in order on `backend`.
pub async fn run_steps<B>(backend: &mut B, steps: &[StepConfig]) -> PipelineReport
where
    B: ExecutorBackend + ?Sized,
{
    let mut report = PipelineReport::default();

    for step in steps {
        let spec = step.to_invocation();
        let span = info_span!("step", step = %step.name);

        info!(step = %step.name, exe = %step.exe, "running step");
        let outcome = match backend.execute(&spec).instrument(span).await {
            Ok(result) => {
                let failed = step_failed(step, &result);
                if failed {
                    warn!(
                        step = %step.name,
                        exit_code = ?result.exit_code,
                        timed_out = result.timed_out,
                        errors_logged = result.errors_logged,
                        "step failed"
                    );
                } else {
                    info!(step = %step.name, "step succeeded");
                }
                StepOutcome::Ran { result, failed }
            }
            Err(err) => {
                let message = format!("{:#}", anyhow::Error::from(err));
                error!(step = %step.name, error = %message, "step could not be executed");
                StepOutcome::Errored(message)
            }
        };

        let stop = outcome.is_failure() && !step.continue_on_failure;
        report.steps.push(StepReport {
            name: step.name.clone(),
            outcome,
        });

        if stop {
            info!(step = %step.name, "aborting remaining steps");
            report.aborted_at = Some(step.name.clone());
            break;
        }
    }

    report
}
