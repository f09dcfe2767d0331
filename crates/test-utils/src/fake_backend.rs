use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use bootstrapper::errors::ExecError;
use bootstrapper::exec::{ExecutionResult, ExecutorBackend, InvocationSpec};

/// Canned answer for one executable.
#[derive(Debug, Clone)]
pub enum FakeResponse {
    Exit { code: i32, stderr: bool },
    TimedOut,
    SpawnFailure,
}

/// A fake backend that:
/// - records which executables were "run"
/// - answers with a canned response per executable (default: exit 0).
pub struct FakeBackend {
    executed: Arc<Mutex<Vec<String>>>,
    responses: HashMap<String, FakeResponse>,
}

impl FakeBackend {
    pub fn new(executed: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            executed,
            responses: HashMap::new(),
        }
    }

    pub fn respond(mut self, executable: &str, response: FakeResponse) -> Self {
        self.responses.insert(executable.to_string(), response);
        self
    }
}

impl ExecutorBackend for FakeBackend {
    fn execute<'a>(
        &'a mut self,
        spec: &'a InvocationSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ExecutionResult, ExecError>> + Send + 'a>> {
        let executed = Arc::clone(&self.executed);
        let response = self
            .responses
            .get(&spec.executable)
            .cloned()
            .unwrap_or(FakeResponse::Exit { code: 0, stderr: false });

        Box::pin(async move {
            {
                let mut guard = executed.lock().unwrap();
                guard.push(spec.executable.clone());
            }

            match response {
                FakeResponse::Exit { code, stderr } => Ok(ExecutionResult {
                    succeeded: code == 0,
                    exit_code: Some(code),
                    errors_logged: stderr,
                    timed_out: false,
                    process_id: None,
                }),
                FakeResponse::TimedOut => Ok(ExecutionResult {
                    succeeded: false,
                    exit_code: None,
                    errors_logged: false,
                    timed_out: true,
                    process_id: None,
                }),
                FakeResponse::SpawnFailure => Err(ExecError::Spawn {
                    executable: spec.executable.clone(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "fake: not found"),
                }),
            }
        })
    }
}
