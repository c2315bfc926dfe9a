//! Pytest subprocess adapter for the test-runner port.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::debug;

use crate::domain::errors::{FlowError, FlowResult};
use crate::domain::models::{ExecutionReport, RunnerConfig};
use crate::domain::ports::TestRunner;

/// Runs `pytest <file>` and captures the outcome.
pub struct PytestRunner {
    bin: String,
    timeout: Duration,
}

impl PytestRunner {
    pub fn new(config: &RunnerConfig) -> Self {
        Self { bin: config.pytest_bin.clone(), timeout: Duration::from_secs(config.timeout_secs) }
    }
}

#[async_trait]
impl TestRunner for PytestRunner {
    async fn execute(&self, test_file: &Path) -> FlowResult<ExecutionReport> {
        debug!(runner = %self.bin, file = %test_file.display(), "running test suite");

        let output = timeout(self.timeout, Command::new(&self.bin).arg(test_file).output())
            .await
            .map_err(|_| {
                FlowError::RunnerInvocation(format!(
                    "{} timed out after {}s",
                    self.bin,
                    self.timeout.as_secs()
                ))
            })?
            .map_err(|e| FlowError::RunnerInvocation(format!("failed to launch {}: {e}", self.bin)))?;

        Ok(ExecutionReport {
            // A signal-terminated runner has no exit code; report it as -1
            // so the controller still sees a failure, not a success.
            exit_status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
