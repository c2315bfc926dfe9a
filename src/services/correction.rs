//! Function correction driven by failing tests.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::errors::{FlowError, FlowResult};
use crate::domain::models::{ExecutionReport, FailureSet, FunctionUnderTest, Turn};
use crate::domain::ports::{CompletionClient, CompletionRequest};
use crate::services::extraction::extract_fenced_block;
use crate::services::prompts;
use crate::services::transcript::Transcript;

/// Asks the model to rewrite the function under test so the failing tests
/// pass, and persists the rewritten source to the function's origin path.
pub struct CorrectionService {
    client: Arc<dyn CompletionClient>,
    model: String,
    test_module: String,
    transcript: Transcript,
}

impl CorrectionService {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        test_module: impl Into<String>,
        transcript: Transcript,
    ) -> Self {
        Self { client, model: model.into(), test_module: test_module.into(), transcript }
    }

    /// Produce the function for the next iteration.
    ///
    /// When the response has no fenced code block the previous source is kept
    /// unchanged and nothing is written; a failed correction must not make
    /// things worse.
    pub async fn correct(
        &self,
        function: &FunctionUnderTest,
        report: &ExecutionReport,
        failures: &FailureSet,
        temperature: f32,
    ) -> FlowResult<FunctionUnderTest> {
        info!(symbol = %function.name, temperature, "requesting function correction");

        let turns = vec![
            Turn::system(prompts::correction_system(&self.test_module, function.import_name())),
            Turn::user(prompts::correction_user(&function.source, &report.stdout, &failures.render())),
        ];
        self.transcript.turns(&turns);

        let reply = self
            .client
            .complete(CompletionRequest::new(&self.model, turns, temperature))
            .await?;
        self.transcript.assistant(&reply);

        match extract_fenced_block(&reply) {
            Ok(code) => {
                persist(&function.origin, &code).await?;
                info!(path = %function.origin.display(), "corrected function written");
                Ok(function.with_source(code))
            }
            Err(FlowError::MissingCodeFence) => {
                warn!("correction response had no fenced code block; keeping the previous function");
                Ok(function.clone())
            }
            Err(err) => Err(err),
        }
    }
}

async fn persist(path: &Path, code: &str) -> FlowResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|source| FlowError::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    tokio::fs::write(path, code)
        .await
        .map_err(|source| FlowError::WriteFailed { path: path.to_path_buf(), source })
}
