//! The generation pipeline: explanation, planning, elaboration, synthesis.
//!
//! One `generate` call produces a written test module from the current
//! function under test. Each stage builds its own turn sequence from the
//! outputs of the stages before it and calls the completion client exactly
//! once; synthesis is re-run in a bounded loop when the model's output cannot
//! be extracted or does not parse.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::{FlowError, FlowResult};
use crate::domain::models::{FunctionUnderTest, GenerationConfig, ModelsConfig, StageResult, Turn};
use crate::domain::ports::{CompletionClient, CompletionRequest};
use crate::services::extraction::extract_fenced_block;
use crate::services::locator::is_valid_python;
use crate::services::prompts;
use crate::services::transcript::Transcript;

/// Scenario bullets in a plan: top-level `-` and `*` lines, whichever marker
/// the model preferred.
pub fn bullet_count(plan: &str) -> u32 {
    let dashes = plan.lines().filter(|line| line.starts_with('-')).count();
    let stars = plan.lines().filter(|line| line.starts_with('*')).count();
    u32::try_from(dashes.max(stars)).unwrap_or(u32::MAX)
}

/// How many additional edge cases elaboration should ask for.
///
/// A non-positive remainder would make the request degenerate ("a maximum of
/// zero items"), so the bound is clamped to at least one.
pub fn additional_cases_to_request(min_cases: u32, bullets: u32) -> u32 {
    min_cases.saturating_sub(bullets).max(1)
}

fn validate_synthesis(result: StageResult) -> FlowResult<StageResult> {
    let code = extract_fenced_block(&result.raw)?;
    if !is_valid_python(&code) {
        return Err(FlowError::ParseFailed {
            path: PathBuf::from("<synthesized suite>"),
            reason: "generated tests do not parse".to_string(),
        });
    }
    Ok(StageResult::with_code(result.raw, code))
}

/// Drives the explanation → plan → [elaboration] → synthesis pipeline.
pub struct SuiteGenerator {
    client: Arc<dyn CompletionClient>,
    models: ModelsConfig,
    generation: GenerationConfig,
    test_output_path: PathBuf,
    transcript: Transcript,
}

impl SuiteGenerator {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        models: ModelsConfig,
        generation: GenerationConfig,
        test_output_path: PathBuf,
        transcript: Transcript,
    ) -> Self {
        Self { client, models, generation, test_output_path, transcript }
    }

    /// Run one stage: a single completion call over the accumulated turns.
    async fn run_stage(
        &self,
        model: &str,
        turns: Vec<Turn>,
        temperature: f32,
    ) -> FlowResult<StageResult> {
        let reply =
            self.client.complete(CompletionRequest::new(model, turns, temperature)).await?;
        self.transcript.assistant(&reply);
        Ok(StageResult::text(reply))
    }

    /// Generate a test suite for `function` and write it to the configured
    /// module path, overwriting any prior content. Returns the written path.
    pub async fn generate(
        &self,
        function: &FunctionUnderTest,
        temperature: f32,
        min_cases: u32,
    ) -> FlowResult<PathBuf> {
        info!(symbol = %function.name, temperature, min_cases, "generating test suite");

        // Explanation
        let explain_turns = vec![
            Turn::system(prompts::explain_system()),
            Turn::user(prompts::explain_user(&function.source)),
        ];
        self.transcript.turns(&explain_turns);
        let explanation =
            self.run_stage(&self.models.explain, explain_turns.clone(), temperature).await?.raw;

        // Planning
        let plan_request = Turn::user(prompts::plan_user(&self.generation.unit_test_package));
        let mut plan_turns = explain_turns;
        plan_turns.push(Turn::assistant(&explanation));
        plan_turns.push(plan_request.clone());
        self.transcript.turn(&plan_request);
        let plan = self.run_stage(&self.models.plan, plan_turns.clone(), temperature).await?.raw;

        let bullets = bullet_count(&plan);
        debug!(bullets, min_cases, "measured plan density");

        // Elaboration, only when the plan is too thin
        let mut elaboration: Option<(Turn, String)> = None;
        if bullets < min_cases {
            let request =
                Turn::user(prompts::elaboration_user(additional_cases_to_request(min_cases, bullets)));
            info!(bullets, min_cases, "plan below minimum, requesting additional edge cases");
            let mut turns = plan_turns;
            turns.push(Turn::assistant(&plan));
            turns.push(request.clone());
            self.transcript.turn(&request);
            let reply = self.run_stage(&self.models.plan, turns, temperature).await?.raw;
            elaboration = Some((request, reply));
        }

        // Synthesis
        let origin_name = function.origin.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let module = prompts::module_name(origin_name);
        let synthesis_request = Turn::user(prompts::synthesis_user(
            &self.generation.unit_test_package,
            &module,
            function.import_name(),
        ));

        let mut synthesis_turns = vec![
            Turn::system(prompts::synthesis_system()),
            Turn::user(prompts::explain_user(&function.source)),
            Turn::assistant(&explanation),
            Turn::user(prompts::plan_user(&self.generation.unit_test_package)),
            Turn::assistant(&plan),
        ];
        if let Some((request, reply)) = elaboration {
            synthesis_turns.push(request);
            synthesis_turns.push(Turn::assistant(reply));
        }
        synthesis_turns.push(synthesis_request.clone());
        self.transcript.turn(&synthesis_request);

        let mut attempts = 0u32;
        let suite = loop {
            attempts += 1;
            let result = self
                .run_stage(&self.models.execute, synthesis_turns.clone(), temperature)
                .await?;
            match validate_synthesis(result) {
                Ok(validated) => break validated,
                Err(err)
                    if err.is_retryable_format_error()
                        && attempts <= self.generation.reruns_if_fail =>
                {
                    warn!(attempt = attempts, error = %err, "synthesized suite rejected, re-running synthesis");
                }
                Err(err) => {
                    return Err(FlowError::SynthesisFailed { attempts, reason: err.to_string() });
                }
            }
        };

        let code = suite.code.ok_or(FlowError::MissingCodeFence)?;
        self.write_test_module(&code).await?;
        info!(path = %self.test_output_path.display(), "unit tests written");
        Ok(self.test_output_path.clone())
    }

    async fn write_test_module(&self, code: &str) -> FlowResult<()> {
        if let Some(parent) = self.test_output_path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|source| FlowError::WriteFailed {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        tokio::fs::write(&self.test_output_path, code).await.map_err(|source| {
            FlowError::WriteFailed { path: self.test_output_path.clone(), source }
        })
    }
}
