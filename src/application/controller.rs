//! Convergence controller for the generate–execute–correct loop.
//!
//! Drives the stage pipeline and the test runner through bounded iterations:
//! a passing run ends the loop immediately; a failing run either triggers a
//! correction (with linearly rising temperature), an escalation to full
//! suite regeneration (when the failure set has stopped changing), or
//! exhaustion once the correction budget is spent. Completion-service and
//! runner-invocation errors abort the loop; only test failures drive it.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::FlowResult;
use crate::domain::models::{ConvergenceConfig, FailureSet, FunctionUnderTest, GenerationConfig};
use crate::domain::ports::TestRunner;
use crate::services::extraction::extract_failures;
use crate::services::{CorrectionService, SuiteGenerator};

/// Final report of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub converged: bool,
    pub iterations: u32,
    pub corrections: u32,
    pub escalations: u32,
    pub test_file: PathBuf,
    /// Last observed failure set when the run did not converge.
    pub failures: Option<FailureSet>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Loop-private state. Created at INIT, mutated once per iteration,
/// dropped when the loop terminates.
#[derive(Debug)]
struct LoopState {
    current: FunctionUnderTest,
    previous_failures: Option<FailureSet>,
    stagnation_count: u32,
    attempts_remaining: u32,
}

impl LoopState {
    fn new(current: FunctionUnderTest, attempts_remaining: u32) -> Self {
        Self { current, previous_failures: None, stagnation_count: 0, attempts_remaining }
    }

    /// Fold a newly observed failure set into the stagnation bookkeeping.
    ///
    /// Returns true when the set is exactly equal to the previous one. Any
    /// change, including from one empty set to a different set, resets the
    /// count to zero.
    fn observe(&mut self, failures: &FailureSet) -> bool {
        if self.previous_failures.as_ref() == Some(failures) {
            self.stagnation_count += 1;
            true
        } else {
            self.stagnation_count = 0;
            self.previous_failures = Some(failures.clone());
            false
        }
    }
}

/// Temperature for a correction cycle: rises linearly with stagnation.
pub fn correction_temperature(config: &ConvergenceConfig, stagnation_count: u32) -> f32 {
    config.base_temperature + config.correction_temperature_step * stagnation_count as f32
}

/// Temperature for an escalated regeneration: the spread scaled by how much
/// of the stagnation budget was consumed.
pub fn escalation_temperature(config: &ConvergenceConfig, stagnation_count: u32) -> f32 {
    config.base_temperature
        + config.escalation_temperature_spread * stagnation_count as f32
            / config.stagnation_ceiling as f32
}

pub struct ConvergenceController {
    generator: SuiteGenerator,
    corrector: CorrectionService,
    runner: Arc<dyn TestRunner>,
    convergence: ConvergenceConfig,
    generation: GenerationConfig,
}

impl ConvergenceController {
    pub fn new(
        generator: SuiteGenerator,
        corrector: CorrectionService,
        runner: Arc<dyn TestRunner>,
        convergence: ConvergenceConfig,
        generation: GenerationConfig,
    ) -> Self {
        Self { generator, corrector, runner, convergence, generation }
    }

    /// Run the loop to termination for an already-located function.
    pub async fn run(&self, function: FunctionUnderTest) -> FlowResult<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%run_id, symbol = %function.name, "starting convergence loop");

        let mut state = LoopState::new(function, self.convergence.max_correction_attempts);
        let mut iterations = 0u32;
        let mut corrections = 0u32;
        let mut escalations = 0u32;

        let mut test_file = self
            .generator
            .generate(
                &state.current,
                self.convergence.base_temperature,
                self.generation.approx_min_cases_to_cover,
            )
            .await?;

        loop {
            iterations += 1;
            let report = self.runner.execute(&test_file).await?;

            if report.passed() {
                info!(iterations, corrections, "all tests passed");
                return Ok(RunSummary {
                    run_id,
                    converged: true,
                    iterations,
                    corrections,
                    escalations,
                    test_file,
                    failures: None,
                    started_at,
                    finished_at: Utc::now(),
                });
            }

            let failures = extract_failures(&report);
            if failures.is_empty() {
                // Collection errors and crashes land here: the suite failed
                // but no per-test cases were identifiable.
                warn!(
                    exit_status = report.exit_status,
                    "tests failed but no failing cases were identified in runner output"
                );
            }

            if state.observe(&failures) {
                warn!(
                    stagnation_count = state.stagnation_count,
                    "failure set unchanged since previous iteration"
                );
            }

            if state.stagnation_count >= self.convergence.stagnation_ceiling {
                let temperature = escalation_temperature(&self.convergence, state.stagnation_count);
                escalations += 1;
                warn!(temperature, "escalating: regenerating the test suite from scratch");
                state.stagnation_count = 0;
                test_file = self
                    .generator
                    .generate(&state.current, temperature, self.generation.escalated_min_cases)
                    .await?;
                continue;
            }

            if state.attempts_remaining == 0 {
                warn!(iterations, "correction attempts exhausted; did not converge");
                return Ok(RunSummary {
                    run_id,
                    converged: false,
                    iterations,
                    corrections,
                    escalations,
                    test_file,
                    failures: Some(failures),
                    started_at,
                    finished_at: Utc::now(),
                });
            }

            let temperature = correction_temperature(&self.convergence, state.stagnation_count);
            let corrected =
                self.corrector.correct(&state.current, &report, &failures, temperature).await?;
            state.current = corrected;
            state.attempts_remaining -= 1;
            corrections += 1;

            test_file = self
                .generator
                .generate(
                    &state.current,
                    self.convergence.base_temperature,
                    self.generation.approx_min_cases_to_cover,
                )
                .await?;
        }
    }
}
