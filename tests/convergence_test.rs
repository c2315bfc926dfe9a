//! End-to-end controller scenarios with scripted completion and runner fakes.

mod common;

use std::sync::Arc;

use tempfile::TempDir;

use common::{
    collection_error_report, failing_report, passing_report, plan_with_bullets, ScriptedRunner,
    StageKind, StagePlayClient,
};
use testforge::{
    ConvergenceConfig, ConvergenceController, CorrectionService, FlowError, FunctionUnderTest,
    GenerationConfig, ModelsConfig, SuiteGenerator, Transcript,
};

fn controller_with(
    dir: &TempDir,
    client: Arc<StagePlayClient>,
    runner: Arc<ScriptedRunner>,
) -> (ConvergenceController, FunctionUnderTest) {
    let generator = SuiteGenerator::new(
        client.clone(),
        ModelsConfig::default(),
        GenerationConfig::default(),
        dir.path().join("tests/unit/test_functions.py"),
        Transcript::disabled(),
    );
    let corrector = CorrectionService::new(
        client,
        "claude-3-5-sonnet-20241022",
        "test_functions.py",
        Transcript::disabled(),
    );
    let controller = ConvergenceController::new(
        generator,
        corrector,
        runner,
        ConvergenceConfig::default(),
        GenerationConfig::default(),
    );
    let function = FunctionUnderTest::new(
        "def add(a, b):\n    return a - b\n",
        "add",
        dir.path().join("src/module_under_test.py"),
    );
    (controller, function)
}

#[tokio::test]
async fn converges_without_correction_when_tests_pass_first() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(StagePlayClient::new(plan_with_bullets(7)));
    let runner = Arc::new(ScriptedRunner::new(vec![passing_report()]));

    let (controller, function) = controller_with(&dir, client.clone(), runner.clone());
    let summary = controller.run(function).await.unwrap();

    assert!(summary.converged);
    assert_eq!(summary.iterations, 1);
    assert_eq!(summary.corrections, 0);
    assert_eq!(summary.escalations, 0);
    assert!(summary.failures.is_none());
    assert_eq!(client.count(StageKind::Correct), 0, "correction never runs on a passing suite");
    assert_eq!(*runner.executions.lock().unwrap(), 1);
    assert!(dir.path().join("tests/unit/test_functions.py").exists());
}

#[tokio::test]
async fn one_bug_converges_at_iteration_two() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(StagePlayClient::new(plan_with_bullets(7)));
    let runner = Arc::new(ScriptedRunner::new(vec![
        failing_report(&[("tests/unit/test_functions.py::test_add", "assert -1 == 3")]),
        passing_report(),
    ]));

    let (controller, function) = controller_with(&dir, client.clone(), runner);
    let origin = function.origin.clone();
    let summary = controller.run(function).await.unwrap();

    assert!(summary.converged);
    assert_eq!(summary.iterations, 2);
    assert_eq!(summary.corrections, 1);
    assert_eq!(summary.escalations, 0);
    assert_eq!(client.count(StageKind::Correct), 1);

    // The corrected source was persisted to the function's origin path.
    let written = std::fs::read_to_string(origin).unwrap();
    assert!(written.contains("def corrected"));
}

#[tokio::test]
async fn uncorrectable_function_escalates_once_then_exhausts() {
    let dir = TempDir::new().unwrap();
    let same = [("tests/unit/test_functions.py::test_add", "assert -1 == 3")];
    let client = Arc::new(StagePlayClient::new(plan_with_bullets(7)));
    let runner = Arc::new(ScriptedRunner::new(vec![
        failing_report(&same),
        failing_report(&same),
        failing_report(&same),
        failing_report(&same),
        failing_report(&same),
    ]));

    let (controller, function) = controller_with(&dir, client.clone(), runner);
    let summary = controller.run(function).await.unwrap();

    assert!(!summary.converged);
    assert_eq!(summary.iterations, 5);
    assert_eq!(summary.corrections, 3, "never more correction cycles than the attempt budget");
    assert_eq!(summary.escalations, 1);
    let failures = summary.failures.expect("last failure set is reported");
    assert_eq!(failures.cases()[0].test_id, "tests/unit/test_functions.py::test_add");

    // Correction temperature rises linearly with stagnation.
    let correction_temps = client.temperatures_for(StageKind::Correct);
    assert_eq!(correction_temps.len(), 3);
    assert!((correction_temps[0] - 0.4).abs() < 1e-6);
    assert!((correction_temps[1] - 0.5).abs() < 1e-6);
    assert!((correction_temps[2] - 0.6).abs() < 1e-6);

    // The escalated regeneration ran at the annealed temperature.
    let synthesis_temps = client.temperatures_for(StageKind::Synthesize);
    assert!((synthesis_temps.last().unwrap() - 1.0).abs() < 1e-6);
}

#[tokio::test]
async fn empty_failure_sets_are_stagnation_eligible_not_fatal() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(StagePlayClient::new(plan_with_bullets(7)));
    let runner = Arc::new(ScriptedRunner::new(vec![
        collection_error_report(),
        collection_error_report(),
        passing_report(),
    ]));

    let (controller, function) = controller_with(&dir, client.clone(), runner);
    let summary = controller.run(function).await.unwrap();

    assert!(summary.converged);
    assert_eq!(summary.iterations, 3);
    assert_eq!(summary.corrections, 2);
}

#[tokio::test]
async fn synthesis_without_fence_exhausts_reruns_then_fails() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(
        StagePlayClient::new(plan_with_bullets(7))
            .with_synthesis_fallback("I would rather describe the tests in prose."),
    );
    let runner = Arc::new(ScriptedRunner::new(vec![]));

    let (controller, function) = controller_with(&dir, client.clone(), runner);
    let err = controller.run(function).await.unwrap_err();

    match err {
        FlowError::SynthesisFailed { attempts, .. } => {
            assert_eq!(attempts, 2, "one initial try plus one rerun");
        }
        other => panic!("expected SynthesisFailed, got {other:?}"),
    }
    assert_eq!(client.count(StageKind::Synthesize), 2);
}

#[tokio::test]
async fn runner_invocation_failure_aborts_the_loop() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(StagePlayClient::new(plan_with_bullets(7)));
    // No scripted reports: the runner errors on first use, like a missing
    // pytest binary would.
    let runner = Arc::new(ScriptedRunner::new(vec![]));

    let (controller, function) = controller_with(&dir, client, runner);
    let err = controller.run(function).await.unwrap_err();
    assert!(matches!(err, FlowError::RunnerInvocation(_)));
}

#[tokio::test]
async fn correction_without_fence_keeps_previous_function() {
    let dir = TempDir::new().unwrap();
    let client = Arc::new(
        StagePlayClient::new(plan_with_bullets(7))
            .with_correction("I cannot produce a code block right now."),
    );
    let runner = Arc::new(ScriptedRunner::new(vec![
        failing_report(&[("t.py::test_x", "boom")]),
        passing_report(),
    ]));

    let (controller, function) = controller_with(&dir, client, runner);
    let origin = function.origin.clone();
    let summary = controller.run(function).await.unwrap();

    assert!(summary.converged);
    assert_eq!(summary.corrections, 1);
    // The fallback kept the original source and wrote nothing.
    assert!(!origin.exists());
}
