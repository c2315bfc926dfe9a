//! Scripted fakes shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use testforge::{
    CompletionClient, CompletionRequest, ExecutionReport, FlowError, FlowResult, Role, TestRunner,
};

/// Which stage a completion request belongs to, recovered from its final
/// user instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Explain,
    Plan,
    Elaborate,
    Synthesize,
    Correct,
}

pub fn classify(request: &CompletionRequest) -> StageKind {
    let last_user = request
        .turns
        .iter()
        .rev()
        .find(|turn| turn.role == Role::User)
        .expect("request has a user turn");
    let content = &last_user.content;
    if content.contains("Please explain the following Python function") {
        StageKind::Explain
    } else if content.contains("list diverse scenarios") {
        StageKind::Plan
    } else if content.contains("rare or unexpected edge cases") {
        StageKind::Elaborate
    } else if content.contains("write a suite of unit tests") {
        StageKind::Synthesize
    } else if content.contains("Please correct the following Python function") {
        StageKind::Correct
    } else {
        panic!("unrecognized stage prompt: {content}");
    }
}

pub const GOOD_SUITE: &str = "Here are the tests:\n```python\nimport pytest\n\ndef test_generated():\n    assert True\n```";
pub const GOOD_FUNCTION: &str = "Fixed it:\n```python\ndef corrected(x):\n    return x\n```";

/// A plan with exactly `n` top-level scenario bullets.
pub fn plan_with_bullets(n: u32) -> String {
    (0..n).map(|i| format!("- scenario {i}\n  - example input\n")).collect()
}

/// Completion fake that answers each stage with a canned reply and records
/// every request it sees.
pub struct StagePlayClient {
    plan: String,
    synthesis_replies: Mutex<VecDeque<String>>,
    synthesis_fallback: String,
    correction: String,
    pub requests: Mutex<Vec<CompletionRequest>>,
}

impl StagePlayClient {
    pub fn new(plan: impl Into<String>) -> Self {
        Self {
            plan: plan.into(),
            synthesis_replies: Mutex::new(VecDeque::new()),
            synthesis_fallback: GOOD_SUITE.to_string(),
            correction: GOOD_FUNCTION.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue specific synthesis replies; once drained the fallback is used.
    pub fn with_synthesis_replies(self, replies: Vec<String>) -> Self {
        *self.synthesis_replies.lock().unwrap() = replies.into();
        self
    }

    pub fn with_synthesis_fallback(mut self, reply: impl Into<String>) -> Self {
        self.synthesis_fallback = reply.into();
        self
    }

    pub fn with_correction(mut self, reply: impl Into<String>) -> Self {
        self.correction = reply.into();
        self
    }

    pub fn stage_log(&self) -> Vec<StageKind> {
        self.requests.lock().unwrap().iter().map(classify).collect()
    }

    pub fn temperatures_for(&self, kind: StageKind) -> Vec<f32> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|request| classify(request) == kind)
            .map(|request| request.temperature)
            .collect()
    }

    pub fn count(&self, kind: StageKind) -> usize {
        self.stage_log().iter().filter(|k| **k == kind).count()
    }
}

#[async_trait]
impl CompletionClient for StagePlayClient {
    async fn complete(&self, request: CompletionRequest) -> FlowResult<String> {
        let kind = classify(&request);
        self.requests.lock().unwrap().push(request);
        let reply = match kind {
            StageKind::Explain => "- The function processes its input and returns it.".to_string(),
            StageKind::Plan => self.plan.clone(),
            StageKind::Elaborate => "- an unexpected edge case\n  - example".to_string(),
            StageKind::Synthesize => self
                .synthesis_replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.synthesis_fallback.clone()),
            StageKind::Correct => self.correction.clone(),
        };
        Ok(reply)
    }
}

/// Runner fake that replays a fixed sequence of reports.
pub struct ScriptedRunner {
    reports: Mutex<VecDeque<ExecutionReport>>,
    pub executions: Mutex<u32>,
}

impl ScriptedRunner {
    pub fn new(reports: Vec<ExecutionReport>) -> Self {
        Self { reports: Mutex::new(reports.into()), executions: Mutex::new(0) }
    }
}

#[async_trait]
impl TestRunner for ScriptedRunner {
    async fn execute(&self, _test_file: &std::path::Path) -> FlowResult<ExecutionReport> {
        *self.executions.lock().unwrap() += 1;
        self.reports
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| FlowError::RunnerInvocation("scripted reports exhausted".to_string()))
    }
}

pub fn passing_report() -> ExecutionReport {
    ExecutionReport {
        exit_status: 0,
        stdout: "===== 5 passed in 0.03s =====\n".to_string(),
        stderr: String::new(),
    }
}

pub fn failing_report(cases: &[(&str, &str)]) -> ExecutionReport {
    let mut stdout = String::from("=========== short test summary info ===========\n");
    for (test_id, message) in cases {
        stdout.push_str(&format!("FAILED {test_id} - {message}\n"));
    }
    stdout.push_str(&format!("=========== {} failed in 0.11s ===========\n", cases.len()));
    ExecutionReport { exit_status: 1, stdout, stderr: String::new() }
}

/// Non-zero exit with output the failure extractor cannot match.
pub fn collection_error_report() -> ExecutionReport {
    ExecutionReport {
        exit_status: 2,
        stdout: "ERROR: found no collectable tests\n".to_string(),
        stderr: String::new(),
    }
}
