//! Fenced-block extraction and test-runner output parsing.
//!
//! Both live here so the controller never touches raw model text or raw
//! runner output: stages hand it a `StageResult`, the runner adapter hands it
//! an `ExecutionReport`, and this module turns the latter into a
//! `FailureSet`. Swapping test runners means swapping the parsing in this
//! module only.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::{FlowError, FlowResult};
use crate::domain::models::{ExecutionReport, FailureCase, FailureSet};

/// Extract the first fenced code block from model output.
///
/// The opening marker's info string (e.g. `python`) is discarded along with
/// everything before the fence and after its closing marker.
pub fn extract_fenced_block(text: &str) -> FlowResult<String> {
    let open = text.find("```").ok_or(FlowError::MissingCodeFence)?;
    let after_marker = &text[open + 3..];

    // Body starts after the info string on the opening line.
    let body_start = after_marker.find('\n').map(|i| i + 1).ok_or(FlowError::MissingCodeFence)?;
    let body = &after_marker[body_start..];

    let close = body.find("```").ok_or(FlowError::MissingCodeFence)?;
    Ok(body[..close].trim().to_string())
}

static FAILED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^FAILED\s+(\S+)(?:\s+-\s+(.*))?$").expect("failure pattern compiles")
});

/// Parse failing tests out of a pytest run.
///
/// Matches the per-test `FAILED <id> - <message>` lines of pytest's short
/// summary, pairing identifiers and messages positionally. No matches yields
/// an empty set, never an error; the controller decides what an empty set
/// alongside a non-zero exit status means.
pub fn extract_failures(report: &ExecutionReport) -> FailureSet {
    let cases = FAILED_LINE
        .captures_iter(&report.stdout)
        .map(|cap| FailureCase {
            test_id: cap[1].to_string(),
            detail: cap.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        })
        .collect();
    FailureSet::new(cases)
}
