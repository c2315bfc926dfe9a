//! Execution reports and normalized failure sets.

use serde::{Deserialize, Serialize};

/// Captured outcome of one test-runner invocation.
///
/// Read-only after creation. A non-zero exit status is the expected
/// "tests failed" signal, not a fault.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionReport {
    pub fn passed(&self) -> bool {
        self.exit_status == 0
    }
}

/// One failing test paired with its error summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureCase {
    pub test_id: String,
    pub detail: String,
}

/// Ordered collection of failing tests derived from one execution report.
///
/// Compared by content to detect stagnation: two consecutive iterations
/// producing an equal set means the correction made no observable difference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSet {
    cases: Vec<FailureCase>,
}

impl FailureSet {
    pub fn new(cases: Vec<FailureCase>) -> Self {
        Self { cases }
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn cases(&self) -> &[FailureCase] {
        &self.cases
    }

    /// Normalized rendering used in correction prompts and terminal output.
    pub fn render(&self) -> String {
        self.cases
            .iter()
            .map(|case| format!("Test case: {}\nError: {}", case.test_id, case.detail))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl std::fmt::Display for FailureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, detail: &str) -> FailureCase {
        FailureCase { test_id: id.into(), detail: detail.into() }
    }

    #[test]
    fn test_report_passed() {
        let ok = ExecutionReport { exit_status: 0, stdout: String::new(), stderr: String::new() };
        let bad = ExecutionReport { exit_status: 1, stdout: String::new(), stderr: String::new() };
        assert!(ok.passed());
        assert!(!bad.passed());
    }

    #[test]
    fn test_failure_set_equality_is_content_and_order() {
        let a = FailureSet::new(vec![case("t::x", "boom"), case("t::y", "bang")]);
        let b = FailureSet::new(vec![case("t::x", "boom"), case("t::y", "bang")]);
        let c = FailureSet::new(vec![case("t::y", "bang"), case("t::x", "boom")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_render_pairs_id_and_detail() {
        let set = FailureSet::new(vec![case("tests/unit/test_functions.py::test_add", "assert 2 == 3")]);
        let rendered = set.render();
        assert!(rendered.contains("Test case: tests/unit/test_functions.py::test_add"));
        assert!(rendered.contains("Error: assert 2 == 3"));
    }

    #[test]
    fn test_empty_sets_are_equal() {
        assert_eq!(FailureSet::default(), FailureSet::new(vec![]));
        assert!(FailureSet::default().is_empty());
    }
}
