//! Output of one prompt stage.

/// Result of a single stage invocation.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Full text returned by the completion service.
    pub raw: String,
    /// First fenced code block in `raw`, when the stage extracts one.
    pub code: Option<String>,
}

impl StageResult {
    pub fn text(raw: impl Into<String>) -> Self {
        Self { raw: raw.into(), code: None }
    }

    pub fn with_code(raw: impl Into<String>, code: impl Into<String>) -> Self {
        Self { raw: raw.into(), code: Some(code.into()) }
    }
}
