//! Error taxonomy for the generation-and-repair flow.
//!
//! Locator, completion-service and runner-invocation errors are fatal and
//! abort the loop; format and syntax errors in model output are retried (or,
//! for corrections, recovered) before becoming fatal. Test failures are not
//! errors at all; they travel through `ExecutionReport` and `FailureSet`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised across the flow.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} as Python: {reason}")]
    ParseFailed { path: PathBuf, reason: String },

    #[error("symbol '{symbol}' not found in {path}")]
    SymbolNotFound { symbol: String, path: PathBuf },

    #[error("ANTHROPIC_API_KEY is not set and no api_key is configured")]
    MissingCredential,

    #[error("completion request failed: {0}")]
    CompletionFailed(String),

    #[error("model response contained no fenced code block")]
    MissingCodeFence,

    #[error("test synthesis failed after {attempts} attempt(s): {reason}")]
    SynthesisFailed { attempts: u32, reason: String },

    #[error("could not invoke test runner: {0}")]
    RunnerInvocation(String),

    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FlowError {
    /// Whether the synthesis pipeline may retry after this error.
    ///
    /// Only malformed model output qualifies; everything else aborts.
    pub fn is_retryable_format_error(&self) -> bool {
        matches!(self, FlowError::MissingCodeFence | FlowError::ParseFailed { .. })
    }
}

pub type FlowResult<T> = Result<T, FlowError>;
