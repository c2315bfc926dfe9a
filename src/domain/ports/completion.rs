//! Port for the text-completion service.

use async_trait::async_trait;

use crate::domain::errors::FlowResult;
use crate::domain::models::Turn;

/// One completion exchange: ordered turns, a model id and a temperature.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, turns: Vec<Turn>, temperature: f32) -> Self {
        Self { model: model.into(), turns, temperature }
    }
}

/// Client for a remote text-generation service.
///
/// `complete` always yields the single final text: implementations that
/// stream concatenate the incremental fragments internally, so callers never
/// branch on the transport mode.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> FlowResult<String>;
}
