//! Infrastructure layer: adapters for the completion service, the test
//! runner and configuration loading.

pub mod anthropic;
pub mod config;
pub mod pytest;

pub use anthropic::AnthropicClient;
pub use pytest::PytestRunner;
