//! Anthropic Messages API adapter for the completion port.

pub mod client;
pub mod types;

pub use client::AnthropicClient;
