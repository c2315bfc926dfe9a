//! Testforge - LLM-driven unit test generation and repair
//!
//! Testforge points a language model at a Python function or class, asks it
//! to explain the code, plan test scenarios, and synthesize a pytest suite,
//! then runs the suite and - if tests fail - asks the model to patch the
//! function, looping until the tests pass or a retry budget is exhausted.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, port traits and the error taxonomy
//! - **Service Layer** (`services`): Code location, prompt stages, output parsing
//! - **Application Layer** (`application`): The convergence controller
//! - **Infrastructure Layer** (`infrastructure`): Completion-service and
//!   test-runner adapters, configuration loading
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use testforge::application::ConvergenceController;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire adapters and run the controller
//!     Ok(())
//! }
//! ```

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{ConvergenceController, RunSummary};
pub use domain::errors::{FlowError, FlowResult};
pub use domain::models::{
    Config, ConvergenceConfig, ExecutionReport, FailureCase, FailureSet, FunctionUnderTest,
    GenerationConfig, ModelsConfig, Role, RunnerConfig, StageResult, Turn,
};
pub use domain::ports::{CompletionClient, CompletionRequest, TestRunner};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::{AnthropicClient, PytestRunner};
pub use services::{CorrectionService, SuiteGenerator, Transcript};
