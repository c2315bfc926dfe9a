//! Port trait definitions (hexagonal architecture).
//!
//! The domain and application layers depend on these traits; the adapters in
//! `infrastructure` implement them. Tests substitute scripted fakes.

pub mod completion;
pub mod test_runner;

pub use completion::{CompletionClient, CompletionRequest};
pub use test_runner::TestRunner;
