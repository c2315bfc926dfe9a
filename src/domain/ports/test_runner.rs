//! Port for the external test runner.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::FlowResult;
use crate::domain::models::ExecutionReport;

/// Runs a test module and captures its outcome.
///
/// A non-zero exit status is data in the `ExecutionReport`, not an `Err`;
/// `Err` is reserved for the runner itself being unlaunchable or timing out,
/// which the controller treats as fatal.
#[async_trait]
pub trait TestRunner: Send + Sync {
    async fn execute(&self, test_file: &Path) -> FlowResult<ExecutionReport>;
}
