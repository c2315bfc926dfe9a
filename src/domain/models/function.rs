//! The function (or class) whose behavior is being tested and repaired.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Source snapshot of the symbol under test.
///
/// Immutable within an iteration: the correction stage produces a whole new
/// value that replaces the old one at the top of the next iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionUnderTest {
    /// Unparsed source text of the definition, including decorators and,
    /// for classes, nested methods.
    pub source: String,
    /// Symbol name as given on the command line.
    pub name: String,
    /// Absolute path of the file the symbol was located in.
    pub origin: PathBuf,
}

impl FunctionUnderTest {
    pub fn new(source: impl Into<String>, name: impl Into<String>, origin: PathBuf) -> Self {
        Self { source: source.into(), name: name.into(), origin }
    }

    /// Name used in the generated `from ... import ...` line: everything
    /// before the first `(`, so a signature-style name degrades gracefully.
    pub fn import_name(&self) -> &str {
        self.name.split('(').next().unwrap_or(&self.name).trim()
    }

    /// Replace the source after a successful correction.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self { source: source.into(), name: self.name.clone(), origin: self.origin.clone() }
    }
}
