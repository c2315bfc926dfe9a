//! Domain services: code location, prompt stages, output parsing.

pub mod correction;
pub mod extraction;
pub mod locator;
pub mod prompts;
pub mod stages;
pub mod transcript;

pub use correction::CorrectionService;
pub use stages::SuiteGenerator;
pub use transcript::Transcript;
