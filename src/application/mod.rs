//! Application layer: the convergence loop.

pub mod controller;

pub use controller::{ConvergenceController, RunSummary};
