//! Benchmark setup error type.

use streetprint_core::StreetprintError;

use crate::street::SyntheticError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic grid generation failed.
    #[error("synthetic grid generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// A pipeline stage rejected the prepared input.
    #[error("pipeline stage failed: {0}")]
    Pipeline(#[from] StreetprintError),
}
