//! Error types for the pipeline core
//!
//! The core has a deliberately small error surface: geometry reduction and
//! aggregation are total, and collaborator failures degrade to empty cycles
//! rather than crossing the pipeline boundary.

use thiserror::Error;

/// Errors surfaced by the pipeline core
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A producer handed in corner coordinates outside the normalized [0, 1]
    /// range (or NaN/infinite). Only the checked reducer entry point raises
    /// this; the unchecked one treats the range as a precondition.
    #[error("invalid geometry in observation {observation}: {detail}")]
    InvalidGeometry { observation: usize, detail: String },
}
