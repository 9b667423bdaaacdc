//! Uncertainty propagation errors.

use super::error_code::{self, CredenceErrorCode};
use super::BeliefError;

/// Errors that abort a Monte Carlo propagation.
/// A failed propagation never yields partial statistics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropagationError {
    #[error("Transform failed on sample {index}: {message}")]
    TransformFailed { index: usize, message: String },

    #[error("Transform output for sample {index} has {actual} dimensions, expected {expected}")]
    OutputShapeMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Belief error: {0}")]
    Belief(#[from] BeliefError),

    #[error("Propagation cancelled")]
    Cancelled,
}

impl CredenceErrorCode for PropagationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::TransformFailed { .. } => error_code::TRANSFORM_FAILED,
            Self::OutputShapeMismatch { .. } => error_code::SHAPE_MISMATCH,
            Self::Belief(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}
