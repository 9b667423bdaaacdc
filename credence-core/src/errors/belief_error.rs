//! Belief state errors.

use super::error_code::{self, CredenceErrorCode};

/// Errors raised while constructing or combining belief states.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BeliefError {
    #[error("Shape mismatch: expected {expected} dimensions, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Empty input: {what} requires at least one element")]
    EmptyInput { what: String },

    #[error("Non-finite value in {field} at index {index}")]
    NonFinite { field: String, index: usize },

    #[error("Invalid belief record: {0}")]
    InvalidRecord(String),

    #[error("Invalid weights: {0}")]
    InvalidWeights(String),
}

impl BeliefError {
    pub fn shape(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    pub fn empty(what: &str) -> Self {
        Self::EmptyInput {
            what: what.to_string(),
        }
    }
}

impl CredenceErrorCode for BeliefError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ShapeMismatch { .. } => error_code::SHAPE_MISMATCH,
            Self::EmptyInput { .. } => error_code::EMPTY_INPUT,
            Self::NonFinite { .. } => error_code::NON_FINITE,
            Self::InvalidRecord(_) => error_code::INVALID_RECORD,
            Self::InvalidWeights(_) => error_code::INVALID_WEIGHTS,
        }
    }
}
