//! Top-level error aggregating every subsystem error via `From` conversions.

use super::error_code::CredenceErrorCode;
use super::{BeliefError, ConfigError, PropagationError};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CredenceError {
    #[error("Belief error: {0}")]
    Belief(#[from] BeliefError),

    #[error("Propagation error: {0}")]
    Propagation(#[from] PropagationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CredenceErrorCode for CredenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Belief(e) => e.error_code(),
            Self::Propagation(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}
