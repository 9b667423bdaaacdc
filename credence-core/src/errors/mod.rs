//! Error handling for Credence.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod belief_error;
pub mod config_error;
pub mod credence_error;
pub mod error_code;
pub mod propagation_error;

pub use belief_error::BeliefError;
pub use config_error::ConfigError;
pub use credence_error::CredenceError;
pub use error_code::CredenceErrorCode;
pub use propagation_error::PropagationError;
