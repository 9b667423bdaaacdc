//! Core types for Credence: belief states, errors, configuration, tracing,
//! and cooperative cancellation.
//!
//! Everything in `credence-analysis` consumes and produces [`BeliefState`]
//! values defined here.

pub mod belief;
pub mod config;
pub mod errors;
pub mod tracing;
pub mod traits;

pub use belief::{BeliefRecord, BeliefState, BeliefVector, Metadata, VARIANCE_FLOOR};
pub use errors::{BeliefError, ConfigError, CredenceError, PropagationError};
