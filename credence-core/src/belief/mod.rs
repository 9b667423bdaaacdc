//! Belief states: per-dimension Gaussian summaries of uncertain quantities.
//!
//! A belief is a mean vector, a variance vector of the same length, an
//! epistemic/aleatoric tag, and free-form provenance metadata. Beliefs are
//! never mutated in place; every transformation returns a new value.

pub mod record;
pub mod state;
pub mod vector;

pub use record::BeliefRecord;
pub use state::{BeliefState, Metadata, VARIANCE_FLOOR};
pub use vector::BeliefVector;
