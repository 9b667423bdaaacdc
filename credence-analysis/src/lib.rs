//! Credence analysis engine.
//!
//! - [`propagation`]: Monte Carlo uncertainty propagation through arbitrary transforms.
//! - [`execution`]: confidence-gated execution with adaptive thresholds and bounded history.
//! - [`fusion`]: pure combinators over belief states (fusion, calibration, ensembles).

pub mod execution;
pub mod fusion;
pub mod propagation;

pub use execution::{ConfidenceExecutor, DecisionContext, DeferralRecord, ExecutionOutcome};
pub use propagation::UncertaintyPropagator;
