//! Confidence-gated execution.
//!
//! Per decision: resolve a threshold (fixed or adaptive), measure the
//! belief's mean confidence, record the attempt, then either run the action
//! or defer. Deferral is an ordinary outcome, not an error.

pub mod executor;
pub mod history;
pub mod threshold;
pub mod types;

pub use executor::{defer, ConfidenceExecutor, Fallback};
pub use history::ExecutionHistory;
pub use threshold::ThresholdPolicy;
pub use types::{
    DecisionContext, DeferralRecord, DeferralStatus, ExecutionOutcome, ExecutionRecord,
    ExecutionStats,
};
