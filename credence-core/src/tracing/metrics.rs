//! Structured span field names shared across Credence subsystems.
//!
//! Consistent names keep log queries over decisions and propagations uniform.

/// Propagation: number of Monte Carlo samples drawn.
pub const PROPAGATION_SAMPLES: &str = "propagation_samples";

/// Propagation: whether samples were evaluated on the worker pool.
pub const PROPAGATION_PARALLEL: &str = "propagation_parallel";

/// Propagation: wall time for one propagation in milliseconds.
pub const PROPAGATION_TIME: &str = "propagation_time";

/// Execution: scalar confidence measured for a decision.
pub const DECISION_CONFIDENCE: &str = "decision_confidence";

/// Execution: resolved threshold for a decision.
pub const DECISION_THRESHOLD: &str = "decision_threshold";

/// Execution: whether the action ran.
pub const DECISION_EXECUTED: &str = "decision_executed";
