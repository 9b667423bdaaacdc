//! Confidence-gated execution configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the confidence executor.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Base confidence threshold in [0, 1]. Default: 0.8.
    pub threshold: Option<f64>,
    /// Derive the threshold from decision context. Default: false.
    pub adaptive: Option<bool>,
    /// Lower bound for any resolved threshold. Default: 0.5.
    pub min_threshold: Option<f64>,
    /// Upper bound for any resolved threshold. Default: 0.95.
    pub max_threshold: Option<f64>,
    /// Maximum retained execution records. Default: 1000.
    pub history_capacity: Option<usize>,
}

impl ExecutionConfig {
    pub fn effective_threshold(&self) -> f64 {
        self.threshold.unwrap_or(0.8)
    }

    pub fn effective_adaptive(&self) -> bool {
        self.adaptive.unwrap_or(false)
    }

    pub fn effective_min_threshold(&self) -> f64 {
        self.min_threshold.unwrap_or(0.5)
    }

    pub fn effective_max_threshold(&self) -> f64 {
        self.max_threshold.unwrap_or(0.95)
    }

    pub fn effective_history_capacity(&self) -> usize {
        self.history_capacity.unwrap_or(1000)
    }
}
