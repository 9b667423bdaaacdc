//! Threshold resolution.

use serde::{Deserialize, Serialize};

use super::types::DecisionContext;

/// How a decision threshold is derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPolicy {
    pub base: f64,
    pub adaptive: bool,
    pub min: f64,
    pub max: f64,
}

impl ThresholdPolicy {
    /// Resolve the threshold for one decision.
    ///
    /// Fixed policies return `base`. Adaptive policies average `base`,
    /// `min(1, risk + 0.2)` and `min(1, criticality + 0.1)`, then clamp to
    /// `[min, max]`. Missing context fields count as 0.5.
    pub fn resolve(&self, context: Option<&DecisionContext>) -> f64 {
        if !self.adaptive {
            return self.base;
        }
        let defaults = DecisionContext::default();
        let context = context.unwrap_or(&defaults);
        let risk_term = (context.effective_risk_level() + 0.2).min(1.0);
        let criticality_term = (context.effective_criticality() + 0.1).min(1.0);
        let averaged = (self.base + risk_term + criticality_term) / 3.0;
        self.clamp(averaged)
    }

    /// Clamp a candidate base threshold to `[min, max]`.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}
