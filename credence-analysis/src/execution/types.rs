//! Decision context, execution records, deferral records, and outcomes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use credence_core::Metadata;

/// Risk level assumed when the context does not supply one.
pub const DEFAULT_RISK_LEVEL: f64 = 0.5;

/// Criticality assumed when the context does not supply one.
pub const DEFAULT_CRITICALITY: f64 = 0.5;

/// Metadata key carrying the deferral reason.
pub const REASON_KEY: &str = "reason";

/// Reason recorded when confidence does not clear the threshold.
pub const BELOW_THRESHOLD_REASON: &str = "Confidence below threshold";

/// Caller-supplied context for adaptive threshold resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criticality: Option<f64>,
    /// Free-form attributes kept with the execution record.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub attributes: Metadata,
}

impl DecisionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_risk_level(mut self, risk_level: f64) -> Self {
        self.risk_level = Some(risk_level);
        self
    }

    pub fn with_criticality(mut self, criticality: f64) -> Self {
        self.criticality = Some(criticality);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Risk level, defaulting to 0.5.
    pub fn effective_risk_level(&self) -> f64 {
        self.risk_level.unwrap_or(DEFAULT_RISK_LEVEL)
    }

    /// Criticality, defaulting to 0.5.
    pub fn effective_criticality(&self) -> f64 {
        self.criticality.unwrap_or(DEFAULT_CRITICALITY)
    }
}

/// One execution attempt. Created at decision time, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub confidence: f64,
    pub threshold: f64,
    /// Whether confidence cleared the threshold. An action that then fails
    /// still counts as executed here.
    pub executed: bool,
    pub context: Option<DecisionContext>,
}

/// Discriminator marking a [`DeferralRecord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferralStatus {
    #[default]
    Deferred,
}

/// Structured "no action taken" result. The shape is stable; callers branch
/// on `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferralRecord {
    pub status: DeferralStatus,
    /// Mean confidence of the belief at decision time.
    pub confidence: f64,
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    /// Always contains `reason`.
    pub metadata: Metadata,
}

impl DeferralRecord {
    pub fn reason(&self) -> Option<&str> {
        self.metadata.get(REASON_KEY).and_then(Value::as_str)
    }
}

/// Result of a confidence-gated decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionOutcome<T> {
    Executed(T),
    Deferred(DeferralRecord),
}

impl<T> ExecutionOutcome<T> {
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed(_))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    pub fn executed(self) -> Option<T> {
        match self {
            Self::Executed(value) => Some(value),
            Self::Deferred(_) => None,
        }
    }

    pub fn deferred(self) -> Option<DeferralRecord> {
        match self {
            Self::Executed(_) => None,
            Self::Deferred(record) => Some(record),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ExecutionOutcome<U> {
        match self {
            Self::Executed(value) => ExecutionOutcome::Executed(f(value)),
            Self::Deferred(record) => ExecutionOutcome::Deferred(record),
        }
    }
}

/// Aggregates over the current history. All zero when the history is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStats {
    pub total_attempts: usize,
    pub executed_count: usize,
    pub executed_ratio: f64,
    pub avg_confidence: f64,
    pub avg_threshold: f64,
}
