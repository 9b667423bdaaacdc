//! The confidence executor.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use serde_json::Value;

use credence_core::config::ExecutionConfig;
use credence_core::{BeliefState, BeliefVector, ConfigError, Metadata};

use super::history::{ExecutionHistory, DEFAULT_HISTORY_CAPACITY};
use super::threshold::ThresholdPolicy;
use super::types::{
    DecisionContext, DeferralRecord, DeferralStatus, ExecutionOutcome, ExecutionRecord,
    ExecutionStats, BELOW_THRESHOLD_REASON, REASON_KEY,
};

/// Fallback invoked on deferral: `(belief, reason, extra metadata)`.
pub type Fallback = Arc<dyn Fn(&BeliefState, &str, Option<Metadata>) -> DeferralRecord + Send + Sync>;

/// Default fallback: snapshot the belief into a [`DeferralRecord`] whose
/// metadata holds `reason` on top of any extra entries.
pub fn defer(belief: &BeliefState, reason: &str, metadata: Option<Metadata>) -> DeferralRecord {
    let mut metadata = metadata.unwrap_or_default();
    metadata.insert(REASON_KEY.to_string(), Value::from(reason));
    DeferralRecord {
        status: DeferralStatus::Deferred,
        confidence: belief.mean_confidence(),
        mean: belief.mean().to_vec(),
        variance: belief.variance().to_vec(),
        metadata,
    }
}

/// Executes an action only when a belief's confidence clears a threshold.
///
/// One instance persists across many decisions. The base threshold and the
/// bounded history sit behind locks, so a shared executor records attempts in
/// the order they happened.
pub struct ConfidenceExecutor {
    threshold: RwLock<f64>,
    adaptive: bool,
    min_threshold: f64,
    max_threshold: f64,
    fallback: Fallback,
    history: Mutex<ExecutionHistory>,
}

impl ConfidenceExecutor {
    /// Fails with `ConfigError` when any threshold lies outside `[0, 1]`,
    /// `min_threshold > max_threshold`, or `threshold` lies outside
    /// `[min_threshold, max_threshold]`.
    pub fn new(
        threshold: f64,
        adaptive: bool,
        min_threshold: f64,
        max_threshold: f64,
    ) -> Result<Self, ConfigError> {
        for (field, value) in [
            ("threshold", threshold),
            ("min_threshold", min_threshold),
            ("max_threshold", max_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::validation(
                    field,
                    format!("must be between 0.0 and 1.0, got {value}"),
                ));
            }
        }
        if min_threshold > max_threshold {
            return Err(ConfigError::validation(
                "min_threshold",
                format!("{min_threshold} exceeds max_threshold {max_threshold}"),
            ));
        }
        if !(min_threshold..=max_threshold).contains(&threshold) {
            return Err(ConfigError::validation(
                "threshold",
                format!("{threshold} outside [{min_threshold}, {max_threshold}]"),
            ));
        }

        Ok(Self {
            threshold: RwLock::new(threshold),
            adaptive,
            min_threshold,
            max_threshold,
            fallback: Arc::new(defer),
            history: Mutex::new(ExecutionHistory::new(DEFAULT_HISTORY_CAPACITY)),
        })
    }

    /// Fixed threshold with bounds `[0, 1]`.
    pub fn with_threshold(threshold: f64) -> Result<Self, ConfigError> {
        Self::new(threshold, false, 0.0, 1.0)
    }

    pub fn from_config(config: &ExecutionConfig) -> Result<Self, ConfigError> {
        let executor = Self::new(
            config.effective_threshold(),
            config.effective_adaptive(),
            config.effective_min_threshold(),
            config.effective_max_threshold(),
        )?;
        let capacity = config.effective_history_capacity();
        if capacity == 0 {
            return Err(ConfigError::validation(
                "history_capacity",
                "must be greater than 0",
            ));
        }
        Ok(executor.with_history_capacity(capacity))
    }

    /// Replace the default [`defer`] fallback.
    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&BeliefState, &str, Option<Metadata>) -> DeferralRecord + Send + Sync + 'static,
    ) -> Self {
        self.fallback = Arc::new(fallback);
        self
    }

    /// Replace the history with an empty one of the given capacity.
    pub fn with_history_capacity(self, capacity: usize) -> Self {
        Self {
            history: Mutex::new(ExecutionHistory::new(capacity)),
            ..self
        }
    }

    /// Current base threshold.
    pub fn threshold(&self) -> f64 {
        *self.threshold.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min_threshold, self.max_threshold)
    }

    fn policy(&self) -> ThresholdPolicy {
        self.policy_at(self.threshold())
    }

    fn policy_at(&self, base: f64) -> ThresholdPolicy {
        ThresholdPolicy {
            base,
            adaptive: self.adaptive,
            min: self.min_threshold,
            max: self.max_threshold,
        }
    }

    /// Threshold a decision under `context` would use right now.
    pub fn resolve_threshold(&self, context: Option<&DecisionContext>) -> f64 {
        self.policy().resolve(context)
    }

    /// Run `action` on the belief's mean if its mean confidence clears the
    /// resolved threshold, otherwise defer.
    ///
    /// Never fails: low confidence yields a deferral with reason
    /// `"Confidence below threshold"`, and an action error yields a deferral
    /// with reason `"Action failed: <message>"`.
    pub fn execute<T, E, A>(
        &self,
        belief: &BeliefState,
        action: A,
        context: Option<&DecisionContext>,
    ) -> ExecutionOutcome<T>
    where
        A: FnOnce(&BeliefVector) -> Result<T, E>,
        E: fmt::Display,
    {
        let threshold = self.resolve_threshold(context);
        let confidence = belief.mean_confidence();
        let executed = confidence >= threshold;

        self.lock_history().push(ExecutionRecord {
            confidence,
            threshold,
            executed,
            context: context.cloned(),
        });

        tracing::debug!(
            decision_confidence = confidence,
            decision_threshold = threshold,
            decision_executed = executed,
            "confidence gate evaluated"
        );

        if !executed {
            return ExecutionOutcome::Deferred(self.defer_with(
                belief,
                BELOW_THRESHOLD_REASON,
                threshold,
            ));
        }

        match action(belief.mean()) {
            Ok(value) => ExecutionOutcome::Executed(value),
            Err(e) => {
                let reason = format!("Action failed: {e}");
                tracing::warn!(
                    decision_confidence = confidence,
                    error = %e,
                    "action failed after passing confidence gate, deferring"
                );
                ExecutionOutcome::Deferred(self.defer_with(belief, &reason, threshold))
            }
        }
    }

    /// Invoke the configured fallback directly. The returned record always
    /// carries `reason`, even if a custom fallback dropped it.
    pub fn defer(
        &self,
        belief: &BeliefState,
        reason: &str,
        metadata: Option<Metadata>,
    ) -> DeferralRecord {
        let mut record = (self.fallback)(belief, reason, metadata);
        if record.reason().map_or(true, str::is_empty) {
            record
                .metadata
                .insert(REASON_KEY.to_string(), Value::from(reason));
        }
        record
    }

    fn defer_with(&self, belief: &BeliefState, reason: &str, threshold: f64) -> DeferralRecord {
        let mut metadata = Metadata::new();
        metadata.insert("threshold".to_string(), Value::from(threshold));
        self.defer(belief, reason, Some(metadata))
    }

    /// Move the base threshold by `delta`, clamped to `[min, max]`.
    /// Returns the new base threshold. Non-finite deltas are ignored.
    pub fn adjust_threshold(&self, delta: f64) -> f64 {
        let mut threshold = self.threshold.write().unwrap_or_else(PoisonError::into_inner);
        if delta.is_finite() {
            *threshold = self.policy_at(*threshold).clamp(*threshold + delta);
        }
        *threshold
    }

    pub fn get_execution_stats(&self) -> ExecutionStats {
        self.lock_history().stats()
    }

    /// Snapshot of the history, oldest first.
    pub fn history(&self) -> Vec<ExecutionRecord> {
        self.lock_history().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.lock_history().clear();
    }

    fn lock_history(&self) -> MutexGuard<'_, ExecutionHistory> {
        // Records are appended whole, so a poisoned guard still holds a
        // consistent history.
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ConfidenceExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfidenceExecutor")
            .field("threshold", &self.threshold())
            .field("adaptive", &self.adaptive)
            .field("min_threshold", &self.min_threshold)
            .field("max_threshold", &self.max_threshold)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range_threshold() {
        assert!(ConfidenceExecutor::new(1.2, false, 0.0, 1.0).is_err());
        assert!(ConfidenceExecutor::new(-0.1, false, 0.0, 1.0).is_err());
        assert!(ConfidenceExecutor::new(f64::NAN, false, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_rejects_inverted_bounds() {
        let err = ConfidenceExecutor::new(0.8, true, 0.9, 0.6).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "min_threshold"));
    }

    #[test]
    fn test_rejects_threshold_outside_bounds() {
        let err = ConfidenceExecutor::new(0.99, false, 0.5, 0.95).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "threshold"));
        assert!(ConfidenceExecutor::new(0.4, true, 0.5, 0.95).is_err());
        let exec = ConfidenceExecutor::new(0.95, false, 0.5, 0.95).unwrap();
        assert_eq!(exec.adjust_threshold(0.0), 0.95);
    }

    #[test]
    fn test_fallback_without_reason_gets_one() {
        let exec = ConfidenceExecutor::with_threshold(0.99)
            .unwrap()
            .with_fallback(|belief, _, _| DeferralRecord {
                status: DeferralStatus::Deferred,
                confidence: belief.mean_confidence(),
                mean: belief.mean().to_vec(),
                variance: belief.variance().to_vec(),
                metadata: Metadata::new(),
            });
        let belief = BeliefState::scalar(0.9, 1.0, true).unwrap();
        let record = exec
            .execute(&belief, |_| Ok::<_, String>(()), None)
            .deferred()
            .unwrap();
        assert_eq!(record.reason(), Some(BELOW_THRESHOLD_REASON));

        let blank = ConfidenceExecutor::with_threshold(0.5)
            .unwrap()
            .with_fallback(|belief, _, metadata| defer(belief, "", metadata));
        let record = blank.defer(&belief, "operator hold", None);
        assert_eq!(record.reason(), Some("operator hold"));
    }

    #[test]
    fn test_adjust_threshold_clamps() {
        let exec = ConfidenceExecutor::new(0.8, false, 0.5, 0.95).unwrap();
        assert_eq!(exec.adjust_threshold(10.0), 0.95);
        assert_eq!(exec.adjust_threshold(-10.0), 0.5);
        assert!((exec.adjust_threshold(0.1) - 0.6).abs() < 1e-12);
        assert!((exec.adjust_threshold(f64::NAN) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_custom_fallback() {
        let exec = ConfidenceExecutor::with_threshold(0.99)
            .unwrap()
            .with_fallback(|belief, reason, _| {
                let mut record = defer(belief, reason, None);
                record.metadata.insert("route".into(), Value::from("human_review"));
                record
            });
        let belief = BeliefState::scalar(0.9, 1.0, true).unwrap();
        let record = exec
            .execute(&belief, |_| Ok::<_, String>(()), None)
            .deferred()
            .unwrap();
        assert_eq!(record.metadata["route"], Value::from("human_review"));
        assert_eq!(record.reason(), Some(BELOW_THRESHOLD_REASON));
    }

    #[test]
    fn test_from_config_capacity() {
        let config = ExecutionConfig {
            history_capacity: Some(2),
            ..Default::default()
        };
        let exec = ConfidenceExecutor::from_config(&config).unwrap();
        let belief = BeliefState::scalar(0.0, 0.01, true).unwrap();
        for _ in 0..5 {
            exec.execute(&belief, |_| Ok::<_, String>(()), None);
        }
        assert_eq!(exec.get_execution_stats().total_attempts, 2);
    }
}
