//! Structured (de)serialization of belief states.
//!
//! The record field set is `mean`, `variance`, `confidence`, `epistemic`,
//! `metadata`. `confidence` is written on export for readers' convenience and
//! ignored on import; it is always re-derived from variance.

use serde::{Deserialize, Serialize};

use super::state::{BeliefState, Metadata};
use crate::errors::BeliefError;

/// Plain-data form of a [`BeliefState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefRecord {
    pub mean: Vec<f64>,
    pub variance: Vec<f64>,
    #[serde(default)]
    pub confidence: Vec<f64>,
    pub epistemic: bool,
    #[serde(default)]
    pub metadata: Metadata,
}

impl BeliefState {
    pub fn to_record(&self) -> BeliefRecord {
        BeliefRecord {
            mean: self.mean().to_vec(),
            variance: self.variance().to_vec(),
            confidence: self.confidence().to_vec(),
            epistemic: self.is_epistemic(),
            metadata: self.metadata().clone(),
        }
    }

    /// Rebuild a belief from a record, re-validating shape and values.
    pub fn from_record(record: BeliefRecord) -> Result<Self, BeliefError> {
        Self::new(record.mean, record.variance, record.epistemic, record.metadata)
    }

    pub fn to_json(&self) -> Result<String, BeliefError> {
        serde_json::to_string(&self.to_record())
            .map_err(|e| BeliefError::InvalidRecord(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, BeliefError> {
        let record: BeliefRecord =
            serde_json::from_str(json).map_err(|e| BeliefError::InvalidRecord(e.to_string()))?;
        Self::from_record(record)
    }
}

impl From<&BeliefState> for BeliefRecord {
    fn from(belief: &BeliefState) -> Self {
        belief.to_record()
    }
}

impl TryFrom<BeliefRecord> for BeliefState {
    type Error = BeliefError;

    fn try_from(record: BeliefRecord) -> Result<Self, Self::Error> {
        Self::from_record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_carries_confidence() {
        let b = BeliefState::scalar(0.9, 1.0, true).unwrap();
        let r = b.to_record();
        assert_eq!(r.confidence, vec![0.5]);
        assert_eq!(r.mean, vec![0.9]);
        assert!(r.epistemic);
    }

    #[test]
    fn test_round_trip_preserves_metadata() {
        let b = BeliefState::new([0.1, 0.2], [0.3, 0.4], false, Metadata::new())
            .unwrap()
            .with_metadata("sensor", "thermo-3");
        let back = BeliefState::from_record(b.to_record()).unwrap();
        assert_eq!(back, b);
        assert_eq!(back.metadata().get("sensor"), Some(&json!("thermo-3")));
    }

    #[test]
    fn test_stale_confidence_is_ignored() {
        let record = BeliefRecord {
            mean: vec![0.0],
            variance: vec![1.0],
            confidence: vec![0.99],
            epistemic: true,
            metadata: Metadata::new(),
        };
        let b = BeliefState::from_record(record).unwrap();
        assert!((b.confidence()[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_json_without_confidence_field() {
        let b = BeliefState::from_json(r#"{"mean":[1.0],"variance":[0.5],"epistemic":false}"#)
            .unwrap();
        assert_eq!(b.dimension(), 1);
        assert!(!b.is_epistemic());
    }

    #[test]
    fn test_malformed_json() {
        let err = BeliefState::from_json("{not json").unwrap_err();
        assert!(matches!(err, BeliefError::InvalidRecord(_)));
    }

    #[test]
    fn test_mismatched_record_rejected() {
        let err = BeliefState::from_json(r#"{"mean":[1.0,2.0],"variance":[0.5],"epistemic":false}"#)
            .unwrap_err();
        assert!(matches!(err, BeliefError::ShapeMismatch { .. }));
    }
}
