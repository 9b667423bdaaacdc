//! Empirical variance calibration against ground truth.

use serde_json::Value;

use credence_core::{BeliefError, BeliefState};

/// Rescale a belief's variance so its average matches the observed mean
/// squared error of `(predictions, actuals)`.
///
/// `variance *= mse / mean(variance)`; the mean is unchanged and metadata
/// gains `calibrated: true` and `calibration_mse`.
pub fn calibrate_belief_state(
    belief: &BeliefState,
    calibration_data: (&[f64], &[f64]),
) -> Result<BeliefState, BeliefError> {
    let (predictions, actuals) = calibration_data;
    if predictions.is_empty() {
        return Err(BeliefError::empty("calibration predictions"));
    }
    if predictions.len() != actuals.len() {
        return Err(BeliefError::shape(predictions.len(), actuals.len()));
    }
    if let Some(index) = predictions
        .iter()
        .chain(actuals)
        .position(|v| !v.is_finite())
    {
        return Err(BeliefError::NonFinite {
            field: "calibration_data".to_string(),
            index: index % predictions.len(),
        });
    }

    let mse = predictions
        .iter()
        .zip(actuals)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / predictions.len() as f64;
    let scale = mse / belief.variance().mean();

    let mut metadata = belief.metadata().clone();
    metadata.insert("calibrated".to_string(), Value::Bool(true));
    metadata.insert("calibration_mse".to_string(), Value::from(mse));

    BeliefState::new(
        belief.mean().clone(),
        belief.variance().scale(scale),
        belief.is_epistemic(),
        metadata,
    )
}
