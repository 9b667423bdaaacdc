//! Ensemble beliefs built from raw model outputs.

use serde_json::Value;

use credence_core::{BeliefError, BeliefState, BeliefVector, Metadata};

use super::combine::combine_belief_states;
use super::weights::normalized;

/// Belief from point predictions of several models.
///
/// Mean is the (weighted) average prediction, variance the (weighted)
/// spread of predictions around it. Always epistemic: model disagreement is
/// knowledge uncertainty.
pub fn create_ensemble_belief<P: AsRef<[f64]>>(
    model_predictions: &[P],
    weights: Option<&[f64]>,
) -> Result<BeliefState, BeliefError> {
    let first = model_predictions
        .first()
        .ok_or_else(|| BeliefError::empty("create_ensemble_belief"))?;
    let dims = first.as_ref().len();
    let rows: Vec<BeliefVector> = model_predictions
        .iter()
        .map(|p| BeliefVector::from(p.as_ref()))
        .collect();
    for row in &rows[1..] {
        if row.len() != dims {
            return Err(BeliefError::shape(dims, row.len()));
        }
    }
    let weights = normalized(weights, rows.len())?;

    let mut mean = BeliefVector::filled(0.0, dims);
    for (row, &w) in rows.iter().zip(&weights) {
        mean = mean.add(&row.scale(w))?;
    }
    let mut variance = BeliefVector::filled(0.0, dims);
    for (row, &w) in rows.iter().zip(&weights) {
        variance = variance.add(&row.sub(&mean)?.map(|d| w * d * d))?;
    }

    let mut metadata = Metadata::new();
    metadata.insert("ensemble_size".to_string(), Value::from(rows.len()));
    BeliefState::new(mean, variance, true, metadata)
}

/// Belief from scalar `(mean, variance)` outputs of several probabilistic
/// models, fused by the law of total variance. Always epistemic.
pub fn create_ensemble_from_gaussians(
    outputs: &[(f64, f64)],
    weights: Option<&[f64]>,
) -> Result<BeliefState, BeliefError> {
    let beliefs = outputs
        .iter()
        .map(|&(mean, variance)| BeliefState::scalar(mean, variance, true))
        .collect::<Result<Vec<_>, _>>()?;
    let combined = combine_belief_states(&beliefs, weights)?;
    Ok(combined.with_metadata("ensemble_size", outputs.len()))
}
