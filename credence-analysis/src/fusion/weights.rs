//! Weight validation and normalization shared by the combinators.

use credence_core::BeliefError;

/// Normalize `weights` to sum to 1, or return equal weights for `n` items
/// when none are given.
///
/// Weights must match `n` in length, be finite and non-negative, and have a
/// positive sum.
pub(crate) fn normalized(weights: Option<&[f64]>, n: usize) -> Result<Vec<f64>, BeliefError> {
    let Some(weights) = weights else {
        return Ok(vec![1.0 / n as f64; n]);
    };
    if weights.len() != n {
        return Err(BeliefError::shape(n, weights.len()));
    }
    if let Some(index) = weights.iter().position(|w| !w.is_finite()) {
        return Err(BeliefError::NonFinite {
            field: "weights".to_string(),
            index,
        });
    }
    if weights.iter().any(|&w| w < 0.0) {
        return Err(BeliefError::InvalidWeights(
            "weights must be non-negative".to_string(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(BeliefError::InvalidWeights(
            "weights must have a positive sum".to_string(),
        ));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}
