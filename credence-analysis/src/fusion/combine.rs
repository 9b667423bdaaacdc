//! Weighted fusion of belief states by the law of total variance.

use credence_core::{BeliefError, BeliefState, BeliefVector, Metadata};

use super::weights::normalized;

/// Fuse several beliefs of the same shape.
///
/// Weights are normalized to sum to 1 (equal if omitted). The combined mean
/// is the weighted mean; the combined variance is the weighted mean of the
/// variances plus the weighted spread of the means around the combined mean,
/// so disagreement between beliefs widens the result. The result is
/// epistemic if any input is. Metadata merges in order, later keys winning.
pub fn combine_belief_states(
    beliefs: &[BeliefState],
    weights: Option<&[f64]>,
) -> Result<BeliefState, BeliefError> {
    let first = beliefs
        .first()
        .ok_or_else(|| BeliefError::empty("combine_belief_states"))?;
    for belief in &beliefs[1..] {
        first.mean().check_shape(belief.mean())?;
    }
    let weights = normalized(weights, beliefs.len())?;
    let dims = first.dimension();

    let mut mean = BeliefVector::filled(0.0, dims);
    for (belief, &w) in beliefs.iter().zip(&weights) {
        mean = mean.add(&belief.mean().scale(w))?;
    }

    let mut variance = BeliefVector::filled(0.0, dims);
    for (belief, &w) in beliefs.iter().zip(&weights) {
        let spread = belief.mean().sub(&mean)?.map(|d| d * d);
        variance = variance.add(&belief.variance().add(&spread)?.scale(w))?;
    }

    let epistemic = beliefs.iter().any(BeliefState::is_epistemic);
    let metadata = beliefs.iter().fold(Metadata::new(), |mut merged, belief| {
        merged.extend(belief.metadata().iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    });

    BeliefState::new(mean, variance, epistemic, metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identical_beliefs_collapse() {
        let b = BeliefState::scalar(0.6, 0.04, false).unwrap();
        let out = combine_belief_states(&[b.clone(), b.clone()], None).unwrap();
        assert!((out.mean()[0] - 0.6).abs() < 1e-12);
        assert!((out.variance()[0] - 0.04).abs() < 1e-12);
    }

    #[test]
    fn test_disagreement_widens_variance() {
        let a = BeliefState::scalar(0.0, 0.01, false).unwrap();
        let b = BeliefState::scalar(1.0, 0.01, false).unwrap();
        let out = combine_belief_states(&[a, b], None).unwrap();
        assert!((out.mean()[0] - 0.5).abs() < 1e-12);
        // 0.01 within + 0.25 between
        assert!((out.variance()[0] - 0.26).abs() < 1e-12);
    }

    #[test]
    fn test_weighted() {
        let a = BeliefState::scalar(0.0, 0.1, false).unwrap();
        let b = BeliefState::scalar(1.0, 0.3, false).unwrap();
        let out = combine_belief_states(&[a, b], Some(&[3.0, 1.0])).unwrap();
        assert!((out.mean()[0] - 0.25).abs() < 1e-12);
        let expected = 0.75 * 0.1 + 0.25 * 0.3 + 0.75 * 0.0625 + 0.25 * 0.5625;
        assert!((out.variance()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_epistemic_if_any() {
        let a = BeliefState::scalar(0.0, 0.1, false).unwrap();
        let b = BeliefState::scalar(0.0, 0.1, true).unwrap();
        assert!(combine_belief_states(&[a, b], None).unwrap().is_epistemic());
    }

    #[test]
    fn test_metadata_later_wins() {
        let a = BeliefState::scalar(0.0, 0.1, false)
            .unwrap()
            .with_metadata("source", "a")
            .with_metadata("only_a", 1);
        let b = BeliefState::scalar(0.0, 0.1, false)
            .unwrap()
            .with_metadata("source", "b");
        let out = combine_belief_states(&[a, b], None).unwrap();
        assert_eq!(out.metadata()["source"], json!("b"));
        assert_eq!(out.metadata()["only_a"], json!(1));
    }

    #[test]
    fn test_empty_and_mismatch() {
        assert!(matches!(
            combine_belief_states(&[], None),
            Err(BeliefError::EmptyInput { .. })
        ));
        let a = BeliefState::scalar(0.0, 0.1, false).unwrap();
        let b = BeliefState::new([0.0, 1.0], [0.1, 0.1], false, Metadata::new()).unwrap();
        assert!(matches!(
            combine_belief_states(&[a, b], None),
            Err(BeliefError::ShapeMismatch { .. })
        ));
    }
}
