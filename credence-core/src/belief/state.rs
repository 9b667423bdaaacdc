//! The `BeliefState` value type and its Bayesian update rule.

use std::collections::BTreeMap;

use serde_json::Value;

use super::vector::BeliefVector;
use crate::errors::BeliefError;

/// Smallest variance a belief may carry. Lower values are clamped up.
pub const VARIANCE_FLOOR: f64 = 1e-10;

/// Provenance metadata. Never interpreted by the core logic.
pub type Metadata = BTreeMap<String, Value>;

/// An uncertain scalar or vector quantity, modeled as independent
/// per-dimension Gaussians.
///
/// `epistemic == true` marks reducible knowledge uncertainty;
/// `false` marks irreducible aleatoric noise.
///
/// Equality compares mean, variance, and the epistemic flag. Metadata is
/// excluded.
#[derive(Debug, Clone)]
pub struct BeliefState {
    mean: BeliefVector,
    variance: BeliefVector,
    epistemic: bool,
    metadata: Metadata,
}

impl BeliefState {
    /// Build a belief, clamping every variance component up to
    /// [`VARIANCE_FLOOR`].
    ///
    /// Fails with `EmptyInput` for zero dimensions, `ShapeMismatch` when the
    /// lengths differ, and `NonFinite` for NaN or infinite components.
    pub fn new(
        mean: impl Into<BeliefVector>,
        variance: impl Into<BeliefVector>,
        epistemic: bool,
        metadata: Metadata,
    ) -> Result<Self, BeliefError> {
        let mean = mean.into();
        let variance = variance.into();

        if mean.is_empty() {
            return Err(BeliefError::empty("belief mean"));
        }
        mean.check_shape(&variance)?;
        if let Some(index) = mean.first_non_finite() {
            return Err(BeliefError::NonFinite {
                field: "mean".to_string(),
                index,
            });
        }
        if let Some(index) = variance.first_non_finite() {
            return Err(BeliefError::NonFinite {
                field: "variance".to_string(),
                index,
            });
        }

        Ok(Self {
            mean,
            variance: variance.map(|v| v.max(VARIANCE_FLOOR)),
            epistemic,
            metadata,
        })
    }

    /// One-dimensional belief with empty metadata.
    pub fn scalar(mean: f64, variance: f64, epistemic: bool) -> Result<Self, BeliefError> {
        Self::new([mean], [variance], epistemic, Metadata::new())
    }

    pub fn mean(&self) -> &BeliefVector {
        &self.mean
    }

    pub fn variance(&self) -> &BeliefVector {
        &self.variance
    }

    pub fn is_epistemic(&self) -> bool {
        self.epistemic
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn dimension(&self) -> usize {
        self.mean.len()
    }

    /// Element-wise standard deviation.
    pub fn std_dev(&self) -> BeliefVector {
        self.variance.map(f64::sqrt)
    }

    /// Element-wise `1 / (1 + variance)`, in (0, 1]. Always recomputed.
    pub fn confidence(&self) -> BeliefVector {
        self.variance.map(|v| 1.0 / (1.0 + v))
    }

    /// Mean of [`confidence`](Self::confidence) across dimensions.
    pub fn mean_confidence(&self) -> f64 {
        self.confidence().mean()
    }

    /// A copy of this belief with one metadata entry added or replaced.
    pub fn with_metadata(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut next = self.clone();
        next.metadata.insert(key.into(), value.into());
        next
    }

    /// A copy of this belief with its metadata replaced.
    pub fn with_metadata_map(&self, metadata: Metadata) -> Self {
        Self {
            metadata,
            ..self.clone()
        }
    }

    /// Precision-weighted Gaussian fusion with new evidence.
    ///
    /// ```text
    /// updated_variance = 1 / (1/variance + weight/new_variance)
    /// updated_mean     = (mean/variance + weight*new_mean/new_variance) * updated_variance
    /// ```
    ///
    /// `weight` scales the evidence relative to the prior; negative weights
    /// are treated as 0. Evidence variance is floored like any other variance.
    /// The prior's epistemic flag and metadata carry over.
    pub fn update_with_evidence(
        &self,
        new_mean: impl Into<BeliefVector>,
        new_variance: impl Into<BeliefVector>,
        weight: f64,
    ) -> Result<Self, BeliefError> {
        let new_mean = new_mean.into();
        let new_variance = new_variance.into().map(|v| v.max(VARIANCE_FLOOR));
        self.mean.check_shape(&new_mean)?;
        self.mean.check_shape(&new_variance)?;
        if !weight.is_finite() {
            return Err(BeliefError::NonFinite {
                field: "weight".to_string(),
                index: 0,
            });
        }
        let weight = weight.max(0.0);

        let prior_precision = self.variance.map(|v| 1.0 / v);
        let evidence_precision = new_variance.map(|v| weight / v);
        let updated_variance = prior_precision
            .add(&evidence_precision)?
            .map(|p| 1.0 / p);

        let prior_term = self.mean.mul(&prior_precision)?;
        let evidence_term = new_mean.mul(&evidence_precision)?;
        let updated_mean = prior_term.add(&evidence_term)?.mul(&updated_variance)?;

        Self::new(
            updated_mean,
            updated_variance,
            self.epistemic,
            self.metadata.clone(),
        )
    }
}

impl PartialEq for BeliefState {
    fn eq(&self, other: &Self) -> bool {
        self.mean == other.mean
            && self.variance == other.variance
            && self.epistemic == other.epistemic
    }
}
