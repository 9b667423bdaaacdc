//! Small fixed-length float vector used for belief arithmetic.
//!
//! Beliefs are low-dimensional, so storage is inline up to four dimensions
//! and spills to the heap beyond that.

use std::ops::Index;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::errors::BeliefError;

/// Inline capacity before spilling to the heap.
const INLINE_DIMS: usize = 4;

/// An ordered sequence of `f64` with element-wise arithmetic.
///
/// Binary operations require equal lengths and return
/// [`BeliefError::ShapeMismatch`] otherwise; nothing is truncated or padded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BeliefVector(SmallVec<[f64; INLINE_DIMS]>);

impl BeliefVector {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// A vector of `len` copies of `value`.
    pub fn filled(value: f64, len: usize) -> Self {
        Self(SmallVec::from_elem(value, len))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.0.iter().map(|&v| f(v)).collect()
    }

    /// Combine two vectors element-wise.
    pub fn zip_map(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Result<Self, BeliefError> {
        self.check_shape(other)?;
        Ok(self
            .0
            .iter()
            .zip(other.0.iter())
            .map(|(&a, &b)| f(a, b))
            .collect())
    }

    pub fn add(&self, other: &Self) -> Result<Self, BeliefError> {
        self.zip_map(other, |a, b| a + b)
    }

    pub fn sub(&self, other: &Self) -> Result<Self, BeliefError> {
        self.zip_map(other, |a, b| a - b)
    }

    pub fn mul(&self, other: &Self) -> Result<Self, BeliefError> {
        self.zip_map(other, |a, b| a * b)
    }

    pub fn div(&self, other: &Self) -> Result<Self, BeliefError> {
        self.zip_map(other, |a, b| a / b)
    }

    pub fn scale(&self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Arithmetic mean of the elements, 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.sum() / self.0.len() as f64
    }

    /// Index of the first non-finite element, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.0.iter().position(|v| !v.is_finite())
    }

    pub fn check_shape(&self, other: &Self) -> Result<(), BeliefError> {
        if self.len() != other.len() {
            return Err(BeliefError::shape(self.len(), other.len()));
        }
        Ok(())
    }
}

impl Index<usize> for BeliefVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

impl AsRef<[f64]> for BeliefVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl FromIterator<f64> for BeliefVector {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Vec<f64>> for BeliefVector {
    fn from(values: Vec<f64>) -> Self {
        Self(SmallVec::from_vec(values))
    }
}

impl From<&[f64]> for BeliefVector {
    fn from(values: &[f64]) -> Self {
        Self(SmallVec::from_slice(values))
    }
}

impl<const N: usize> From<[f64; N]> for BeliefVector {
    fn from(values: [f64; N]) -> Self {
        values.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a BeliefVector {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
