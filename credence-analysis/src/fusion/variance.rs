//! Variance estimates from a sliding window of recent errors.

use statrs::statistics::Statistics;

use credence_core::{BeliefError, BeliefVector};

pub const DEFAULT_ERROR_WINDOW: usize = 10;
pub const DEFAULT_MIN_VARIANCE: f64 = 1e-6;

/// Per-dimension population variance of the last `window_size` error
/// vectors, floored at `min_variance`.
///
/// With fewer than two errors in the window every dimension is
/// `min_variance`; an empty error list yields a single dimension. A NaN or
/// infinite error inside the window is a `NonFinite` error whose index is
/// the position in `errors`.
pub fn variance_from_errors<P: AsRef<[f64]>>(
    errors: &[P],
    window_size: usize,
    min_variance: f64,
) -> Result<BeliefVector, BeliefError> {
    let dims = errors.first().map_or(1, |e| e.as_ref().len());
    if let Some(bad) = errors.iter().find(|e| e.as_ref().len() != dims) {
        return Err(BeliefError::shape(dims, bad.as_ref().len()));
    }

    let start = errors.len().saturating_sub(window_size);
    let window = &errors[start..];
    if let Some(offset) = window
        .iter()
        .position(|e| e.as_ref().iter().any(|v| !v.is_finite()))
    {
        return Err(non_finite(start + offset));
    }
    if window.len() < 2 {
        return Ok(BeliefVector::filled(min_variance, dims));
    }

    Ok((0..dims)
        .map(|d| {
            window
                .iter()
                .map(|e| e.as_ref()[d])
                .population_variance()
                .max(min_variance)
        })
        .collect())
}

/// Scalar form of [`variance_from_errors`].
pub fn scalar_variance_from_errors(
    errors: &[f64],
    window_size: usize,
    min_variance: f64,
) -> Result<f64, BeliefError> {
    let start = errors.len().saturating_sub(window_size);
    let window = &errors[start..];
    if let Some(offset) = window.iter().position(|v| !v.is_finite()) {
        return Err(non_finite(start + offset));
    }
    if window.len() < 2 {
        return Ok(min_variance);
    }
    Ok(window.iter().population_variance().max(min_variance))
}

fn non_finite(index: usize) -> BeliefError {
    BeliefError::NonFinite {
        field: "errors".to_string(),
        index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uses_latest_window() {
        let errors = [100.0, -100.0, 1.0, 2.0, 3.0, 4.0];
        let v = scalar_variance_from_errors(&errors, 4, DEFAULT_MIN_VARIANCE).unwrap();
        assert!((v - 1.25).abs() < 1e-12);
    }

    #[test]
    fn test_too_few_samples() {
        assert_eq!(scalar_variance_from_errors(&[0.3], 10, 1e-6), Ok(1e-6));
        assert_eq!(scalar_variance_from_errors(&[], 10, 1e-6), Ok(1e-6));
    }

    #[test]
    fn test_window_larger_than_two_errors() {
        // (0.1 - 0.2)² and (0.3 - 0.2)² averaged
        let v = scalar_variance_from_errors(&[0.1, 0.3], 10, 1e-6).unwrap();
        assert!((v - 0.01).abs() < 1e-12);
        let v = variance_from_errors(&[[0.1], [0.3]], 10, 1e-6).unwrap();
        assert!((v[0] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_floor_applies() {
        let v = scalar_variance_from_errors(&[0.5; 10], 10, 1e-4).unwrap();
        assert_eq!(v, 1e-4);
    }

    #[test]
    fn test_non_finite_errors_rejected() {
        let err = scalar_variance_from_errors(&[0.1, f64::NAN, 0.3, f64::INFINITY], 10, 1e-6)
            .unwrap_err();
        assert_eq!(
            err,
            BeliefError::NonFinite {
                field: "errors".to_string(),
                index: 1
            }
        );
        assert!(matches!(
            scalar_variance_from_errors(&[f64::NEG_INFINITY], 10, 1e-6),
            Err(BeliefError::NonFinite { index: 0, .. })
        ));
        assert!(matches!(
            variance_from_errors(&[[0.1], [f64::NAN]], 10, 1e-6),
            Err(BeliefError::NonFinite { index: 1, .. })
        ));
    }

    #[test]
    fn test_non_finite_outside_window_ignored() {
        let errors = [f64::NAN, 1.0, 3.0];
        let v = scalar_variance_from_errors(&errors, 2, 1e-6).unwrap();
        assert!((v - 1.0).abs() < 1e-12);
        let err = scalar_variance_from_errors(&[1.0, f64::INFINITY, 3.0], 2, 1e-6).unwrap_err();
        assert!(matches!(err, BeliefError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn test_vector_errors() {
        let errors = [[1.0, 0.0], [3.0, 0.0], [5.0, 0.0]];
        let v = variance_from_errors(&errors, DEFAULT_ERROR_WINDOW, DEFAULT_MIN_VARIANCE).unwrap();
        assert!((v[0] - 8.0 / 3.0).abs() < 1e-12);
        assert_eq!(v[1], DEFAULT_MIN_VARIANCE);
    }

    #[test]
    fn test_ragged_errors_rejected() {
        let errors = [vec![1.0, 0.0], vec![3.0]];
        assert!(variance_from_errors(&errors, 10, 1e-6).is_err());
    }

    #[test]
    fn test_empty_vector_errors() {
        let errors: [Vec<f64>; 0] = [];
        let v = variance_from_errors(&errors, 10, 1e-6).unwrap();
        assert_eq!(v.to_vec(), vec![1e-6]);
    }
}
