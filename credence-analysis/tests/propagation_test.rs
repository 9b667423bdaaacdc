//! Monte Carlo propagation tests: T2-PRP-01 through T2-PRP-09.

use credence_analysis::propagation::UncertaintyPropagator;
use credence_core::config::PropagationConfig;
use credence_core::traits::{Cancellable, CancellationToken};
use credence_core::{BeliefState, Metadata, PropagationError};

fn identity(x: &[f64]) -> Result<Vec<f64>, String> {
    Ok(x.to_vec())
}

fn square(x: &[f64]) -> Result<Vec<f64>, String> {
    Ok(x.iter().map(|v| v * v).collect())
}

// T2-PRP-01: Identity at 10,000 samples recovers mean and variance within 5%.
#[test]
fn t2_prp_01_identity_recovers_moments() {
    let belief = BeliefState::new([2.0, -3.0], [0.5, 0.2], true, Metadata::new()).unwrap();
    let out = UncertaintyPropagator::new(10_000)
        .with_seed(42)
        .propagate(&belief, identity)
        .unwrap();

    for d in 0..2 {
        let mean_err = (out.mean()[d] - belief.mean()[d]).abs() / belief.mean()[d].abs();
        let var_err = (out.variance()[d] - belief.variance()[d]).abs() / belief.variance()[d];
        assert!(mean_err < 0.05, "dim {d}: mean relative error {mean_err}");
        assert!(var_err < 0.05, "dim {d}: variance relative error {var_err}");
    }
}

// T2-PRP-02: Squaring shifts the mean up by the variance: E[X²] = Var(X) + E[X]².
#[test]
fn t2_prp_02_square_positive_skew() {
    let belief = BeliefState::scalar(0.7, 0.05, true).unwrap();
    let out = UncertaintyPropagator::new(2000)
        .with_seed(7)
        .propagate(&belief, square)
        .unwrap();
    assert!(out.mean()[0] > 0.49, "mean {} should exceed 0.49", out.mean()[0]);
    assert!((out.mean()[0] - 0.54).abs() < 0.03, "mean {} far from 0.54", out.mean()[0]);
}

// T2-PRP-03: Sampling error shrinks as sample count grows.
#[test]
fn t2_prp_03_error_shrinks_with_samples() {
    let belief = BeliefState::scalar(1.0, 1.0, false).unwrap();
    let avg_error = |samples: usize| {
        (0..10u64)
            .map(|seed| {
                let out = UncertaintyPropagator::new(samples)
                    .with_seed(seed)
                    .propagate(&belief, identity)
                    .unwrap();
                (out.variance()[0] - 1.0).abs()
            })
            .sum::<f64>()
            / 10.0
    };
    assert!(avg_error(20_000) < avg_error(50));
}

// T2-PRP-04: Epistemic flag and metadata carry over.
#[test]
fn t2_prp_04_preserves_tag_and_metadata() {
    let belief = BeliefState::scalar(0.3, 0.1, false)
        .unwrap()
        .with_metadata("sensor", "imu-2");
    let out = UncertaintyPropagator::new(100)
        .with_seed(1)
        .propagate(&belief, identity)
        .unwrap();
    assert!(!out.is_epistemic());
    assert_eq!(out.metadata(), belief.metadata());
}

// T2-PRP-05: A failing sample aborts the whole propagation, in parallel too.
#[test]
fn t2_prp_05_failure_aborts_parallel() {
    let belief = BeliefState::scalar(0.0, 1.0, true).unwrap();
    let err = UncertaintyPropagator::new(1000)
        .with_workers(4)
        .with_seed(5)
        .propagate(&belief, |x: &[f64]| {
            if x[0] > 1.5 {
                Err(format!("out of domain: {}", x[0]))
            } else {
                Ok(x.to_vec())
            }
        })
        .unwrap_err();
    match err {
        PropagationError::TransformFailed { index, message } => {
            assert!(index < 1000);
            assert!(message.starts_with("out of domain"));
        }
        other => panic!("expected TransformFailed, got {other:?}"),
    }
}

// T2-PRP-06: Batch propagation equals one-by-one propagation under a seed.
#[test]
fn t2_prp_06_batch_matches_individual() {
    let beliefs = vec![
        BeliefState::scalar(0.1, 0.01, true).unwrap(),
        BeliefState::scalar(0.5, 0.02, true).unwrap(),
        BeliefState::scalar(0.9, 0.03, false).unwrap(),
    ];
    let propagator = UncertaintyPropagator::new(300).with_seed(100);
    let batch = propagator.propagate_batch(&beliefs, square).unwrap();
    assert_eq!(batch.len(), 3);

    for (i, belief) in beliefs.iter().enumerate() {
        let single = UncertaintyPropagator::new(300)
            .with_seed(100 + i as u64)
            .propagate(belief, square)
            .unwrap();
        assert_eq!(batch[i], single, "belief {i} differs");
    }
}

// T2-PRP-07: Batch propagation surfaces any member's failure.
#[test]
fn t2_prp_07_batch_failure() {
    let beliefs = vec![
        BeliefState::scalar(0.1, 0.01, true).unwrap(),
        BeliefState::scalar(-50.0, 0.01, true).unwrap(),
    ];
    let result = UncertaintyPropagator::new(50).propagate_batch(&beliefs, |x: &[f64]| {
        if x[0] < 0.0 {
            Err("negative input")
        } else {
            Ok(vec![x[0].sqrt()])
        }
    });
    assert!(matches!(result, Err(PropagationError::TransformFailed { .. })));
}

// T2-PRP-08: Config-built propagator honours samples, workers, and seed.
#[test]
fn t2_prp_08_from_config() {
    let config = PropagationConfig {
        samples: Some(400),
        parallel: Some(false),
        workers: Some(2),
        seed: Some(11),
        parallel_threshold: None,
    };
    let a = UncertaintyPropagator::from_config(&config);
    assert_eq!(a.samples(), 400);
    assert_eq!(a.workers(), 2);
    assert!(!a.is_parallel());

    let belief = BeliefState::scalar(1.0, 0.3, true).unwrap();
    let first = a.propagate(&belief, identity).unwrap();
    let second = UncertaintyPropagator::from_config(&config)
        .propagate(&belief, identity)
        .unwrap();
    assert_eq!(first, second);
}

// T2-PRP-09: Cancellation is honoured before any work starts.
#[test]
fn t2_prp_09_cancel_before_start() {
    let token = CancellationToken::new();
    let belief = BeliefState::scalar(1.0, 0.3, true).unwrap();
    let propagator = UncertaintyPropagator::new(100).with_seed(3);

    assert!(propagator.propagate_with_cancel(&belief, identity, &token).is_ok());
    token.cancel();
    assert_eq!(
        propagator.propagate_with_cancel(&belief, identity, &token),
        Err(PropagationError::Cancelled)
    );
}
