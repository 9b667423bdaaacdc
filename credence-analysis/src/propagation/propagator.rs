//! The Monte Carlo uncertainty propagator.

use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;

use credence_core::config::propagation_config::{default_workers, MIN_SAMPLES};
use credence_core::config::PropagationConfig;
use credence_core::traits::Cancellable;
use credence_core::{BeliefState, BeliefVector, PropagationError};

use super::sampler::{draw_samples, make_rng};
use super::stats::column_moments;

/// Default sample count.
pub const DEFAULT_SAMPLES: usize = 1000;

/// Sample count above which the worker pool is used by default.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 20;

/// Propagates a [`BeliefState`] through an arbitrary transform by sampling.
///
/// Stateless with respect to beliefs. With `parallel` set and more than
/// `parallel_threshold` samples, transform evaluations fan out to a private
/// rayon pool of `workers` threads; every call joins on all samples before
/// computing statistics.
pub struct UncertaintyPropagator {
    samples: usize,
    parallel: bool,
    workers: usize,
    parallel_threshold: usize,
    seed: Option<u64>,
    pool: OnceLock<Option<Arc<ThreadPool>>>,
}

impl UncertaintyPropagator {
    /// Create a propagator drawing `samples` samples (at least 10), parallel
    /// by default.
    pub fn new(samples: usize) -> Self {
        Self {
            samples: samples.max(MIN_SAMPLES),
            parallel: true,
            workers: default_workers(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            seed: None,
            pool: OnceLock::new(),
        }
    }

    pub fn from_config(config: &PropagationConfig) -> Self {
        let mut propagator = Self::new(config.effective_samples())
            .with_parallel(config.effective_parallel())
            .with_workers(config.effective_workers())
            .with_parallel_threshold(config.effective_parallel_threshold());
        propagator.seed = config.seed;
        propagator
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the worker count (at least 1).
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self.pool = OnceLock::new();
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Set a deterministic seed for reproducible results.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Distribution of `f(X)` for `X ~ belief`.
    ///
    /// The result keeps the input's epistemic flag and metadata. If `f` fails
    /// for any sample, or returns a non-finite value, the whole propagation
    /// fails with `TransformFailed`; no partial statistics are returned.
    pub fn propagate<F, O, E>(&self, belief: &BeliefState, f: F) -> Result<BeliefState, PropagationError>
    where
        F: Fn(&[f64]) -> Result<O, E> + Sync,
        O: Into<BeliefVector>,
        E: fmt::Display,
    {
        self.run(belief, &f, self.seed, None::<&NeverCancelled>)
    }

    /// Like [`propagate`](Self::propagate), checking `token` before starting
    /// and before each sample evaluation.
    pub fn propagate_with_cancel<F, O, E, C>(
        &self,
        belief: &BeliefState,
        f: F,
        token: &C,
    ) -> Result<BeliefState, PropagationError>
    where
        F: Fn(&[f64]) -> Result<O, E> + Sync,
        O: Into<BeliefVector>,
        E: fmt::Display,
        C: Cancellable + Sync,
    {
        self.run(belief, &f, self.seed, Some(token))
    }

    /// Propagate each belief independently with the same transform.
    ///
    /// Beliefs are processed concurrently on the worker pool when parallel
    /// evaluation is enabled. With a seed, belief `i` samples from
    /// `seed + i`, so output does not depend on scheduling.
    pub fn propagate_batch<F, O, E>(
        &self,
        beliefs: &[BeliefState],
        f: F,
    ) -> Result<Vec<BeliefState>, PropagationError>
    where
        F: Fn(&[f64]) -> Result<O, E> + Sync,
        O: Into<BeliefVector>,
        E: fmt::Display,
    {
        let seed_for = |i: usize| self.seed.map(|s| s.wrapping_add(i as u64));
        let run_one = |(i, belief): (usize, &BeliefState)| {
            self.run(belief, &f, seed_for(i), None::<&NeverCancelled>)
        };

        match self.pool_if(self.parallel && beliefs.len() > 1) {
            Some(pool) => pool.install(|| {
                beliefs
                    .par_iter()
                    .enumerate()
                    .map(run_one)
                    .collect::<Result<Vec<_>, _>>()
            }),
            None => beliefs.iter().enumerate().map(run_one).collect(),
        }
    }

    fn run<F, O, E, C>(
        &self,
        belief: &BeliefState,
        f: &F,
        seed: Option<u64>,
        token: Option<&C>,
    ) -> Result<BeliefState, PropagationError>
    where
        F: Fn(&[f64]) -> Result<O, E> + Sync,
        O: Into<BeliefVector>,
        E: fmt::Display,
        C: Cancellable + Sync,
    {
        let cancelled = || token.is_some_and(Cancellable::is_cancelled);
        if cancelled() {
            return Err(PropagationError::Cancelled);
        }

        let start = Instant::now();
        let dims = belief.dimension();
        let mut rng = make_rng(seed);
        let draws = draw_samples(belief, self.samples, &mut rng)?;

        let evaluate = |(index, x): (usize, &[f64])| -> Result<BeliefVector, PropagationError> {
            if cancelled() {
                return Err(PropagationError::Cancelled);
            }
            let out: BeliefVector = f(x)
                .map_err(|e| PropagationError::TransformFailed {
                    index,
                    message: e.to_string(),
                })?
                .into();
            if let Some(bad) = out.first_non_finite() {
                return Err(PropagationError::TransformFailed {
                    index,
                    message: format!("non-finite output at dimension {bad}"),
                });
            }
            Ok(out)
        };

        let pool = self.pool_if(self.parallel && self.samples > self.parallel_threshold);
        let parallel = pool.is_some();
        let outputs: Vec<BeliefVector> = match pool {
            Some(pool) => pool.install(|| {
                draws
                    .par_chunks(dims)
                    .enumerate()
                    .map(evaluate)
                    .collect::<Result<Vec<_>, _>>()
            })?,
            None => draws
                .chunks(dims)
                .enumerate()
                .map(evaluate)
                .collect::<Result<Vec<_>, _>>()?,
        };

        check_output_shapes(&outputs)?;
        let (mean, variance) = column_moments(&outputs);

        tracing::debug!(
            propagation_samples = self.samples,
            propagation_parallel = parallel,
            propagation_time = start.elapsed().as_secs_f64() * 1000.0,
            input_dims = dims,
            output_dims = mean.len(),
            "propagated belief"
        );

        Ok(BeliefState::new(
            mean,
            variance,
            belief.is_epistemic(),
            belief.metadata().clone(),
        )?)
    }

    /// The worker pool, built on first use. `None` when `wanted` is false or
    /// the pool could not be built, in which case evaluation is sequential.
    fn pool_if(&self, wanted: bool) -> Option<&ThreadPool> {
        if !wanted {
            return None;
        }
        self.pool
            .get_or_init(|| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(self.workers)
                    .thread_name(|i| format!("credence-mc-{i}"))
                    .build()
                    .map(Arc::new)
                    .map_err(|e| {
                        tracing::warn!(
                            workers = self.workers,
                            error = %e,
                            "failed to build propagation pool, evaluating sequentially"
                        );
                    })
                    .ok()
            })
            .as_deref()
    }
}

impl Default for UncertaintyPropagator {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLES)
    }
}

impl Clone for UncertaintyPropagator {
    fn clone(&self) -> Self {
        let pool = match self.pool.get() {
            Some(existing) => OnceLock::from(existing.clone()),
            None => OnceLock::new(),
        };
        Self {
            samples: self.samples,
            parallel: self.parallel,
            workers: self.workers,
            parallel_threshold: self.parallel_threshold,
            seed: self.seed,
            pool,
        }
    }
}

impl fmt::Debug for UncertaintyPropagator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UncertaintyPropagator")
            .field("samples", &self.samples)
            .field("parallel", &self.parallel)
            .field("workers", &self.workers)
            .field("parallel_threshold", &self.parallel_threshold)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Every transform output must have the same dimension as the first.
fn check_output_shapes(outputs: &[BeliefVector]) -> Result<(), PropagationError> {
    let expected = outputs.first().map_or(0, BeliefVector::len);
    match outputs.iter().position(|o| o.len() != expected) {
        Some(index) => Err(PropagationError::OutputShapeMismatch {
            index,
            expected,
            actual: outputs[index].len(),
        }),
        None => Ok(()),
    }
}

/// Token type for the uncancellable entry points.
struct NeverCancelled;

impl Cancellable for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn cancel(&self) {}
}
