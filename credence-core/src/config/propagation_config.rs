//! Uncertainty propagation configuration.

use serde::{Deserialize, Serialize};

/// Fewest Monte Carlo samples a propagator will draw.
pub const MIN_SAMPLES: usize = 10;

/// Configuration for the Monte Carlo propagator.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PropagationConfig {
    /// Monte Carlo sample count. Default: 1000. Minimum: 10.
    pub samples: Option<usize>,
    /// Evaluate samples on a worker pool. Default: true.
    pub parallel: Option<bool>,
    /// Worker count. Default: available parallelism - 1, at least 1.
    pub workers: Option<usize>,
    /// Seed for reproducible sampling. Default: entropy-seeded.
    pub seed: Option<u64>,
    /// Sample count above which the worker pool is used. Default: 20.
    pub parallel_threshold: Option<usize>,
}

impl PropagationConfig {
    /// Returns the effective sample count, defaulting to 1000 and never below 10.
    pub fn effective_samples(&self) -> usize {
        self.samples.unwrap_or(1000).max(MIN_SAMPLES)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(true)
    }

    /// Returns the effective worker count.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_workers).max(1)
    }

    pub fn effective_parallel_threshold(&self) -> usize {
        self.parallel_threshold.unwrap_or(20)
    }
}

/// Available parallelism minus one, floor 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}
