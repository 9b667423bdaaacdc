//! Monte Carlo uncertainty propagation.
//!
//! A belief is treated as independent per-dimension Gaussians. Samples are
//! drawn, pushed through a caller-supplied transform, and summarized back into
//! a belief by empirical mean and population variance. There is one sampling
//! code path for every transform; no closed-form shortcuts.

pub mod propagator;
pub mod sampler;
pub mod stats;

pub use propagator::UncertaintyPropagator;
