//! Gaussian sample generation for a belief.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

use credence_core::{BeliefError, BeliefState};

/// Build the sampling RNG: seeded when reproducibility is requested,
/// entropy-seeded otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw `samples` vectors from `belief`, laid out row-major in one buffer of
/// `samples * belief.dimension()` values.
///
/// All draws happen on the calling thread so results depend only on the
/// seed, never on worker scheduling.
pub fn draw_samples(
    belief: &BeliefState,
    samples: usize,
    rng: &mut StdRng,
) -> Result<Vec<f64>, BeliefError> {
    let dists = belief
        .mean()
        .iter()
        .zip(belief.std_dev().iter())
        .enumerate()
        .map(|(index, (&mean, &std_dev))| {
            Normal::new(mean, std_dev).map_err(|_| BeliefError::NonFinite {
                field: "variance".to_string(),
                index,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut buffer = Vec::with_capacity(samples * dists.len());
    for _ in 0..samples {
        for dist in &dists {
            buffer.push(dist.sample(rng));
        }
    }
    Ok(buffer)
}
