//! Pure combinators over belief states: weighted fusion, calibration,
//! ensembles, and error-window variance estimation.

pub mod calibrate;
pub mod combine;
pub mod ensemble;
pub mod variance;
mod weights;

pub use calibrate::calibrate_belief_state;
pub use combine::combine_belief_states;
pub use ensemble::{create_ensemble_belief, create_ensemble_from_gaussians};
pub use variance::{
    scalar_variance_from_errors, variance_from_errors, DEFAULT_ERROR_WINDOW, DEFAULT_MIN_VARIANCE,
};
