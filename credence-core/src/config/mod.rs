//! Configuration system for Credence.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod credence_config;
pub mod execution_config;
pub mod propagation_config;

pub use credence_config::{ConfigOverrides, CredenceConfig};
pub use execution_config::ExecutionConfig;
pub use propagation_config::PropagationConfig;
