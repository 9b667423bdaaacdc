//! Top-level Credence configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::propagation_config::MIN_SAMPLES;
use super::{ExecutionConfig, PropagationConfig};
use crate::errors::ConfigError;

/// Project-level config file name, looked up in the root passed to `load`.
pub const PROJECT_CONFIG_FILE: &str = "credence.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`CREDENCE_*`)
/// 3. Project config (`credence.toml` in project root)
/// 4. User config (`~/.credence/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CredenceConfig {
    pub propagation: PropagationConfig,
    pub execution: ExecutionConfig,
}

/// Caller-supplied overrides that beat every other layer.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub samples: Option<usize>,
    pub parallel: Option<bool>,
    pub workers: Option<usize>,
    pub seed: Option<u64>,
    pub parallel_threshold: Option<usize>,
    pub threshold: Option<f64>,
    pub adaptive: Option<bool>,
    pub min_threshold: Option<f64>,
    pub max_threshold: Option<f64>,
    pub history_capacity: Option<usize>,
}

impl CredenceConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Lowest priority: user config
        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        ::tracing::warn!(
                            path = %user_config_path.display(),
                            error = %e,
                            "ignoring unreadable user config"
                        );
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &CredenceConfig) -> Result<(), ConfigError> {
        let exec = &config.execution;
        for (field, value) in [
            ("execution.threshold", exec.threshold),
            ("execution.min_threshold", exec.min_threshold),
            ("execution.max_threshold", exec.max_threshold),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ConfigError::validation(field, "must be between 0.0 and 1.0"));
                }
            }
        }
        if exec.effective_min_threshold() > exec.effective_max_threshold() {
            return Err(ConfigError::validation(
                "execution.min_threshold",
                "must not exceed execution.max_threshold",
            ));
        }
        let (min, max) = (exec.effective_min_threshold(), exec.effective_max_threshold());
        if !(min..=max).contains(&exec.effective_threshold()) {
            return Err(ConfigError::validation(
                "execution.threshold",
                format!("must lie within [{min}, {max}] set by min_threshold and max_threshold"),
            ));
        }
        if exec.history_capacity == Some(0) {
            return Err(ConfigError::validation(
                "execution.history_capacity",
                "must be greater than 0",
            ));
        }

        let prop = &config.propagation;
        if let Some(samples) = prop.samples {
            if samples < MIN_SAMPLES {
                return Err(ConfigError::validation(
                    "propagation.samples",
                    format!("must be at least {MIN_SAMPLES}"),
                ));
            }
        }
        if prop.workers == Some(0) {
            return Err(ConfigError::validation(
                "propagation.workers",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns the user config path: `~/.credence/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".credence").join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut CredenceConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: CredenceConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `Some` values in `other` win.
    fn merge(base: &mut CredenceConfig, other: &CredenceConfig) {
        let (bp, op) = (&mut base.propagation, &other.propagation);
        if op.samples.is_some() {
            bp.samples = op.samples;
        }
        if op.parallel.is_some() {
            bp.parallel = op.parallel;
        }
        if op.workers.is_some() {
            bp.workers = op.workers;
        }
        if op.seed.is_some() {
            bp.seed = op.seed;
        }
        if op.parallel_threshold.is_some() {
            bp.parallel_threshold = op.parallel_threshold;
        }

        let (be, oe) = (&mut base.execution, &other.execution);
        if oe.threshold.is_some() {
            be.threshold = oe.threshold;
        }
        if oe.adaptive.is_some() {
            be.adaptive = oe.adaptive;
        }
        if oe.min_threshold.is_some() {
            be.min_threshold = oe.min_threshold;
        }
        if oe.max_threshold.is_some() {
            be.max_threshold = oe.max_threshold;
        }
        if oe.history_capacity.is_some() {
            be.history_capacity = oe.history_capacity;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `CREDENCE_PROPAGATION_SAMPLES`, `CREDENCE_EXECUTION_THRESHOLD`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(config: &mut CredenceConfig) {
        if let Some(v) = env_parse("CREDENCE_PROPAGATION_SAMPLES") {
            config.propagation.samples = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_PROPAGATION_PARALLEL") {
            config.propagation.parallel = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_PROPAGATION_WORKERS") {
            config.propagation.workers = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_PROPAGATION_SEED") {
            config.propagation.seed = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_PROPAGATION_PARALLEL_THRESHOLD") {
            config.propagation.parallel_threshold = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_EXECUTION_THRESHOLD") {
            config.execution.threshold = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_EXECUTION_ADAPTIVE") {
            config.execution.adaptive = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_EXECUTION_MIN_THRESHOLD") {
            config.execution.min_threshold = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_EXECUTION_MAX_THRESHOLD") {
            config.execution.max_threshold = Some(v);
        }
        if let Some(v) = env_parse("CREDENCE_EXECUTION_HISTORY_CAPACITY") {
            config.execution.history_capacity = Some(v);
        }
    }

    /// Apply explicit overrides (highest priority).
    pub fn apply_overrides(config: &mut CredenceConfig, overrides: &ConfigOverrides) {
        let prop = &mut config.propagation;
        if let Some(v) = overrides.samples {
            prop.samples = Some(v);
        }
        if let Some(v) = overrides.parallel {
            prop.parallel = Some(v);
        }
        if let Some(v) = overrides.workers {
            prop.workers = Some(v);
        }
        if let Some(v) = overrides.seed {
            prop.seed = Some(v);
        }
        if let Some(v) = overrides.parallel_threshold {
            prop.parallel_threshold = Some(v);
        }

        let exec = &mut config.execution;
        if let Some(v) = overrides.threshold {
            exec.threshold = Some(v);
        }
        if let Some(v) = overrides.adaptive {
            exec.adaptive = Some(v);
        }
        if let Some(v) = overrides.min_threshold {
            exec.min_threshold = Some(v);
        }
        if let Some(v) = overrides.max_threshold {
            exec.max_threshold = Some(v);
        }
        if let Some(v) = overrides.history_capacity {
            exec.history_capacity = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
