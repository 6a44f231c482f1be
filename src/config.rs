//! Scheduler configuration.
//!
//! Loaded from TOML so the batch-size floor and solver budget can change
//! without a rebuild:
//!
//! ```toml
//! min_batch_size = 10
//! time_limit_secs = 60.0
//! num_search_workers = 8
//! random_seed = 42
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Lower bound on the target batch size, whatever the lab capacity.
    pub min_batch_size: usize,

    /// Wall-clock budget handed to the solver.
    pub time_limit_secs: f64,

    pub num_search_workers: i32,

    pub random_seed: Option<i32>,

    /// Feasibility is all that is asked for, so the first solution ends the search.
    pub stop_after_first_solution: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_batch_size: 10,
            time_limit_secs: 60.0,
            num_search_workers: 8,
            random_seed: None,
            stop_after_first_solution: true,
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "time_limit_secs must be positive, got {}",
                self.time_limit_secs
            )));
        }
        if self.min_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "min_batch_size must be at least 1".to_string(),
            ));
        }
        if self.num_search_workers < 1 {
            return Err(ConfigError::Invalid(format!(
                "num_search_workers must be at least 1, got {}",
                self.num_search_workers
            )));
        }
        Ok(())
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = limit.as_secs_f64();
        self
    }

    pub fn with_min_batch_size(mut self, floor: usize) -> Self {
        self.min_batch_size = floor;
        self
    }

    pub fn with_random_seed(mut self, seed: i32) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// The solver budget. Zero when `time_limit_secs` is negative or not
    /// finite, which [`validate`](Self::validate) rejects.
    pub fn time_limit(&self) -> Duration {
        Duration::try_from_secs_f64(self.time_limit_secs).unwrap_or(Duration::ZERO)
    }
}
