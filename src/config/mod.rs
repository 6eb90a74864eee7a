//! Configuration management for fetchpipe
//!
//! Settings are layered, lowest to highest priority:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Variables from a `.env` file
//! 4. Environment variables
//!
//! # Usage
//!
//! ```no_run
//! use fetchpipe::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Fetch workers: {}", config.pipeline.fetch_concurrency);
//! ```
//!
//! # Environment Variables
//!
//! Any key can be overridden with `FETCHPIPE__<section>__<key>`:
//! - `FETCHPIPE__PIPELINE__FETCH_CONCURRENCY=200`
//! - `FETCHPIPE__PIPELINE__BUFFER_SIZE=50`
//! - `FETCHPIPE__SINK__ROOT=/srv/output`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/fetchpipe.toml`.
//! This can be overridden using the `FETCHPIPE_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use models::{Config, PipelineConfig, SinkConfig, SinkProvider, SourceConfig};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = Self::load_unvalidated(Some(path))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load every layer but skip validation.
    ///
    /// For callers that adjust the result (command-line flags) and then
    /// call [`Config::validate`] themselves.
    pub fn load_unvalidated(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Ok(sources::load(path)?)
    }

    /// Re-run validation, e.g. after applying command-line overrides
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate(self)
    }
}

impl PipelineConfig {
    /// Reject pool sizes the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_pipeline(self)
    }

    /// Slots in the results queue actually allocated for `buffer_size`
    pub fn results_capacity(&self) -> usize {
        self.buffer_size.max(1)
    }
}
