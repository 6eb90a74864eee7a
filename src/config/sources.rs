use super::models::Config;
use config::{ConfigError, Environment, File, Map};
use std::env;
use std::path::{Path, PathBuf};

const CONFIG_ENV_VAR: &str = "FETCHPIPE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/fetchpipe.toml";
const ENV_PREFIX: &str = "FETCHPIPE";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
///
/// An explicit `config_path` wins over `FETCHPIPE_CONFIG`.
pub fn load(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let dotenv = read_env_file(None)?;

    let config_path = config_path.unwrap_or_else(|| {
        env::var(CONFIG_ENV_VAR)
            .ok()
            .or_else(|| dotenv.get(CONFIG_ENV_VAR).cloned())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    });

    load_from_sources(config_path, dotenv)
}

/// Read `KEY=value` pairs from a .env file without touching the process
/// environment. With no path, `.env` is searched for from the working
/// directory upwards. A missing file yields no variables.
pub fn read_env_file(path: Option<&Path>) -> Result<Map<String, String>, ConfigError> {
    let iter = match path {
        Some(path) => dotenvy::from_path_iter(path),
        None => dotenvy::dotenv_iter(),
    };

    let iter = match iter {
        Ok(iter) => iter,
        Err(e) if e.not_found() => return Ok(Map::new()),
        Err(e) => return Err(ConfigError::Foreign(Box::new(e))),
    };

    iter.map(|item| item.map_err(|e| ConfigError::Foreign(Box::new(e))))
        .collect()
}

/// Load configuration from a specific path, .env variables and the environment
pub fn load_from_sources(
    config_path: PathBuf,
    dotenv: Map<String, String>,
) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // FETCHPIPE__PIPELINE__FETCH_CONCURRENCY -> pipeline.fetch_concurrency
    builder = builder
        .add_source(environment().source(Some(dotenv)))
        .add_source(environment());

    let config = builder.build()?;
    config.try_deserialize()
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
