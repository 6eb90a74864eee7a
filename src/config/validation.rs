use super::models::{Config, PipelineConfig, SinkProvider};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{field} must be at least 1")]
    ZeroConcurrency { field: &'static str },

    #[error("Source root must not be empty")]
    EmptySourceRoot,

    #[error("Local sink requires a root directory")]
    MissingSinkRoot,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_pipeline(&config.pipeline)?;
    validate_source(config)?;
    validate_sink(config)?;
    Ok(())
}

/// Both pools need at least one worker or the run would silently do nothing
pub fn validate_pipeline(pipeline: &PipelineConfig) -> Result<(), ValidationError> {
    if pipeline.fetch_concurrency == 0 {
        return Err(ValidationError::ZeroConcurrency {
            field: "fetch_concurrency",
        });
    }

    if pipeline.process_concurrency == 0 {
        return Err(ValidationError::ZeroConcurrency {
            field: "process_concurrency",
        });
    }

    Ok(())
}

fn validate_source(config: &Config) -> Result<(), ValidationError> {
    if config.source.root.as_os_str().is_empty() {
        return Err(ValidationError::EmptySourceRoot);
    }

    Ok(())
}

fn validate_sink(config: &Config) -> Result<(), ValidationError> {
    if config.sink.provider == SinkProvider::Local && config.sink.root.as_os_str().is_empty() {
        return Err(ValidationError::MissingSinkRoot);
    }

    Ok(())
}
