use crate::cli::RunArgs;
use fetchpipe::config::{Config, PipelineConfig};
use fetchpipe::manifest;
use fetchpipe::pipeline;
use fetchpipe::storage::{StorageClient, StorageProcessor};
use fetchpipe::transfer::ObjectStoreTransfer;
use std::sync::Arc;
use tracing::{info, warn};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub async fn run(args: RunArgs) -> Result<(), AnyError> {
    let config = resolve_config(&args)?;

    let jobs = manifest::load(&args.manifest)?;
    info!(
        manifest = %args.manifest.display(),
        jobs = jobs.len(),
        fetch_concurrency = config.pipeline.fetch_concurrency,
        process_concurrency = config.pipeline.process_concurrency,
        buffer_size = config.pipeline.buffer_size,
        "Starting transfer"
    );

    let transfer = ObjectStoreTransfer::local(&config.source.root)?;
    let storage = StorageClient::from_config(&config.sink)?;
    let processor = StorageProcessor::new(storage, config.sink.prefix.clone());

    let summary = pipeline::run(
        &config.pipeline,
        Arc::new(transfer),
        jobs,
        Arc::new(processor),
    )
    .await?;

    println!("{}", summary);

    if summary.failed > 0 {
        warn!(failed = summary.failed, "Some jobs failed, see warnings above for job ids");
        return Err(format!("{} of {} jobs failed", summary.failed, summary.total()).into());
    }

    Ok(())
}

/// Load every config layer, apply command-line flags, then validate once
fn resolve_config(args: &RunArgs) -> Result<Config, AnyError> {
    let mut config = Config::load_unvalidated(args.config.clone())?;
    apply_overrides(&mut config.pipeline, args);
    config.validate()?;
    Ok(config)
}

fn apply_overrides(pipeline: &mut PipelineConfig, args: &RunArgs) {
    if let Some(n) = args.fetch_concurrency {
        pipeline.fetch_concurrency = n;
    }
    if let Some(n) = args.process_concurrency {
        pipeline.process_concurrency = n;
    }
    if let Some(n) = args.buffer_size {
        pipeline.buffer_size = n;
    }
}
