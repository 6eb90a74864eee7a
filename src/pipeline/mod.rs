//! Two-stage fetch → process pipeline
//!
//! ```text
//! jobs ─▶ feeder ─▶ work queue ─▶ fetch pool (N) ─▶ results queue ─▶ process pool (M)
//!                                      │                 ▲
//!                                      └──▶ sentinel ────┘ (closes once all N exit)
//! ```
//!
//! The results queue is bounded by `buffer_size`; a full queue stalls the
//! fetch workers, which caps how many payloads sit in memory at once.
//! Every job ends up in exactly one of the `transferred` / `failed`
//! counters and nothing is retried.
//!
//! ```rust,ignore
//! use fetchpipe::config::PipelineConfig;
//! use fetchpipe::pipeline::{self, FileResult, Job, ProcessError};
//! use fetchpipe::transfer::MemoryTransfer;
//! use std::sync::Arc;
//!
//! let transfer: MemoryTransfer = [("/remote/a.bin", vec![1u8; 16])].into_iter().collect();
//! let jobs = vec![Job::new("id_0", "/remote/a.bin")];
//! let processor = |r: FileResult| async move { Ok::<(), ProcessError>(()) };
//!
//! let summary = pipeline::run(&PipelineConfig::default(), Arc::new(transfer), jobs, Arc::new(processor)).await?;
//! assert_eq!(summary.transferred, 1);
//! ```

mod feeder;
mod fetch;
mod job;
mod process;
mod sentinel;

pub use fetch::FetchError;
pub use job::{FileResult, Job};
pub use process::{ProcessError, Processor};

use crate::config::{PipelineConfig, ValidationError};
use crate::humanize::ByteSize;
use crate::observability::OutcomeCounters;
use crate::transfer::Transfer;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid pipeline configuration: {0}")]
    InvalidConfig(#[from] ValidationError),

    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Final counts of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSummary {
    pub transferred: u64,
    pub failed: u64,
    pub bytes_fetched: u64,
    pub elapsed: Duration,
}

impl TransferSummary {
    pub fn total(&self) -> u64 {
        self.transferred + self.failed
    }
}

impl fmt::Display for TransferSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer completed in {:?}. Success: {}, Failed: {} ({} fetched)",
            self.elapsed,
            self.transferred,
            self.failed,
            ByteSize(self.bytes_fetched)
        )
    }
}

/// Fetch every job through `transfer` and hand each payload to `processor`.
///
/// Resolves only after every job has been counted and every worker task
/// has exited. Per-job failures never surface as errors here; they are
/// logged and show up in [`TransferSummary::failed`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] before spawning anything if
/// either pool would have zero workers.
pub async fn run<T, P>(
    config: &PipelineConfig,
    transfer: Arc<T>,
    jobs: Vec<Job>,
    processor: Arc<P>,
) -> Result<TransferSummary, PipelineError>
where
    T: Transfer + ?Sized + 'static,
    P: Processor + ?Sized + 'static,
{
    config.validate()?;

    let run_id = Uuid::now_v7();
    let span = info_span!("transfer", %run_id, jobs = jobs.len());

    let summary = execute(config, transfer, jobs, processor)
        .instrument(span.clone())
        .await;

    span.in_scope(|| {
        info!(
            transferred = summary.transferred,
            failed = summary.failed,
            bytes = summary.bytes_fetched,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "{}",
            summary
        );
    });

    Ok(summary)
}

/// Blocking variant of [`run`] for callers outside a tokio runtime.
///
/// Must not be called from within an async context.
pub fn run_blocking<T, P>(
    config: &PipelineConfig,
    transfer: Arc<T>,
    jobs: Vec<Job>,
    processor: Arc<P>,
) -> Result<TransferSummary, PipelineError>
where
    T: Transfer + ?Sized + 'static,
    P: Processor + ?Sized + 'static,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config, transfer, jobs, processor))
}

async fn execute<T, P>(
    config: &PipelineConfig,
    transfer: Arc<T>,
    jobs: Vec<Job>,
    processor: Arc<P>,
) -> TransferSummary
where
    T: Transfer + ?Sized + 'static,
    P: Processor + ?Sized + 'static,
{
    let start = Instant::now();
    let counters = Arc::new(OutcomeCounters::new());

    // async-channel has no zero-capacity mode; one slot is the closest hand-off
    let (results_tx, results_rx) = async_channel::bounded(config.results_capacity());

    let (jobs_rx, feeder) = feeder::spawn(jobs);

    let fetch_workers = fetch::spawn(
        config.fetch_concurrency,
        jobs_rx,
        results_tx.clone(),
        transfer,
        Arc::clone(&counters),
    );

    // The sentinel owns the last orchestrator-side sender
    let sentinel = sentinel::spawn(fetch_workers, results_tx);

    let process_workers = process::spawn(
        config.process_concurrency,
        results_rx,
        processor,
        Arc::clone(&counters),
    );

    for (worker_id, handle) in process_workers.into_iter().enumerate() {
        if let Err(e) = handle.await {
            error!(worker_id, error = %e, "Process worker terminated abnormally");
        }
    }

    for (name, handle) in [("sentinel", sentinel), ("feeder", feeder)] {
        if let Err(e) = handle.await {
            error!(task = name, error = %e, "Pipeline task terminated abnormally");
        }
    }

    let snapshot = counters.snapshot();

    TransferSummary {
        transferred: snapshot.transferred,
        failed: snapshot.failed,
        bytes_fetched: snapshot.bytes_fetched,
        elapsed: start.elapsed(),
    }
}

pub(crate) fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
