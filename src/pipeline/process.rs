//! Process pool - hands fetched files to the caller's processing step

use super::job::FileResult;
use super::panic_message;
use crate::observability::OutcomeCounters;
use crate::storage::StorageError;
use async_channel::Receiver;
use async_trait::async_trait;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, warn};

/// Why a processing step failed.
///
/// `Storage` and `Io` are there so caller-supplied processors can use `?`
/// on object store and filesystem calls. `Panicked` is produced by the
/// pool itself.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Processor panicked: {0}")]
    Panicked(String),
}

/// Processing step applied to every fetched file.
///
/// Any `Fn(FileResult) -> impl Future<Output = Result<(), ProcessError>>`
/// closure is a processor, so callers rarely need to implement this by hand.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, result: FileResult) -> Result<(), ProcessError>;
}

#[async_trait]
impl<F, Fut> Processor for F
where
    F: Fn(FileResult) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ProcessError>> + Send + 'static,
{
    async fn process(&self, result: FileResult) -> Result<(), ProcessError> {
        (self)(result).await
    }
}

pub(crate) fn spawn<P>(
    workers: usize,
    results: Receiver<FileResult>,
    processor: Arc<P>,
    counters: Arc<OutcomeCounters>,
) -> Vec<JoinHandle<()>>
where
    P: Processor + ?Sized + 'static,
{
    (0..workers)
        .map(|worker_id| {
            let results = results.clone();
            let processor = Arc::clone(&processor);
            let counters = Arc::clone(&counters);

            tokio::spawn(worker_loop(worker_id, results, processor, counters).in_current_span())
        })
        .collect()
}

async fn worker_loop<P>(
    worker_id: usize,
    results: Receiver<FileResult>,
    processor: Arc<P>,
    counters: Arc<OutcomeCounters>,
) where
    P: Processor + ?Sized,
{
    let mut processed = 0usize;

    while let Ok(result) = results.recv().await {
        let job_id = result.id.clone();

        let outcome = AssertUnwindSafe(processor.process(result))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProcessError::Panicked(panic_message(panic))));

        match outcome {
            Ok(()) => counters.record_transferred(),
            Err(e) => {
                counters.record_failed();
                warn!(worker_id, job_id = %job_id, error = %e, "Processing failed");
            }
        }
        processed += 1;
    }

    debug!(worker_id, processed, "Process worker finished");
}
