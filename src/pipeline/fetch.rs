//! Fetch pool - pulls jobs off the work queue and reads each remote file

use super::job::{FileResult, Job};
use super::panic_message;
use crate::observability::OutcomeCounters;
use crate::transfer::{Transfer, TransferError};
use async_channel::{Receiver, Sender};
use bytes::Bytes;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, warn};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Open failed: {0}")]
    Open(#[from] TransferError),

    #[error("Read failed for {remote_path}: {source}")]
    Read {
        remote_path: String,
        source: std::io::Error,
    },

    #[error("Transfer panicked: {0}")]
    Panicked(String),
}

pub(crate) fn spawn<T>(
    workers: usize,
    jobs: Receiver<Job>,
    results: Sender<FileResult>,
    transfer: Arc<T>,
    counters: Arc<OutcomeCounters>,
) -> Vec<JoinHandle<()>>
where
    T: Transfer + ?Sized + 'static,
{
    (0..workers)
        .map(|worker_id| {
            let jobs = jobs.clone();
            let results = results.clone();
            let transfer = Arc::clone(&transfer);
            let counters = Arc::clone(&counters);

            tokio::spawn(
                worker_loop(worker_id, jobs, results, transfer, counters).in_current_span(),
            )
        })
        .collect()
}

async fn worker_loop<T>(
    worker_id: usize,
    jobs: Receiver<Job>,
    results: Sender<FileResult>,
    transfer: Arc<T>,
    counters: Arc<OutcomeCounters>,
) where
    T: Transfer + ?Sized,
{
    let mut fetched = 0usize;

    while let Ok(job) = jobs.recv().await {
        let outcome = AssertUnwindSafe(fetch_one(&*transfer, &job))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(FetchError::Panicked(panic_message(panic))));

        let data = match outcome {
            Ok(data) => data,
            Err(e) => {
                counters.record_failed();
                warn!(worker_id, job_id = %job.id, remote_path = %job.remote_path, error = %e, "Fetch failed");
                continue;
            }
        };

        counters.record_bytes(data.len() as u64);
        fetched += 1;

        // Blocks while the results queue is full
        let result = FileResult { id: job.id, data };
        if let Err(e) = results.send(result).await {
            counters.record_failed();
            warn!(worker_id, job_id = %e.0.id, "Results queue closed, dropping fetched file");
        }
    }

    debug!(worker_id, fetched, "Fetch worker finished");
}

/// Open, drain, and release one remote file
async fn fetch_one<T>(transfer: &T, job: &Job) -> Result<Bytes, FetchError>
where
    T: Transfer + ?Sized,
{
    let mut stream = transfer.open(&job.remote_path).await?;

    let mut buf = Vec::new();
    let read = stream.read_to_end(&mut buf).await;
    drop(stream);

    read.map_err(|source| FetchError::Read {
        remote_path: job.remote_path.clone(),
        source,
    })?;

    Ok(Bytes::from(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::{MemoryTransfer, TransferStream};
    use async_trait::async_trait;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{AsyncRead, ReadBuf};

    struct BrokenReader;

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )))
        }
    }

    struct BrokenTransfer;

    #[async_trait]
    impl Transfer for BrokenTransfer {
        async fn open(&self, _locator: &str) -> crate::transfer::Result<TransferStream> {
            Ok(Box::pin(BrokenReader))
        }
    }

    struct PanickingTransfer;

    #[async_trait]
    impl Transfer for PanickingTransfer {
        async fn open(&self, locator: &str) -> crate::transfer::Result<TransferStream> {
            if !locator.is_empty() {
                panic!("session dropped while opening {}", locator);
            }
            Err(TransferError::InvalidLocator(locator.to_string()))
        }
    }

    async fn run_workers<T: Transfer + 'static>(
        workers: usize,
        jobs: Vec<Job>,
        results: Sender<FileResult>,
        transfer: T,
    ) -> Arc<OutcomeCounters> {
        let counters = Arc::new(OutcomeCounters::new());

        let (job_tx, job_rx) = async_channel::bounded(jobs.len().max(1));
        for job in jobs {
            job_tx.send(job).await.unwrap();
        }
        job_tx.close();

        let handles = spawn(workers, job_rx, results, Arc::new(transfer), Arc::clone(&counters));
        for handle in handles {
            handle.await.unwrap();
        }
        counters
    }

    #[tokio::test]
    async fn test_fetch_one_reads_whole_file() {
        let transfer: MemoryTransfer = [("/remote/a.bin", vec![7u8; 4096])].into_iter().collect();
        let job = Job::new("id_0", "/remote/a.bin");

        let data = fetch_one(&transfer, &job).await.unwrap();
        assert_eq!(data.len(), 4096);
    }

    #[tokio::test]
    async fn test_fetch_one_open_failure() {
        let transfer = MemoryTransfer::new();
        let job = Job::new("id_0", "/remote/missing.bin");

        let err = fetch_one(&transfer, &job).await.unwrap_err();
        assert!(matches!(err, FetchError::Open(TransferError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_fetch_one_read_failure() {
        let job = Job::new("id_0", "/remote/a.bin");

        let err = fetch_one(&BrokenTransfer, &job).await.unwrap_err();
        assert!(matches!(err, FetchError::Read { .. }));
    }

    #[tokio::test]
    async fn test_workers_count_failures_and_forward_successes() {
        let transfer: MemoryTransfer = [("/remote/ok.bin", b"ok".to_vec())].into_iter().collect();
        let counters = Arc::new(OutcomeCounters::new());

        let (job_tx, job_rx) = async_channel::bounded(4);
        let (result_tx, result_rx) = async_channel::bounded(4);
        job_tx.send(Job::new("a", "/remote/ok.bin")).await.unwrap();
        job_tx.send(Job::new("b", "/remote/missing.bin")).await.unwrap();
        job_tx.close();

        let handles = spawn(2, job_rx, result_tx, Arc::new(transfer), Arc::clone(&counters));
        for handle in handles {
            handle.await.unwrap();
        }

        let result = result_rx.recv().await.unwrap();
        assert_eq!(result.id, "a");
        assert_eq!(&result.data[..], b"ok");

        // Workers dropped their senders, nothing else is coming
        assert!(result_rx.recv().await.is_err());

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.failed, 1);
        assert_eq!(snapshot.transferred, 0);
        assert_eq!(snapshot.bytes_fetched, 2);
    }

    #[tokio::test]
    async fn test_no_process_workers_left_counts_as_failed() {
        let transfer: MemoryTransfer = (0..5)
            .map(|i| (format!("/remote/{}.bin", i), vec![1u8; 8]))
            .collect();
        let jobs: Vec<Job> = (0..5)
            .map(|i| Job::new(format!("id_{}", i), format!("/remote/{}.bin", i)))
            .collect();

        let (result_tx, result_rx) = async_channel::bounded::<FileResult>(1);
        drop(result_rx);

        let counters = run_workers(2, jobs, result_tx, transfer).await;

        let snapshot = counters.snapshot();
        assert_eq!(snapshot.failed, 5);
        assert_eq!(snapshot.transferred, 0);
        assert_eq!(snapshot.bytes_fetched, 40);
    }

    #[tokio::test]
    async fn test_panicking_transfer_counts_as_failed() {
        let (result_tx, result_rx) = async_channel::bounded::<FileResult>(4);

        let counters = run_workers(
            1,
            vec![Job::new("a", "/remote/a.bin"), Job::new("b", "/remote/b.bin")],
            result_tx,
            PanickingTransfer,
        )
        .await;

        // The worker survived the first panic and went on to the second job
        assert_eq!(counters.snapshot().failed, 2);
        assert!(result_rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_one_panic_maps_to_error() {
        let job = Job::new("a", "/remote/a.bin");

        let err = AssertUnwindSafe(fetch_one(&PanickingTransfer, &job))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(FetchError::Panicked(panic_message(panic))))
            .unwrap_err();

        match err {
            FetchError::Panicked(msg) => assert!(msg.contains("/remote/a.bin")),
            other => panic!("unexpected error: {}", other),
        }
    }
}
