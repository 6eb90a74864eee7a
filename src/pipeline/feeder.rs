use super::job::Job;
use async_channel::Receiver;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug};

/// Push every job onto a fresh work queue, then close it.
///
/// The queue holds the full job list, so the feeder task never waits on
/// the fetch pool.
pub(crate) fn spawn(jobs: Vec<Job>) -> (Receiver<Job>, JoinHandle<()>) {
    let (tx, rx) = async_channel::bounded(jobs.len().max(1));

    let handle = tokio::spawn(
        async move {
            let total = jobs.len();
            for job in jobs {
                if tx.send(job).await.is_err() {
                    // Every fetch worker is gone
                    break;
                }
            }
            tx.close();
            debug!(total, "Work queue closed");
        }
        .in_current_span(),
    );

    (rx, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_feeds_in_order_then_closes() {
        let jobs: Vec<Job> = (0..5)
            .map(|i| Job::new(format!("id_{}", i), format!("/remote/file_{}.bin", i)))
            .collect();

        let (rx, handle) = spawn(jobs.clone());
        handle.await.unwrap();

        let mut received = Vec::new();
        while let Ok(job) = rx.recv().await {
            received.push(job);
        }

        assert_eq!(received, jobs);
        assert!(rx.is_closed());
    }

    #[tokio::test]
    async fn test_empty_job_list() {
        let (rx, handle) = spawn(Vec::new());
        handle.await.unwrap();

        assert!(rx.recv().await.is_err());
    }
}
