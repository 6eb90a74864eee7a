use super::job::FileResult;
use async_channel::Sender;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error};

/// Close the results queue once every fetch worker has exited.
///
/// This task is the only place the results queue is closed. Process
/// workers keep draining until they see the close, so closing earlier
/// would strand in-flight results and never closing would hang them.
pub(crate) fn spawn(
    fetch_workers: Vec<JoinHandle<()>>,
    results: Sender<FileResult>,
) -> JoinHandle<()> {
    tokio::spawn(
        async move {
            for (worker_id, handle) in fetch_workers.into_iter().enumerate() {
                if let Err(e) = handle.await {
                    error!(worker_id, error = %e, "Fetch worker terminated abnormally");
                }
            }

            results.close();
            debug!("All fetch workers finished, results queue closed");
        }
        .in_current_span(),
    )
}
