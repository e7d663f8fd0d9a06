//! Graceful shutdown handling.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Shuts down the run's background tasks.
///
/// Cancels `cancel`, awaits the progress logger, and stops the status server
/// if one was started. The server is aborted rather than awaited because it
/// only ever returns on error.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<JoinHandle<()>>,
    status_server: Option<JoinHandle<()>>,
) {
    // Signal logging task to stop and await it
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }

    if let Some(server) = status_server {
        server.abort();
        let _ = server.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_stops_background_tasks() {
        let cancel = CancellationToken::new();
        let child = cancel.child_token();
        let logging_task = tokio::spawn(async move { child.cancelled().await });
        let server = tokio::spawn(async { tokio::time::sleep(Duration::from_secs(3600)).await });

        tokio::time::timeout(
            Duration::from_secs(5),
            shutdown_gracefully(cancel.clone(), Some(logging_task), Some(server)),
        )
        .await
        .expect("shutdown should not hang");
        assert!(cancel.is_cancelled());
    }
}
