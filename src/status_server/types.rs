//! Status server data structures.

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

use crate::poller::PollerSnapshot;

/// Shared state for the status server
#[derive(Clone)]
pub struct StatusState {
    /// Poller state, followed read-only
    pub updates: watch::Receiver<PollerSnapshot>,
    pub start_time: Arc<Instant>,
}

impl StatusState {
    pub fn new(updates: watch::Receiver<PollerSnapshot>) -> Self {
        Self {
            updates,
            start_time: Arc::new(Instant::now()),
        }
    }
}

/// JSON response for `/status` endpoint
#[derive(Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub job: PollerSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<u64>,
    pub percentage_complete: f64,
    pub elapsed_seconds: f64,
}

impl StatusResponse {
    pub fn from_snapshot(job: PollerSnapshot, elapsed_seconds: f64) -> Self {
        let progress = job.progress;
        let percentage_complete = if progress.total > 0 {
            (progress.completed.min(progress.total) as f64 / progress.total as f64) * 100.0
        } else {
            0.0
        };
        let pending = (progress.total > 0).then(|| progress.total.saturating_sub(progress.completed));
        Self {
            job,
            pending,
            percentage_complete,
            elapsed_seconds,
        }
    }
}
