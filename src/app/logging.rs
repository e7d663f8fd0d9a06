//! Progress logging utilities.

use log::info;
use std::time::Instant;

use crate::poller::{PollerPhase, PollerSnapshot};

/// Logs progress of the job described by `snapshot`.
///
/// Only in-flight jobs are logged; terminal states are reported by the run
/// itself.
///
/// # Arguments
///
/// * `start_time` - When the job was submitted
/// * `snapshot` - Latest poller state
pub fn log_progress(start_time: Instant, snapshot: &PollerSnapshot) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    match snapshot.phase {
        PollerPhase::Submitting => info!("Waiting for the service to accept the batch"),
        PollerPhase::Polling => {
            let job = snapshot
                .job_id
                .as_ref()
                .map(|id| id.as_str())
                .unwrap_or("-");
            info!(
                "Job {}: {}/{} site(s) analyzed after {:.1} seconds",
                job, snapshot.progress.completed, snapshot.progress.total, elapsed_secs
            );
        }
        PollerPhase::Idle | PollerPhase::Completed | PollerPhase::Failed => {}
    }
}
