//! Prometheus metrics handler.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::StatusState;
use crate::poller::PollerPhase;

/// Prometheus-compatible metrics endpoint
pub async fn metrics_handler(State(state): State<StatusState>) -> Response {
    let snapshot = state.updates.borrow().clone();
    let elapsed = state.start_time.elapsed().as_secs_f64();
    let phase = |p: PollerPhase| u8::from(snapshot.phase == p);

    let metrics = format!(
        r#"# HELP site_analyzer_sites_total Sites in the current job
# TYPE site_analyzer_sites_total gauge
site_analyzer_sites_total {}

# HELP site_analyzer_sites_completed Sites analyzed so far
# TYPE site_analyzer_sites_completed gauge
site_analyzer_sites_completed {}

# HELP site_analyzer_results Records returned by the completed job
# TYPE site_analyzer_results gauge
site_analyzer_results {}

# HELP site_analyzer_job_phase Current poller phase (1 for the active phase)
# TYPE site_analyzer_job_phase gauge
site_analyzer_job_phase{{phase="idle"}} {}
site_analyzer_job_phase{{phase="submitting"}} {}
site_analyzer_job_phase{{phase="polling"}} {}
site_analyzer_job_phase{{phase="completed"}} {}
site_analyzer_job_phase{{phase="failed"}} {}

# HELP site_analyzer_elapsed_seconds Seconds since the status server started
# TYPE site_analyzer_elapsed_seconds gauge
site_analyzer_elapsed_seconds {}
"#,
        snapshot.progress.total,
        snapshot.progress.completed,
        snapshot.result_count.unwrap_or(0),
        phase(PollerPhase::Idle),
        phase(PollerPhase::Submitting),
        phase(PollerPhase::Polling),
        phase(PollerPhase::Completed),
        phase(PollerPhase::Failed),
        elapsed
    );

    (StatusCode::OK, metrics).into_response()
}
