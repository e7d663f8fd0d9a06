//! HTTP status server for monitoring a running job.
//!
//! Provides three endpoints:
//! - `/status` - JSON view of the poller snapshot
//! - `/metrics` - Prometheus-compatible metrics
//! - `/health` - liveness probe
//!
//! The server only reads the poller's published state; it never drives it.

mod handlers;
mod types;

use axum::routing::get;
use axum::Router;

use handlers::{health_handler, metrics_handler, status_handler};
pub use types::StatusState;

/// Routes served by the status server.
pub fn router(state: StatusState) -> Router {
    Router::new()
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Creates and starts the status server
pub async fn start_status_server(port: u16, state: StatusState) -> Result<(), anyhow::Error> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind status server to port {}: {}", port, e))?;

    log::info!("Status server listening on http://127.0.0.1:{}/", port);
    log::info!("  - Status: http://127.0.0.1:{}/status", port);
    log::info!("  - Metrics: http://127.0.0.1:{}/metrics", port);

    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Status server error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;
    use crate::poller::{PollerSnapshot, Progress};
    use axum::body::to_bytes;
    use axum::extract::State;
    use axum::response::Response;
    use tokio::sync::watch;

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn polling_state() -> (watch::Sender<PollerSnapshot>, StatusState) {
        let mut snapshot = PollerSnapshot::polling(JobId::new("job-7"));
        snapshot.progress = Progress {
            completed: 1,
            total: 4,
        };
        let (tx, rx) = watch::channel(snapshot);
        (tx, StatusState::new(rx))
    }

    #[tokio::test]
    async fn test_status_reports_snapshot() {
        let (_tx, state) = polling_state();
        let body = body_text(handlers::status_handler(State(state)).await).await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["phase"], "polling");
        assert_eq!(value["job_id"], "job-7");
        assert_eq!(value["completed"], 1);
        assert_eq!(value["total"], 4);
        assert_eq!(value["pending"], 3);
        assert_eq!(value["percentage_complete"], 25.0);
    }

    #[tokio::test]
    async fn test_status_follows_updates() {
        let (tx, state) = polling_state();
        tx.send_replace(PollerSnapshot::failed(None, "boom".into()));
        let body = body_text(handlers::status_handler(State(state)).await).await;
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["phase"], "failed");
        assert_eq!(value["error"], "boom");
        assert!(value.get("pending").is_none());
    }

    #[tokio::test]
    async fn test_metrics_marks_active_phase() {
        let (_tx, state) = polling_state();
        let body = body_text(handlers::metrics_handler(State(state)).await).await;
        assert!(body.contains("site_analyzer_sites_total 4"));
        assert!(body.contains("site_analyzer_sites_completed 1"));
        assert!(body.contains(r#"site_analyzer_job_phase{phase="polling"} 1"#));
        assert!(body.contains(r#"site_analyzer_job_phase{phase="idle"} 0"#));
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let body = body_text(handlers::health_handler().await).await;
        assert_eq!(body, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn test_bind_failure_is_an_error() {
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();
        let (_tx, state) = polling_state();
        let err = start_status_server(port, state).await.unwrap_err();
        assert!(err.to_string().contains("Failed to bind status server"));
    }
}
