//! JSON status handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::super::types::{StatusResponse, StatusState};

/// JSON status endpoint with the poller's current state
pub async fn status_handler(State(state): State<StatusState>) -> Response {
    let snapshot = state.updates.borrow().clone();
    let response =
        StatusResponse::from_snapshot(snapshot, state.start_time.elapsed().as_secs_f64());

    let json = match serde_json::to_string_pretty(&response) {
        Ok(json) => json,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to serialize status: {}", e),
            )
                .into_response();
        }
    };

    (StatusCode::OK, [("content-type", "application/json")], json).into_response()
}

/// Liveness probe
pub async fn health_handler() -> Response {
    (
        StatusCode::OK,
        [("content-type", "application/json")],
        r#"{"status":"ok"}"#,
    )
        .into_response()
}
