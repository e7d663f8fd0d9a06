//! Wire types of the analysis service.

use serde::{Deserialize, Serialize};

use crate::error_handling::ApiError;
use crate::models::{AnalysisRequest, JobState, JobStatus, ResultRecord};

/// Body of `POST /api/analyze`.
#[derive(Debug, Serialize)]
pub struct SubmitBody<'a> {
    pub urls: &'a [String],
    pub fetch_resources: bool,
    pub resource_limit: u32,
    pub check_advanced: bool,
}

impl<'a> From<&'a AnalysisRequest> for SubmitBody<'a> {
    fn from(request: &'a AnalysisRequest) -> Self {
        let options = request.options();
        Self {
            urls: request.urls(),
            fetch_resources: options.fetch_resources,
            resource_limit: options.resource_limit,
            check_advanced: options.check_advanced,
        }
    }
}

/// Response of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct SubmitResponse {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `GET /api/analysis/{task_id}`.
#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: String,
    #[serde(default)]
    pub progress: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub results: Option<Vec<ResultRecord>>,
}

impl TryFrom<StatusPayload> for JobStatus {
    type Error = ApiError;

    fn try_from(payload: StatusPayload) -> Result<Self, Self::Error> {
        let state = JobState::parse(&payload.status).ok_or_else(|| {
            ApiError::Malformed(format!("unknown job status {:?}", payload.status))
        })?;
        JobStatus::from_parts(state, payload.progress, payload.total, payload.results)
    }
}

/// Response of `DELETE /api/history`.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Response of `GET /api/health`.
#[derive(Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}
