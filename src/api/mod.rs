//! Analysis service interface.
//!
//! `AnalysisBackend` is the seam the poller depends on; `ApiClient` implements
//! it over HTTP and adds the service's auxiliary endpoints (history, health).

mod client;
mod types;

use async_trait::async_trait;

use crate::error_handling::ApiError;
use crate::models::{AnalysisRequest, JobId, JobStatus};

pub use client::ApiClient;
pub use types::{StatusPayload, SubmitBody, SubmitResponse};

/// Submission and status queries for batch analysis jobs.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Starts a job for `request`, returning the identifier issued by the service.
    async fn submit(&self, request: &AnalysisRequest) -> Result<JobId, ApiError>;

    /// Fetches the current status of `job_id`.
    async fn status(&self, job_id: &JobId) -> Result<JobStatus, ApiError>;
}
