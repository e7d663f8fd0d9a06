//! HTTP client for the analysis service.

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{HealthResponse, MessageResponse, StatusPayload, SubmitBody, SubmitResponse};
use super::AnalysisBackend;
use crate::error_handling::{ApiError, InitializationError};
use crate::models::{AnalysisRequest, JobId, JobStatus, ResultRecord};

/// Longest error body kept in an `ApiError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// `AnalysisBackend` backed by the service's REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::ServiceUrlError` if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(base_url: &str, client: reqwest::Client) -> Result<Self, InitializationError> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| InitializationError::ServiceUrlError(format!("{base_url}: {e}")))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(InitializationError::ServiceUrlError(format!(
                "{base_url}: unsupported scheme {}",
                base.scheme()
            )));
        }
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::Malformed(format!("cannot build URL for {path}: {e}")))
    }

    /// `api/analysis/<job_id>`, with the id kept as one percent-encoded segment.
    fn status_url(&self, job_id: &JobId) -> Result<Url, ApiError> {
        let mut url = self.endpoint("api/analysis/")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Malformed(format!("cannot append job id to {}", self.base)))?
            .pop_if_empty()
            .push(job_id.as_str());
        Ok(url)
    }

    /// Historical records kept by the service, newest first.
    pub async fn history(&self, limit: u32) -> Result<Vec<ResultRecord>, ApiError> {
        let mut url = self.endpoint("api/history")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let response = self.client.get(url).send().await?;
        decode_json(response).await
    }

    /// Deletes the service's historical records, returning its confirmation message.
    pub async fn clear_history(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .delete(self.endpoint("api/history")?)
            .send()
            .await?;
        let body: MessageResponse = decode_json(response).await?;
        Ok(body.message)
    }

    /// The service's self-reported health status.
    pub async fn health(&self) -> Result<String, ApiError> {
        let response = self
            .client
            .get(self.endpoint("api/health")?)
            .send()
            .await?;
        let body: HealthResponse = decode_json(response).await?;
        Ok(body.status)
    }
}

#[async_trait]
impl AnalysisBackend for ApiClient {
    async fn submit(&self, request: &AnalysisRequest) -> Result<JobId, ApiError> {
        let url = self.endpoint("api/analyze")?;
        debug!("POST {} ({} URLs)", url, request.len());
        let response = self
            .client
            .post(url)
            .json(&SubmitBody::from(request))
            .send()
            .await?;
        let body: SubmitResponse = decode_json(response).await?;
        if body.task_id.trim().is_empty() {
            return Err(ApiError::Malformed("empty task_id".to_string()));
        }
        if let Some(message) = &body.message {
            debug!("Service: {}", message);
        }
        Ok(JobId::new(body.task_id))
    }

    async fn status(&self, job_id: &JobId) -> Result<JobStatus, ApiError> {
        let url = self.status_url(job_id)?;
        let response = self.client.get(url).send().await?;
        let payload: StatusPayload = decode_json(response).await?;
        JobStatus::try_from(payload)
    }
}

/// Checks the status code and decodes a JSON body.
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}
