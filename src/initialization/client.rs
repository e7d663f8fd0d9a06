//! HTTP client initialization.

use std::time::Duration;

use reqwest::ClientBuilder;

use crate::api::ApiClient;
use crate::config::ServiceArgs;
use crate::error_handling::InitializationError;

/// Builds the analysis service client.
///
/// The underlying `reqwest::Client` carries the per-request timeout and
/// User-Agent from `service`; the base address must be an absolute http(s) URL.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the HTTP client cannot be
/// built, or `InitializationError::ServiceUrlError` for an unusable base address.
pub fn init_client(service: &ServiceArgs) -> Result<ApiClient, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(Duration::from_secs(service.timeout_seconds))
        .user_agent(service.user_agent.clone())
        .build()?;
    ApiClient::new(&service.api_url, client)
}
