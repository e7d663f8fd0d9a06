//! Error type definitions.
//!
//! This module defines the error types surfaced by the poller, the service
//! client, and the exporters.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use thiserror::Error;

use crate::models::JobId;
use crate::report::ChartId;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The configured service address is not a valid base URL.
    #[error("Invalid service URL: {0}")]
    ServiceUrlError(String),
}

/// Failure of a single call to the analysis service.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(#[from] ReqwestError),

    /// The service answered with a non-success status code.
    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("undecodable response: {0}")]
    Decode(String),

    /// The response decoded but violates the status contract.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Errors that end a job, surfaced by `JobPoller`.
///
/// `Submission` is a submission error (the job never started). `Polling` and
/// `JobFailed` are polling errors (the job was abandoned and no partial
/// results are kept). None of them are retried.
#[derive(Error, Debug)]
pub enum JobError {
    /// The request was rejected locally before any network call.
    #[error("invalid analysis request: {0}")]
    InvalidRequest(String),

    /// Submitting the batch failed.
    #[error("failed to submit analysis")]
    Submission(#[source] ApiError),

    /// A status query failed or returned a malformed payload.
    #[error("failed to query analysis status")]
    Polling(#[source] ApiError),

    /// The service reported the job as failed.
    #[error("analysis job {job_id} failed")]
    JobFailed { job_id: JobId },

    /// The configured poll timeout elapsed before a terminal status arrived.
    #[error("analysis job {job_id} did not finish within {waited:?}")]
    TimedOut { job_id: JobId, waited: Duration },

    /// A job is already being polled by this poller.
    #[error("an analysis job is already in progress")]
    AlreadyActive,

    /// The owner cancelled polling.
    #[error("analysis polling was cancelled")]
    Cancelled,
}

impl JobError {
    /// Whether the error belongs to the polling phase of a started job.
    pub fn is_polling_error(&self) -> bool {
        matches!(
            self,
            JobError::Polling(_) | JobError::JobFailed { .. } | JobError::TimedOut { .. }
        )
    }
}

/// Errors raised while producing an export artifact.
///
/// No artifact is written when any of these is returned.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Export requested for an empty record set.
    #[error("no results to export")]
    NoData,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PDF rendering error: {0}")]
    Pdf(String),
}

impl From<lopdf::Error> for ExportError {
    fn from(e: lopdf::Error) -> Self {
        ExportError::Pdf(e.to_string())
    }
}

/// A chart snapshot could not be captured.
///
/// Recovered locally: the affected report section is laid out without its chart.
#[derive(Error, Debug)]
#[error("snapshot of {chart} chart unavailable: {reason}")]
pub struct RenderingUnavailable {
    pub chart: ChartId,
    pub reason: String,
}

impl RenderingUnavailable {
    pub fn new(chart: ChartId, reason: impl Into<String>) -> Self {
        Self {
            chart,
            reason: reason.into(),
        }
    }
}
