//! Job identity and reported job status.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::ResultRecord;
use crate::error_handling::ApiError;

/// Opaque job identifier issued by the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state reported by the service for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    /// Parses the service's `status` field.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "running" => Some(JobState::Running),
            "completed" => Some(JobState::Completed),
            "failed" => Some(JobState::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated status report for one job.
///
/// Invariants: `completed_count <= total_count`, and `results` is present
/// exactly when the job is completed, in which case it holds `total_count`
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct JobStatus {
    state: JobState,
    completed_count: u64,
    total_count: u64,
    results: Option<Vec<ResultRecord>>,
}

impl JobStatus {
    /// Validates the parts of a status payload.
    ///
    /// Results attached to a non-completed status (the service streams partial
    /// results while running) are discarded.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Malformed` if an invariant does not hold.
    pub fn from_parts(
        state: JobState,
        completed_count: u64,
        total_count: u64,
        results: Option<Vec<ResultRecord>>,
    ) -> Result<Self, ApiError> {
        if completed_count > total_count {
            return Err(ApiError::Malformed(format!(
                "progress {} exceeds total {}",
                completed_count, total_count
            )));
        }

        let results = match state {
            JobState::Completed => {
                let results = results.ok_or_else(|| {
                    ApiError::Malformed("completed status carries no results".to_string())
                })?;
                if results.len() as u64 != total_count {
                    return Err(ApiError::Malformed(format!(
                        "completed status carries {} results for a total of {}",
                        results.len(),
                        total_count
                    )));
                }
                Some(results)
            }
            JobState::Running | JobState::Failed => None,
        };

        Ok(Self {
            state,
            completed_count,
            total_count,
            results,
        })
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn completed_count(&self) -> u64 {
        self.completed_count
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn results(&self) -> Option<&[ResultRecord]> {
        self.results.as_deref()
    }

    /// Consumes the status, yielding the results of a completed job.
    pub fn into_results(self) -> Option<Vec<ResultRecord>> {
        self.results
    }
}
