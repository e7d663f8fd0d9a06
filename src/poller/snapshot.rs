//! Read-only view of a poller's state.

use std::sync::Arc;

use serde::Serialize;

use crate::models::{JobId, ResultRecord};

/// Where the poller is in the submit → poll → terminate lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollerPhase {
    Idle,
    Submitting,
    Polling,
    Completed,
    Failed,
}

impl PollerPhase {
    /// A job is in flight; another submission is refused.
    pub fn is_active(&self) -> bool {
        matches!(self, PollerPhase::Submitting | PollerPhase::Polling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PollerPhase::Completed | PollerPhase::Failed)
    }
}

/// Displayed job progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
}

/// Snapshot published to subscribers on every state change.
#[derive(Debug, Clone, Serialize)]
pub struct PollerSnapshot {
    pub phase: PollerPhase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<JobId>,
    #[serde(flatten)]
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    results: Option<Arc<[ResultRecord]>>,
}

impl PollerSnapshot {
    pub(crate) fn idle() -> Self {
        Self {
            phase: PollerPhase::Idle,
            job_id: None,
            progress: Progress::default(),
            result_count: None,
            error: None,
            results: None,
        }
    }

    pub(crate) fn submitting() -> Self {
        Self {
            phase: PollerPhase::Submitting,
            ..Self::idle()
        }
    }

    pub(crate) fn polling(job_id: JobId) -> Self {
        Self {
            phase: PollerPhase::Polling,
            job_id: Some(job_id),
            ..Self::idle()
        }
    }

    pub(crate) fn completed(
        job_id: Option<JobId>,
        progress: Progress,
        results: Arc<[ResultRecord]>,
    ) -> Self {
        Self {
            phase: PollerPhase::Completed,
            job_id,
            progress,
            result_count: Some(results.len()),
            error: None,
            results: Some(results),
        }
    }

    pub(crate) fn failed(job_id: Option<JobId>, error: String) -> Self {
        Self {
            phase: PollerPhase::Failed,
            job_id,
            error: Some(error),
            ..Self::idle()
        }
    }

    /// Results of a completed job, in submission order.
    pub fn results(&self) -> Option<&Arc<[ResultRecord]>> {
        self.results.as_ref()
    }
}
