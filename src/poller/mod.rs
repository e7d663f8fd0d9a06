//! Job polling state machine.
//!
//! `JobPoller` owns one batch job from submission to its terminal state:
//!
//! ```text
//! Idle → Submitting → Polling → Completed | Failed
//! ```
//!
//! Polling is a self-rescheduling loop: the next wait starts only after the
//! previous status query has resolved, so at most one query is ever
//! outstanding no matter how slow the service is. Cancellation drops the
//! in-flight query, so a response that arrives afterwards is never applied.
//!
//! State is published through a `tokio::sync::watch` channel; callers read it
//! with [`JobPoller::snapshot`] or follow it with [`JobPoller::subscribe`].

mod snapshot;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::api::AnalysisBackend;
use crate::config::DEFAULT_POLL_INTERVAL;
use crate::error_handling::{ApiError, JobError};
use crate::models::{AnalysisRequest, JobId, JobState, ResultRecord};

pub use snapshot::{PollerPhase, PollerSnapshot, Progress};

/// Drives one analysis job at a time against an `AnalysisBackend`.
pub struct JobPoller<B> {
    backend: Arc<B>,
    interval: Duration,
    timeout: Option<Duration>,
    state: watch::Sender<PollerSnapshot>,
    cancel: Mutex<CancellationToken>,
}

impl<B: AnalysisBackend> JobPoller<B> {
    /// Creates an idle poller using the default tick interval and no timeout.
    pub fn new(backend: Arc<B>) -> Self {
        let (state, _) = watch::channel(PollerSnapshot::idle());
        Self {
            backend,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: None,
            state,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Sets the delay between the end of one status query and the next.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds how long a job may stay in `Polling` (unbounded when `None`).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Current state.
    pub fn snapshot(&self) -> PollerSnapshot {
        self.state.borrow().clone()
    }

    /// Follows state changes.
    pub fn subscribe(&self) -> watch::Receiver<PollerSnapshot> {
        self.state.subscribe()
    }

    /// Stops the job in flight, if any.
    ///
    /// The poller returns to `Idle` and the pending [`JobPoller::run`] call
    /// resolves to `JobError::Cancelled`.
    pub fn cancel(&self) {
        self.cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }

    /// Returns a terminal poller to `Idle`, discarding results and errors.
    ///
    /// # Errors
    ///
    /// Returns `JobError::AlreadyActive` while a job is in flight.
    pub fn reset(&self) -> Result<(), JobError> {
        let mut reset = false;
        self.state.send_if_modified(|s| {
            if s.phase.is_active() {
                return false;
            }
            *s = PollerSnapshot::idle();
            reset = true;
            true
        });
        if reset {
            Ok(())
        } else {
            Err(JobError::AlreadyActive)
        }
    }

    /// Submits `request` and polls until the job reaches a terminal state.
    ///
    /// Returns the job's records in submission order. Submitting from a
    /// terminal state implicitly resets the poller first.
    ///
    /// # Errors
    ///
    /// - `JobError::AlreadyActive` if this poller is already running a job
    /// - `JobError::Submission` if the service rejects the batch
    /// - `JobError::Polling` / `JobError::JobFailed` / `JobError::TimedOut`
    ///   if the job is abandoned while polling
    /// - `JobError::Cancelled` if [`JobPoller::cancel`] was called
    pub async fn run(&self, request: &AnalysisRequest) -> Result<Arc<[ResultRecord]>, JobError> {
        let cancel = self.begin()?;

        info!("Submitting {} URL(s) for analysis", request.len());
        let submitted = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(self.abandon(None)),
            submitted = self.backend.submit(request) => submitted,
        };
        let job_id = match submitted {
            Ok(job_id) => job_id,
            Err(e) => return Err(self.fail(None, JobError::Submission(e))),
        };

        info!("Analysis job {} accepted", job_id);
        self.state
            .send_replace(PollerSnapshot::polling(job_id.clone()));

        let deadline = self.timeout.map(|t| Instant::now() + t);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.abandon(Some(&job_id))),
                _ = deadline_reached(deadline) => return Err(self.time_out(&job_id)),
                _ = sleep(self.interval) => {}
            }

            debug!("Querying status of job {}", job_id);
            let queried = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(self.abandon(Some(&job_id))),
                _ = deadline_reached(deadline) => return Err(self.time_out(&job_id)),
                queried = self.backend.status(&job_id) => queried,
            };

            let status = match queried {
                Ok(status) => status,
                Err(e) => return Err(self.fail(Some(&job_id), JobError::Polling(e))),
            };

            let progress = Progress {
                completed: status.completed_count(),
                total: status.total_count(),
            };

            match status.state() {
                JobState::Running => {
                    self.state.send_if_modified(|s| {
                        if s.progress == progress {
                            return false;
                        }
                        s.progress = progress;
                        true
                    });
                }
                JobState::Completed => {
                    if status.total_count() != request.len() as u64 {
                        let err = JobError::Polling(ApiError::Malformed(format!(
                            "completed job covers {} site(s) but {} were submitted",
                            status.total_count(),
                            request.len()
                        )));
                        return Err(self.fail(Some(&job_id), err));
                    }
                    let results: Arc<[ResultRecord]> =
                        status.into_results().unwrap_or_default().into();
                    info!(
                        "Analysis job {} completed with {} result(s)",
                        job_id,
                        results.len()
                    );
                    self.state.send_replace(PollerSnapshot::completed(
                        Some(job_id),
                        progress,
                        Arc::clone(&results),
                    ));
                    return Ok(results);
                }
                JobState::Failed => {
                    let err = JobError::JobFailed {
                        job_id: job_id.clone(),
                    };
                    return Err(self.fail(Some(&job_id), err));
                }
            }
        }
    }

    /// Claims the poller for a new job, returning that job's cancellation token.
    fn begin(&self) -> Result<CancellationToken, JobError> {
        let mut token = None;
        self.state.send_if_modified(|s| {
            if s.phase.is_active() {
                return false;
            }
            let fresh = CancellationToken::new();
            *self.cancel.lock().unwrap_or_else(PoisonError::into_inner) = fresh.clone();
            token = Some(fresh);
            *s = PollerSnapshot::submitting();
            true
        });
        token.ok_or(JobError::AlreadyActive)
    }

    fn fail(&self, job_id: Option<&JobId>, err: JobError) -> JobError {
        error!("Analysis job failed: {}", err);
        self.state
            .send_replace(PollerSnapshot::failed(job_id.cloned(), err.to_string()));
        err
    }

    fn time_out(&self, job_id: &JobId) -> JobError {
        let waited = self.timeout.unwrap_or_default();
        self.fail(
            Some(job_id),
            JobError::TimedOut {
                job_id: job_id.clone(),
                waited,
            },
        )
    }

    fn abandon(&self, job_id: Option<&JobId>) -> JobError {
        match job_id {
            Some(job_id) => warn!("Polling of analysis job {} cancelled", job_id),
            None => warn!("Analysis submission cancelled"),
        }
        self.state.send_replace(PollerSnapshot::idle());
        JobError::Cancelled
    }
}

/// Resolves at `deadline`, or never when there is none.
async fn deadline_reached(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ApiError;
    use crate::models::{AnalysisOptions, JobStatus};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted backend that records how many status queries overlap.
    struct ScriptedBackend {
        submit_error: Mutex<Option<ApiError>>,
        statuses: Mutex<VecDeque<Result<JobStatus, ApiError>>>,
        status_delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(statuses: Vec<Result<JobStatus, ApiError>>, status_delay: Duration) -> Self {
            Self {
                submit_error: Mutex::new(None),
                statuses: Mutex::new(statuses.into()),
                status_delay,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn failing_submit(error: ApiError) -> Self {
            let backend = Self::new(Vec::new(), Duration::ZERO);
            *backend.submit_error.lock().unwrap() = Some(error);
            backend
        }
    }

    #[async_trait]
    impl AnalysisBackend for ScriptedBackend {
        async fn submit(&self, _request: &AnalysisRequest) -> Result<JobId, ApiError> {
            match self.submit_error.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(JobId::new("job-1")),
            }
        }

        async fn status(&self, _job_id: &JobId) -> Result<JobStatus, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(current, Ordering::SeqCst);
            sleep(self.status_delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(running(0, 1)))
        }
    }

    fn running(completed: u64, total: u64) -> JobStatus {
        JobStatus::from_parts(JobState::Running, completed, total, None).unwrap()
    }

    fn completed(urls: &[&str]) -> JobStatus {
        let records = urls
            .iter()
            .map(|u| ResultRecord::new().with("url", *u))
            .collect();
        JobStatus::from_parts(
            JobState::Completed,
            urls.len() as u64,
            urls.len() as u64,
            Some(records),
        )
        .unwrap()
    }

    fn request(urls: &[&str]) -> AnalysisRequest {
        AnalysisRequest::new(urls.iter().copied(), AnalysisOptions::default()).unwrap()
    }

    fn poller(backend: ScriptedBackend) -> (Arc<ScriptedBackend>, Arc<JobPoller<ScriptedBackend>>) {
        let backend = Arc::new(backend);
        let poller = JobPoller::new(Arc::clone(&backend)).with_interval(Duration::from_millis(1));
        (backend, Arc::new(poller))
    }

    #[tokio::test]
    async fn test_completes_with_results_in_submission_order() {
        let urls = ["https://b.com", "https://a.com", "https://b.com"];
        let (backend, poller) = poller(ScriptedBackend::new(
            vec![Ok(running(0, 3)), Ok(running(2, 3)), Ok(completed(&urls))],
            Duration::ZERO,
        ));

        let results = poller.run(&request(&urls)).await.expect("job completes");
        let got: Vec<&str> = results.iter().map(ResultRecord::url).collect();
        assert_eq!(got, urls);

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.phase, PollerPhase::Completed);
        assert_eq!(snapshot.job_id, Some(JobId::new("job-1")));
        assert_eq!(snapshot.progress, Progress { completed: 3, total: 3 });
        assert_eq!(snapshot.results().map(|r| r.len()), Some(3));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_progress_is_published() {
        let urls = ["https://a.com", "https://b.com"];
        let (_backend, poller) = poller(ScriptedBackend::new(
            vec![Ok(running(1, 2)), Ok(completed(&urls))],
            Duration::from_millis(20),
        ));
        let mut updates = poller.subscribe();
        let runner = {
            let poller = Arc::clone(&poller);
            tokio::spawn(async move { poller.run(&request(&urls)).await })
        };

        let mut seen = Vec::new();
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            seen.push((snapshot.phase, snapshot.progress));
            if snapshot.phase.is_terminal() {
                break;
            }
        }
        runner.await.unwrap().expect("job completes");

        assert!(seen.contains(&(
            PollerPhase::Polling,
            Progress {
                completed: 1,
                total: 2
            }
        )));
        assert_eq!(seen.last().map(|s| s.0), Some(PollerPhase::Completed));
    }

    #[tokio::test]
    async fn test_never_more_than_one_query_outstanding() {
        let urls = ["https://a.com"];
        let mut statuses: Vec<_> = (0..6).map(|_| Ok(running(0, 1))).collect();
        statuses.push(Ok(completed(&urls)));
        // Responses take far longer than the tick interval.
        let (backend, poller) = poller(ScriptedBackend::new(statuses, Duration::from_millis(25)));

        poller.run(&request(&urls)).await.expect("job completes");

        assert_eq!(backend.calls.load(Ordering::SeqCst), 7);
        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_service_reported_failure() {
        let failed = JobStatus::from_parts(JobState::Failed, 1, 2, None).unwrap();
        let (backend, poller) = poller(ScriptedBackend::new(
            vec![Ok(running(1, 2)), Ok(failed)],
            Duration::ZERO,
        ));

        let err = poller.run(&request(&["https://a.com", "https://b.com"])).await.unwrap_err();
        assert!(matches!(err, JobError::JobFailed { .. }));
        assert!(err.is_polling_error());

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.phase, PollerPhase::Failed);
        assert_eq!(snapshot.progress, Progress::default());
        assert!(snapshot.results().is_none());
        assert!(snapshot.error.is_some());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_query_error_stops_polling_without_retry() {
        let (backend, poller) = poller(ScriptedBackend::new(
            vec![
                Ok(running(0, 1)),
                Err(ApiError::Decode("expected value at line 1".into())),
                Ok(completed(&["https://a.com"])),
            ],
            Duration::ZERO,
        ));

        let err = poller.run(&request(&["https://a.com"])).await.unwrap_err();
        assert!(matches!(err, JobError::Polling(ApiError::Decode(_))));

        sleep(Duration::from_millis(20)).await;
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(poller.snapshot().phase, PollerPhase::Failed);
    }

    #[tokio::test]
    async fn test_submission_error_keeps_no_job_id() {
        let (backend, poller) = poller(ScriptedBackend::failing_submit(ApiError::Status {
            status: 500,
            body: "Internal Server Error".into(),
        }));

        let err = poller.run(&request(&["https://a.com"])).await.unwrap_err();
        assert!(matches!(err, JobError::Submission(ApiError::Status { status: 500, .. })));

        let snapshot = poller.snapshot();
        assert_eq!(snapshot.phase, PollerPhase::Failed);
        assert_eq!(snapshot.job_id, None);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancel_discards_late_response() {
        // The first status response would complete the job, but arrives after cancellation.
        let (backend, poller) = poller(ScriptedBackend::new(
            vec![Ok(completed(&["https://a.com"]))],
            Duration::from_millis(150),
        ));
        let runner = {
            let poller = Arc::clone(&poller);
            tokio::spawn(async move { poller.run(&request(&["https://a.com"])).await })
        };

        sleep(Duration::from_millis(40)).await;
        assert_eq!(poller.snapshot().phase, PollerPhase::Polling);
        poller.cancel();

        let err = runner.await.unwrap().unwrap_err();
        assert!(matches!(err, JobError::Cancelled));

        sleep(Duration::from_millis(200)).await;
        let snapshot = poller.snapshot();
        assert_eq!(snapshot.phase, PollerPhase::Idle);
        assert!(snapshot.results().is_none());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_second_submission_while_polling_is_refused() {
        let (_backend, poller) = poller(ScriptedBackend::new(Vec::new(), Duration::from_millis(10)));
        let runner = {
            let poller = Arc::clone(&poller);
            tokio::spawn(async move { poller.run(&request(&["https://a.com"])).await })
        };
        sleep(Duration::from_millis(20)).await;

        let err = poller.run(&request(&["https://b.com"])).await.unwrap_err();
        assert!(matches!(err, JobError::AlreadyActive));
        assert!(matches!(poller.reset(), Err(JobError::AlreadyActive)));

        poller.cancel();
        assert!(matches!(runner.await.unwrap(), Err(JobError::Cancelled)));
    }

    #[tokio::test]
    async fn test_timeout_fails_the_job() {
        let backend = Arc::new(ScriptedBackend::new(Vec::new(), Duration::from_millis(5)));
        let poller = JobPoller::new(Arc::clone(&backend))
            .with_interval(Duration::from_millis(1))
            .with_timeout(Some(Duration::from_millis(60)));

        let err = poller.run(&request(&["https://a.com"])).await.unwrap_err();
        assert!(matches!(err, JobError::TimedOut { .. }));
        assert_eq!(poller.snapshot().phase, PollerPhase::Failed);
    }

    #[tokio::test]
    async fn test_reset_and_resubmit_after_completion() {
        let urls = ["https://a.com"];
        let (_backend, poller) = poller(ScriptedBackend::new(
            vec![Ok(completed(&urls)), Ok(completed(&urls))],
            Duration::ZERO,
        ));

        poller.run(&request(&urls)).await.expect("first job completes");
        poller.reset().expect("terminal poller resets");
        assert_eq!(poller.snapshot().phase, PollerPhase::Idle);

        poller.run(&request(&urls)).await.expect("second job completes");
        assert_eq!(poller.snapshot().phase, PollerPhase::Completed);
    }
}
