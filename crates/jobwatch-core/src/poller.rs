//! Job status polling.
//!
//! The poller is a small state machine: while `Polling` it waits one interval,
//! queries the job status and either re-arms or stops. Waiting and querying
//! are injected through [`Scheduler`] and [`StatusSource`] so the loop can be
//! driven by a real timer and HTTP client, or by fakes in tests.

use crate::{JobwatchError, Result};
use jobwatch_types::{JobRef, JobResponse};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between status queries.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// What to do when a status query fails or returns no status value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryFailurePolicy {
    /// Stop polling. The loop stalls, as the web panel does.
    #[default]
    Stop,
    /// Re-arm with the same interval.
    Retry,
}

/// Phase of the polling state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    Polling,
    /// The job reported a terminal status value.
    Terminal,
    /// Polling gave up after a failed query.
    Stalled,
}

/// Decision taken after one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Rearm,
    Terminal,
    Stalled,
}

/// State kept for one polling run.
#[derive(Debug, Clone)]
pub struct PollState {
    pub job: JobRef,
    pub last_status_value: Option<u32>,
    pub phase: PollPhase,
    /// Number of times the query was scheduled again after a response.
    pub rearms: u32,
    /// Consecutive failed queries.
    pub failures: u32,
}

impl PollState {
    pub fn new(job: JobRef) -> Self {
        Self {
            job,
            last_status_value: None,
            phase: PollPhase::Polling,
            rearms: 0,
            failures: 0,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.phase == PollPhase::Polling
    }

    /// Record a status response. Fails without touching the state when the
    /// response has no status value.
    pub fn record(&mut self, response: &JobResponse) -> Result<PollOutcome> {
        let value = response.status_value.ok_or(JobwatchError::MissingStatusValue)?;
        self.last_status_value = Some(value);
        self.failures = 0;

        if response.is_terminal() {
            self.phase = PollPhase::Terminal;
            Ok(PollOutcome::Terminal)
        } else {
            self.rearms += 1;
            Ok(PollOutcome::Rearm)
        }
    }

    /// Record a failed query and apply the failure policy.
    pub fn record_failure(
        &mut self,
        policy: QueryFailurePolicy,
        max_failures: Option<u32>,
    ) -> PollOutcome {
        self.failures += 1;
        let give_up = match policy {
            QueryFailurePolicy::Stop => true,
            QueryFailurePolicy::Retry => max_failures.is_some_and(|max| self.failures >= max),
        };

        if give_up {
            self.phase = PollPhase::Stalled;
            PollOutcome::Stalled
        } else {
            self.rearms += 1;
            PollOutcome::Rearm
        }
    }
}

/// Something that can report the status of a job.
pub trait StatusSource {
    fn check_status(&self, job: &JobRef) -> impl Future<Output = Result<JobResponse>>;
}

/// Something that can wait.
pub trait Scheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Scheduler backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
        tokio::time::sleep(duration)
    }
}

/// Polls a job until it reaches a terminal status.
#[derive(Debug, Clone)]
pub struct StatusPoller {
    interval: Duration,
    failure_policy: QueryFailurePolicy,
    max_failures: Option<u32>,
}

impl Default for StatusPoller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl StatusPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            failure_policy: QueryFailurePolicy::default(),
            max_failures: None,
        }
    }

    /// Set the failure policy. `max_failures` bounds consecutive failures
    /// under [`QueryFailurePolicy::Retry`].
    pub fn with_failure_policy(
        mut self,
        policy: QueryFailurePolicy,
        max_failures: Option<u32>,
    ) -> Self {
        self.failure_policy = policy;
        self.max_failures = max_failures;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run the polling loop until the job is terminal or polling stalls.
    ///
    /// `on_status` receives every successful response, including the one
    /// that ends the loop.
    pub async fn run<S, T, F>(
        &self,
        job: JobRef,
        source: &S,
        scheduler: &T,
        mut on_status: F,
    ) -> PollState
    where
        S: StatusSource,
        T: Scheduler,
        F: FnMut(&JobResponse),
    {
        let mut state = PollState::new(job);

        loop {
            scheduler.delay(self.interval).await;
            debug!(target: "jobwatch::poll", "Checking status of job {}", job);

            let outcome = match source.check_status(&job).await {
                Ok(response) => {
                    on_status(&response);
                    match state.record(&response) {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            warn!(target: "jobwatch::poll", "Job {}: {}", job, e);
                            state.record_failure(self.failure_policy, self.max_failures)
                        }
                    }
                }
                Err(e) => {
                    warn!(target: "jobwatch::poll", "Job {}: {}", job, e);
                    state.record_failure(self.failure_policy, self.max_failures)
                }
            };

            match outcome {
                PollOutcome::Rearm => continue,
                PollOutcome::Terminal => {
                    info!(
                        target: "jobwatch::poll",
                        "Job {} reached terminal status {:?}",
                        job,
                        state.last_status_value
                    );
                    return state;
                }
                PollOutcome::Stalled => {
                    warn!(
                        target: "jobwatch::poll",
                        "Stopped polling job {} after {} failed queries",
                        job,
                        state.failures
                    );
                    return state;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;
    use uuid::Uuid;

    struct ScriptedSource {
        responses: RefCell<VecDeque<Result<JobResponse>>>,
        calls: Cell<u32>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<JobResponse>>) -> Self {
            Self {
                responses: RefCell::new(responses.into()),
                calls: Cell::new(0),
            }
        }

        fn values(values: &[u32]) -> Self {
            Self::new(values.iter().map(|v| Ok(status(*v))).collect())
        }
    }

    impl StatusSource for ScriptedSource {
        async fn check_status(&self, _job: &JobRef) -> Result<JobResponse> {
            self.calls.set(self.calls.get() + 1);
            self.responses
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(JobwatchError::StatusQuery("script exhausted".into())))
        }
    }

    #[derive(Default)]
    struct CountingScheduler {
        delays: RefCell<Vec<Duration>>,
    }

    impl Scheduler for CountingScheduler {
        fn delay(&self, duration: Duration) -> impl Future<Output = ()> {
            self.delays.borrow_mut().push(duration);
            std::future::ready(())
        }
    }

    fn status(value: u32) -> JobResponse {
        JobResponse {
            status: Some(format!("status {}", value)),
            status_value: Some(value),
            ..Default::default()
        }
    }

    fn job() -> JobRef {
        JobRef::new(3, Uuid::nil())
    }

    #[tokio::test]
    async fn test_rearms_until_terminal() {
        let source = ScriptedSource::values(&[10, 55, 100]);
        let scheduler = CountingScheduler::default();
        let mut seen = Vec::new();

        let state = StatusPoller::default()
            .run(job(), &source, &scheduler, |r| seen.push(r.status_value))
            .await;

        assert_eq!(state.phase, PollPhase::Terminal);
        assert_eq!(state.rearms, 2);
        assert_eq!(state.last_status_value, Some(100));
        assert_eq!(source.calls.get(), 3);
        assert_eq!(seen, vec![Some(10), Some(55), Some(100)]);
        // One initial wait plus two re-arms, never a fourth.
        assert_eq!(scheduler.delays.borrow().len(), 3);
        assert!(scheduler.delays.borrow().iter().all(|d| *d == DEFAULT_POLL_INTERVAL));
    }

    #[tokio::test]
    async fn test_waits_before_first_query() {
        let source = ScriptedSource::values(&[100]);
        let scheduler = CountingScheduler::default();
        let poller = StatusPoller::new(Duration::from_millis(5));

        let state = poller.run(job(), &source, &scheduler, |_| {}).await;

        assert_eq!(state.rearms, 0);
        assert_eq!(*scheduler.delays.borrow(), vec![Duration::from_millis(5)]);
    }

    #[tokio::test]
    async fn test_failed_job_status_is_terminal() {
        let source = ScriptedSource::values(&[50, 999]);
        let scheduler = CountingScheduler::default();
        let state = StatusPoller::default().run(job(), &source, &scheduler, |_| {}).await;
        assert_eq!(state.phase, PollPhase::Terminal);
        assert_eq!(state.last_status_value, Some(999));
    }

    #[tokio::test]
    async fn test_stop_policy_stalls_on_failure() {
        let source = ScriptedSource::new(vec![
            Ok(status(20)),
            Err(JobwatchError::StatusQuery("connection refused".into())),
            Ok(status(100)),
        ]);
        let scheduler = CountingScheduler::default();

        let state = StatusPoller::default().run(job(), &source, &scheduler, |_| {}).await;

        assert_eq!(state.phase, PollPhase::Stalled);
        assert_eq!(state.last_status_value, Some(20));
        assert_eq!(source.calls.get(), 2);
    }

    #[tokio::test]
    async fn test_retry_policy_survives_failures() {
        let source = ScriptedSource::new(vec![
            Err(JobwatchError::StatusQuery("timeout".into())),
            Ok(JobResponse::default()),
            Ok(status(100)),
        ]);
        let scheduler = CountingScheduler::default();
        let poller = StatusPoller::default().with_failure_policy(QueryFailurePolicy::Retry, None);

        let state = poller.run(job(), &source, &scheduler, |_| {}).await;

        assert_eq!(state.phase, PollPhase::Terminal);
        assert_eq!(state.failures, 0);
        assert_eq!(source.calls.get(), 3);
    }

    #[tokio::test]
    async fn test_retry_policy_honours_max_failures() {
        let source = ScriptedSource::new(vec![]);
        let scheduler = CountingScheduler::default();
        let poller =
            StatusPoller::default().with_failure_policy(QueryFailurePolicy::Retry, Some(3));

        let state = poller.run(job(), &source, &scheduler, |_| {}).await;

        assert_eq!(state.phase, PollPhase::Stalled);
        assert_eq!(state.failures, 3);
        assert_eq!(source.calls.get(), 3);
    }

    #[test]
    fn test_missing_status_value_leaves_state_untouched() {
        let mut state = PollState::new(job());
        assert!(state.record(&JobResponse::default()).is_err());
        assert!(state.is_polling());
        assert_eq!(state.rearms, 0);
        assert!(state.last_status_value.is_none());
    }
}
