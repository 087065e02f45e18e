//! Bounded polling of remote container status.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PublishError, PublishResult};
use crate::job::{JobState, PollPolicy, PublishJob};
use crate::target::PublishTarget;
use crate::types::StatusCode;

/// How a successful poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOutcome {
    pub state: JobState,
    /// Polls issued, including the one that saw the final status
    pub attempts: u32,
    pub last_status: StatusCode,
}

/// Drives a submitted job to `Ready`, `Error` or `TimedOut`.
///
/// Timeouts are counted in attempts, not wall-clock time. Statuses are
/// never retried: `ERROR` ends the loop at once.
#[derive(Clone)]
pub struct RemoteJobPoller {
    target: Arc<dyn PublishTarget>,
}

impl RemoteJobPoller {
    pub fn new(target: Arc<dyn PublishTarget>) -> Self {
        Self { target }
    }

    /// Poll a bare container id.
    pub async fn poll(&self, container_id: &str, policy: &PollPolicy) -> PublishResult<PollOutcome> {
        let mut job = PublishJob::new(Vec::new(), "");
        job.mark_submitted(Some(container_id.to_string()))?;
        self.poll_job(&mut job, policy).await
    }

    /// Poll `job`, recording each transition on it.
    pub async fn poll_job(&self, job: &mut PublishJob, policy: &PollPolicy) -> PublishResult<PollOutcome> {
        let container_id = match (&job.container_id, job.state) {
            (Some(id), JobState::Submitted) => id.clone(),
            _ => {
                return Err(PublishError::InvalidState(format!(
                    "cannot poll a job in state {}",
                    job.state.as_str()
                )))
            }
        };

        if !policy.initial_delay.is_zero() {
            tokio::time::sleep(policy.initial_delay).await;
        }

        for attempt in 1..=policy.max_attempts {
            // Sleep between polls only; never after the last one.
            if attempt > 1 && !policy.interval.is_zero() {
                tokio::time::sleep(policy.interval).await;
            }

            let status = self.target.get_status(&container_id).await?;
            let state = job.observe(&status, attempt, policy);
            metrics::counter!("reelpost_poll_attempts_total").increment(1);
            debug!(
                container_id = %container_id,
                attempt,
                max_attempts = policy.max_attempts,
                status = %status,
                "Polled container"
            );

            match state {
                JobState::Ready => {
                    info!(container_id = %container_id, attempts = attempt, "Container ready");
                    return Ok(PollOutcome {
                        state,
                        attempts: attempt,
                        last_status: status,
                    });
                }
                JobState::Error => {
                    warn!(container_id = %container_id, attempt, "Container processing failed");
                    return Err(PublishError::RemoteProcessing {
                        container_id,
                        status: status.to_string(),
                    });
                }
                JobState::TimedOut => {
                    warn!(container_id = %container_id, attempts = attempt, "Container polling timed out");
                    return Err(PublishError::PollTimeout {
                        container_id,
                        attempts: attempt,
                    });
                }
                _ => {}
            }
        }

        // Only reachable with a zero attempt budget.
        job.state = JobState::TimedOut;
        Err(PublishError::PollTimeout {
            container_id,
            attempts: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::testing::ScriptedTarget;

    fn poller(target: &Arc<ScriptedTarget>) -> RemoteJobPoller {
        RemoteJobPoller::new(target.clone())
    }

    #[tokio::test]
    async fn test_ready_after_three_polls() {
        let target = Arc::new(ScriptedTarget::default());
        target.script("c9", [StatusCode::InProgress, StatusCode::InProgress, StatusCode::Finished]);

        let outcome = poller(&target)
            .poll("c9", &PollPolicy::reel().immediate())
            .await
            .unwrap();

        assert_eq!(outcome.state, JobState::Ready);
        assert_eq!(outcome.attempts, 3);
        assert_eq!(target.status_calls(), vec!["c9"; 3]);
    }

    #[tokio::test]
    async fn test_error_stops_immediately() {
        let target = Arc::new(ScriptedTarget::default());
        target.script("c9", [StatusCode::Error, StatusCode::Finished]);

        let err = poller(&target)
            .poll("c9", &PollPolicy::reel().immediate())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::RemoteProcessing { .. }));
        assert_eq!(target.status_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_budget_exhausted() {
        let target = Arc::new(ScriptedTarget::default());
        let mut job = PublishJob::new(Vec::new(), "");
        job.mark_submitted(Some("c9".into())).unwrap();

        let err = poller(&target)
            .poll_job(&mut job, &PollPolicy::carousel_child().immediate())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::PollTimeout { attempts: 30, .. }));
        assert_eq!(job.state, JobState::TimedOut);
        assert_eq!(job.poll_attempt, 30);
        assert_eq!(target.status_calls().len(), 30);
    }

    #[tokio::test]
    async fn test_zero_budget_times_out_without_polling() {
        let target = Arc::new(ScriptedTarget::default());
        let policy = PollPolicy {
            max_attempts: 0,
            ..PollPolicy::reel().immediate()
        };

        let err = poller(&target).poll("c9", &policy).await.unwrap_err();
        assert!(matches!(err, PublishError::PollTimeout { attempts: 0, .. }));
        assert!(target.status_calls().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_unsubmitted_job() {
        let target = Arc::new(ScriptedTarget::default());
        let mut job = PublishJob::new(Vec::new(), "");

        let err = poller(&target)
            .poll_job(&mut job, &PollPolicy::reel())
            .await
            .unwrap_err();
        assert!(matches!(err, PublishError::InvalidState(_)));
    }

    #[tokio::test]
    async fn test_waits_between_polls() {
        let target = Arc::new(ScriptedTarget::default());
        target.script("c9", [StatusCode::InProgress, StatusCode::InProgress, StatusCode::Finished]);
        let policy = PollPolicy {
            interval: Duration::from_millis(20),
            initial_delay: Duration::from_millis(20),
            max_attempts: 5,
            accept_ready: false,
        };

        let started = Instant::now();
        poller(&target).poll("c9", &policy).await.unwrap();

        // One initial delay plus two gaps
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
