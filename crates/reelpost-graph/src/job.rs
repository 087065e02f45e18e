//! Remote publish job state machine.
//!
//! ```text
//! Created -> Submitted -> Polling{n} -> Ready -> Published
//!                 \            \
//!                  +------------+--> Error | TimedOut
//! ```
//!
//! `Published`, `Error` and `TimedOut` are terminal.

use std::time::Duration;

use reelpost_models::MediaItem;
use serde::{Deserialize, Serialize};

use crate::error::{PublishError, PublishResult};
use crate::types::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Created,
    Submitted,
    Polling { attempt: u32 },
    Ready,
    Published,
    Error,
    TimedOut,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Published | JobState::Error | JobState::TimedOut)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Created => "created",
            JobState::Submitted => "submitted",
            JobState::Polling { .. } => "polling",
            JobState::Ready => "ready",
            JobState::Published => "published",
            JobState::Error => "error",
            JobState::TimedOut => "timed_out",
        }
    }

    /// Next state after observing `status` on poll number `attempt` (1-based).
    ///
    /// Only `Submitted` and `Polling` react to statuses; every other state is
    /// returned unchanged.
    pub fn on_status(self, status: &StatusCode, attempt: u32, policy: &PollPolicy) -> JobState {
        match self {
            JobState::Submitted | JobState::Polling { .. } => {
                if policy.accepts(status) {
                    JobState::Ready
                } else if *status == StatusCode::Error {
                    JobState::Error
                } else if attempt >= policy.max_attempts {
                    JobState::TimedOut
                } else {
                    JobState::Polling { attempt }
                }
            }
            other => other,
        }
    }
}

/// Polling cadence and budget for one kind of container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Wait between consecutive polls
    pub interval: Duration,
    pub max_attempts: u32,
    /// Wait before the first poll
    pub initial_delay: Duration,
    /// Whether `READY` counts as done in addition to `FINISHED`
    pub accept_ready: bool,
}

impl PollPolicy {
    /// Reels: 5 s before every poll, 20 polls.
    pub fn reel() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 20,
            initial_delay: Duration::from_secs(5),
            accept_ready: false,
        }
    }

    /// Carousel video children: poll immediately, then every 2.5 s, 30 polls.
    pub fn carousel_child() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            max_attempts: 30,
            initial_delay: Duration::ZERO,
            accept_ready: false,
        }
    }

    /// Carousel parent: poll immediately, then every 2.5 s, 12 polls.
    pub fn carousel_parent() -> Self {
        Self {
            interval: Duration::from_millis(2500),
            max_attempts: 12,
            initial_delay: Duration::ZERO,
            accept_ready: true,
        }
    }

    /// Same budget, no waiting. Handy when the caller controls timing.
    pub fn immediate(self) -> Self {
        Self {
            interval: Duration::ZERO,
            initial_delay: Duration::ZERO,
            ..self
        }
    }

    pub fn accepts(&self, status: &StatusCode) -> bool {
        match status {
            StatusCode::Finished => true,
            StatusCode::Ready => self.accept_ready,
            _ => false,
        }
    }
}

/// One in-flight publish. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishJob {
    pub items: Vec<MediaItem>,
    pub caption: String,
    pub container_id: Option<String>,
    pub state: JobState,
    pub poll_attempt: u32,
}

impl PublishJob {
    pub fn new(items: Vec<MediaItem>, caption: impl Into<String>) -> Self {
        Self {
            items,
            caption: caption.into(),
            container_id: None,
            state: JobState::Created,
            poll_attempt: 0,
        }
    }

    /// `Created -> Submitted` once the platform assigned a container id.
    pub fn mark_submitted(&mut self, container_id: Option<String>) -> PublishResult<String> {
        self.expect_state(JobState::Created, "submitted")?;
        let id = container_id
            .ok_or_else(|| PublishError::submission("platform returned no container id"))?;
        self.state = JobState::Submitted;
        Ok(self.container_id.insert(id).clone())
    }

    /// `Submitted -> Ready` for containers that need no processing.
    pub fn mark_ready(&mut self) -> PublishResult<()> {
        self.expect_state(JobState::Submitted, "ready")?;
        self.state = JobState::Ready;
        Ok(())
    }

    /// Feed one observed status into the state machine.
    pub fn observe(&mut self, status: &StatusCode, attempt: u32, policy: &PollPolicy) -> JobState {
        self.poll_attempt = attempt;
        self.state = self.state.on_status(status, attempt, policy);
        self.state
    }

    /// `Ready -> Published`; any other source state is rejected.
    pub fn mark_published(&mut self) -> PublishResult<()> {
        self.expect_state(JobState::Ready, "published")?;
        self.state = JobState::Published;
        Ok(())
    }

    fn expect_state(&self, expected: JobState, target: &str) -> PublishResult<()> {
        if self.state != expected {
            return Err(PublishError::InvalidState(format!(
                "cannot move to {} from {}",
                target,
                self.state.as_str()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processing() -> StatusCode {
        StatusCode::InProgress
    }

    #[test]
    fn test_processing_then_finished() {
        let policy = PollPolicy::reel();
        let mut state = JobState::Submitted;
        let statuses = [processing(), processing(), StatusCode::Finished];

        for (i, status) in statuses.iter().enumerate() {
            state = state.on_status(status, i as u32 + 1, &policy);
        }
        assert_eq!(state, JobState::Ready);
    }

    #[test]
    fn test_budget_exhaustion_times_out() {
        let policy = PollPolicy::carousel_parent();
        let mut state = JobState::Submitted;
        for attempt in 1..=policy.max_attempts {
            assert!(!state.is_terminal());
            state = state.on_status(&StatusCode::Other("PENDING".into()), attempt, &policy);
        }
        assert_eq!(state, JobState::TimedOut);
    }

    #[test]
    fn test_error_is_immediate_and_terminal() {
        let policy = PollPolicy::reel();
        let state = JobState::Submitted.on_status(&StatusCode::Error, 1, &policy);
        assert_eq!(state, JobState::Error);

        // Nothing moves a terminal state
        assert_eq!(state.on_status(&StatusCode::Finished, 2, &policy), JobState::Error);
        assert_eq!(
            JobState::TimedOut.on_status(&StatusCode::Finished, 1, &policy),
            JobState::TimedOut
        );
    }

    #[test]
    fn test_ready_accepted_only_by_parent_policy() {
        let child = PollPolicy::carousel_child();
        let parent = PollPolicy::carousel_parent();

        assert_eq!(
            JobState::Submitted.on_status(&StatusCode::Ready, 1, &child),
            JobState::Polling { attempt: 1 }
        );
        assert_eq!(
            JobState::Submitted.on_status(&StatusCode::Ready, 1, &parent),
            JobState::Ready
        );
    }

    #[test]
    fn test_created_ignores_statuses() {
        let state = JobState::Created.on_status(&StatusCode::Finished, 1, &PollPolicy::reel());
        assert_eq!(state, JobState::Created);
    }

    #[test]
    fn test_policy_presets() {
        let reel = PollPolicy::reel();
        assert_eq!((reel.interval, reel.max_attempts), (Duration::from_secs(5), 20));
        assert_eq!(reel.initial_delay, Duration::from_secs(5));

        let child = PollPolicy::carousel_child();
        assert_eq!((child.interval, child.max_attempts), (Duration::from_millis(2500), 30));
        assert!(child.initial_delay.is_zero());

        let parent = PollPolicy::carousel_parent();
        assert_eq!(parent.max_attempts, 12);
        assert!(parent.accept_ready);

        let fast = PollPolicy::reel().immediate();
        assert_eq!(fast.max_attempts, 20);
        assert!(fast.interval.is_zero());
    }

    #[test]
    fn test_published_requires_ready() {
        let mut job = PublishJob::new(vec![MediaItem::video("https://x/v.mp4")], "caption");
        assert!(matches!(job.mark_published(), Err(PublishError::InvalidState(_))));

        job.mark_submitted(Some("c1".into())).unwrap();
        assert!(matches!(job.mark_published(), Err(PublishError::InvalidState(_))));

        job.observe(&StatusCode::Finished, 1, &PollPolicy::reel());
        job.mark_published().unwrap();
        assert_eq!(job.state, JobState::Published);
        assert_eq!(job.poll_attempt, 1);
    }

    #[test]
    fn test_missing_container_id() {
        let mut job = PublishJob::new(vec![MediaItem::image("https://x/p.png")], "caption");
        assert!(matches!(job.mark_submitted(None), Err(PublishError::Submission(_))));
        assert_eq!(job.state, JobState::Created);
    }
}
