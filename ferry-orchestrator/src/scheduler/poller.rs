//! Phase poller
//!
//! Polls a job until it reaches or passes a target phase, terminates
//! abnormally, or the invocation budget runs out.

use ferry_client::JobRunner;
use ferry_core::deadline::Deadline;
use ferry_core::domain::job::JobSnapshot;
use ferry_core::domain::phase::Phase;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{OrchestrationError, Result};

/// Poll timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Pause between two status checks
    pub interval: Duration,

    /// Budget kept in reserve: half for the final check, half for the
    /// caller's own shutdown
    pub safety_margin: Duration,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            safety_margin: Duration::from_secs(10),
        }
    }
}

/// How a poll ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollExit {
    /// The job is at the target phase and no longer running
    Reached(JobSnapshot),
    /// The job is already beyond the target phase
    Passed(JobSnapshot),
    /// The job terminated abnormally; the caller decides what that means
    Failed(JobSnapshot),
}

impl PollExit {
    /// Decides whether a snapshot ends the poll
    pub fn evaluate(snapshot: JobSnapshot, target: Phase) -> Option<PollExit> {
        if snapshot.status.is_abnormal() {
            Some(PollExit::Failed(snapshot))
        } else if snapshot.phase == target && !snapshot.status.is_running() {
            Some(PollExit::Reached(snapshot))
        } else if snapshot.phase > target {
            Some(PollExit::Passed(snapshot))
        } else {
            None
        }
    }

    pub fn into_snapshot(self) -> JobSnapshot {
        match self {
            PollExit::Reached(s) | PollExit::Passed(s) | PollExit::Failed(s) => s,
        }
    }
}

/// Deadline-bounded poller over a job runner
#[derive(Clone)]
pub struct PhasePoller {
    runner: Arc<dyn JobRunner>,
    config: PollerConfig,
}

impl PhasePoller {
    pub fn new(runner: Arc<dyn JobRunner>, config: PollerConfig) -> Self {
        Self { runner, config }
    }

    /// Waits for `job_id` to reach or pass `target`
    ///
    /// Returns as soon as a snapshot settles the poll, without sleeping.
    /// Fails with `DeadlineExceeded` once the remaining budget is within the
    /// safety margin.
    pub async fn poll_until(
        &self,
        job_id: &str,
        target: Phase,
        deadline: &Deadline,
    ) -> Result<PollExit> {
        debug!("Waiting for job {} to {}", job_id, target);

        while deadline.remaining() > self.config.safety_margin {
            let snapshot = self
                .runner
                .describe(job_id)
                .await?
                .ok_or_else(|| OrchestrationError::JobNotFound(job_id.to_string()))?;

            match PollExit::evaluate(snapshot, target) {
                Some(PollExit::Failed(s)) => {
                    error!("Job failed ({}): {} = {}", job_id, s.phase, s.status);
                    return Ok(PollExit::Failed(s));
                }
                Some(PollExit::Reached(s)) => {
                    info!("Job {} reached {}: {}", job_id, target, s.status);
                    return Ok(PollExit::Reached(s));
                }
                Some(PollExit::Passed(s)) => {
                    info!("Job {} passed {} successfully: {}", job_id, target, s.phase);
                    return Ok(PollExit::Passed(s));
                }
                None => {}
            }

            if deadline.remaining().saturating_sub(self.config.interval) <= self.config.safety_margin
            {
                break;
            }
            tokio::time::sleep(self.config.interval).await;
        }

        Err(OrchestrationError::DeadlineExceeded {
            job_id: job_id.to_string(),
            target,
        })
    }
}
