//! Job dispatcher
//!
//! Starts one replication job per batch and waits for it twice: once until
//! the job is runnable, and once until it has completed.

use ferry_client::JobRunner;
use ferry_core::deadline::Deadline;
use ferry_core::domain::batch::BatchHandle;
use ferry_core::domain::job::JobSnapshot;
use ferry_core::domain::phase::Phase;
use ferry_core::dto::job::BATCH_HANDLE_PARAM;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{OrchestrationError, Result};
use crate::scheduler::poller::{PhasePoller, PollExit, PollerConfig};

pub struct JobDispatcher {
    runner: Arc<dyn JobRunner>,
    poller: PhasePoller,
    project: String,
}

impl JobDispatcher {
    pub fn new(runner: Arc<dyn JobRunner>, project: impl Into<String>, config: PollerConfig) -> Self {
        Self {
            poller: PhasePoller::new(runner.clone(), config),
            runner,
            project: project.into(),
        }
    }

    /// Starts the replication job for `handle` and waits until it is runnable
    ///
    /// # Returns
    /// The job as last observed; its `id` is the handle for [`Self::join`]
    pub async fn dispatch(&self, handle: BatchHandle, deadline: &Deadline) -> Result<JobSnapshot> {
        let parameters = HashMap::from([(BATCH_HANDLE_PARAM.to_string(), handle.to_string())]);

        let mut started = self.runner.start(&self.project, parameters).await?;
        if started.len() > 1 {
            warn!(
                "[{}] Runner started {} jobs for {}; following the first",
                handle,
                started.len(),
                self.project
            );
        }
        if started.is_empty() {
            return Err(OrchestrationError::Dispatch {
                project: self.project.clone(),
            });
        }
        let job = started.swap_remove(0);
        info!("[{}] Started job {} for {}", handle, job.id, self.project);

        match self.poller.poll_until(&job.id, Phase::RUNNABLE, deadline).await? {
            PollExit::Failed(s) => Err(job_failed(s)),
            exit => Ok(exit.into_snapshot()),
        }
    }

    /// Waits for a dispatched job to complete
    ///
    /// Completion alone is not success: the job must also have exited with
    /// status zero when the runner reports an exit code.
    pub async fn join(&self, job_id: &str, deadline: &Deadline) -> Result<JobSnapshot> {
        let snapshot = self
            .poller
            .poll_until(job_id, Phase::TERMINAL, deadline)
            .await?
            .into_snapshot();

        if snapshot.succeeded() {
            Ok(snapshot)
        } else {
            Err(job_failed(snapshot))
        }
    }
}

fn job_failed(snapshot: JobSnapshot) -> OrchestrationError {
    OrchestrationError::JobFailed {
        job_id: snapshot.id,
        phase: snapshot.phase,
        status: snapshot.status,
        exit_code: snapshot.exit_code,
    }
}
