//! Orchestration errors
//!
//! Every variant is fatal to the batch invocation: the delivery channel
//! redelivers the whole batch.

use ferry_client::ClientError;
use ferry_core::domain::job::JobStatus;
use ferry_core::domain::phase::Phase;
use ferry_store::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestrationError>;

#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// The job runner started no instance
    #[error("no job started for project {project}")]
    Dispatch { project: String },

    /// The job terminated abnormally, or finished with a non-zero exit code
    #[error("job {job_id} failed: {phase} = {status}{}", exit_code_suffix(.exit_code))]
    JobFailed {
        job_id: String,
        phase: Phase,
        status: JobStatus,
        exit_code: Option<i32>,
    },

    /// The remaining budget ran out before the job reached the phase
    #[error("not enough time to wait for job {job_id} to reach {target}")]
    DeadlineExceeded { job_id: String, target: Phase },

    #[error("job {0} not found")]
    JobNotFound(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to encode event body: {0}")]
    Encode(#[from] serde_json::Error),
}

fn exit_code_suffix(exit_code: &Option<i32>) -> String {
    exit_code
        .map(|code| format!(" (exit code {})", code))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_failed_message() {
        let err = OrchestrationError::JobFailed {
            job_id: "job-1".to_string(),
            phase: Phase::Completed,
            status: JobStatus::Succeeded,
            exit_code: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "job job-1 failed: COMPLETED = SUCCEEDED (exit code 2)"
        );

        let err = OrchestrationError::JobFailed {
            job_id: "job-1".to_string(),
            phase: Phase::Build,
            status: JobStatus::Fault,
            exit_code: None,
        };
        assert_eq!(err.to_string(), "job job-1 failed: BUILD = FAULT");
    }
}
