//! Job domain types
//!
//! A job is one instance of the replication runner started by an external
//! job runner. Ferry only reads its state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::phase::{DecodeError, Phase};

/// Status reported by the job runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    InProgress,
    Succeeded,
    Failed,
    Fault,
    TimedOut,
    Stopped,
}

impl JobStatus {
    /// Whether the job is still running
    pub fn is_running(self) -> bool {
        self == JobStatus::InProgress
    }

    /// Anything other than running or succeeded is an abnormal termination
    pub fn is_abnormal(self) -> bool {
        !matches!(self, JobStatus::InProgress | JobStatus::Succeeded)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Succeeded => "SUCCEEDED",
            JobStatus::Failed => "FAILED",
            JobStatus::Fault => "FAULT",
            JobStatus::TimedOut => "TIMED_OUT",
            JobStatus::Stopped => "STOPPED",
        }
    }
}

impl FromStr for JobStatus {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PROGRESS" => Ok(JobStatus::InProgress),
            "SUCCEEDED" => Ok(JobStatus::Succeeded),
            "FAILED" => Ok(JobStatus::Failed),
            "FAULT" => Ok(JobStatus::Fault),
            "TIMED_OUT" => Ok(JobStatus::TimedOut),
            "STOPPED" => Ok(JobStatus::Stopped),
            other => Err(DecodeError::UnknownStatus(other.to_string())),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of a dispatched job
///
/// Doubles as the job handle: the `id` is all that is needed to fetch a
/// fresh snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: String,
    pub phase: Phase,
    pub status: JobStatus,
    /// Exit code of the job's primary container, when the runner reports one
    pub exit_code: Option<i32>,
}

impl JobSnapshot {
    /// Whether the payload itself finished cleanly
    ///
    /// Runners that do not report exit codes only have the status to go on.
    pub fn succeeded(&self) -> bool {
        self.status == JobStatus::Succeeded && self.exit_code.is_none_or(|code| code == 0)
    }
}
