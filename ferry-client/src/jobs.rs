//! Job runner client
//!
//! Starts replication jobs and fetches their current state. Two runner
//! variants exist, a build runner and a container-task runner; they share
//! the HTTP protocol and differ only in the names they use for phases.

use async_trait::async_trait;
use ferry_core::domain::job::{JobSnapshot, JobStatus};
use ferry_core::domain::phase::{DecodeError, Phase};
use ferry_core::dto::job::{JobDescription, StartJob, StartedJobs};
use reqwest::Client;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{handle_response, normalize_base_url};

/// Which kind of job runner is on the other end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerKind {
    /// Managed build runner reporting build phases
    Build,
    /// Managed container-task runner reporting task lifecycle statuses
    Task,
}

impl RunnerKind {
    /// Decodes a runner-reported job description into a snapshot
    pub fn decode(self, desc: JobDescription) -> std::result::Result<JobSnapshot, DecodeError> {
        let phase = match self {
            RunnerKind::Build => desc.phase.parse::<Phase>()?,
            RunnerKind::Task => Phase::from_task_status(&desc.phase)?,
        };
        let status = desc.status.parse::<JobStatus>()?;

        Ok(JobSnapshot {
            id: desc.id,
            phase,
            status,
            exit_code: desc.exit_code,
        })
    }
}

impl FromStr for RunnerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "build" => Ok(RunnerKind::Build),
            "task" => Ok(RunnerKind::Task),
            other => Err(format!("unknown job runner kind: {}", other)),
        }
    }
}

impl fmt::Display for RunnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunnerKind::Build => f.write_str("build"),
            RunnerKind::Task => f.write_str("task"),
        }
    }
}

/// Operations Ferry needs from an external job runner
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Starts job instances of `project` with the given input parameters
    ///
    /// # Returns
    /// Snapshots of every instance the runner started
    async fn start(
        &self,
        project: &str,
        parameters: HashMap<String, String>,
    ) -> Result<Vec<JobSnapshot>>;

    /// Fetches the current state of a job
    ///
    /// # Returns
    /// `None` if the runner does not know the job
    async fn describe(&self, job_id: &str) -> Result<Option<JobSnapshot>>;
}

/// HTTP implementation of [`JobRunner`]
#[derive(Debug, Clone)]
pub struct HttpJobRunner {
    base_url: String,
    client: Client,
    kind: RunnerKind,
}

impl HttpJobRunner {
    /// Create a new job runner client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the runner API (e.g., "http://localhost:9000")
    /// * `kind` - Runner variant, which decides how phases are decoded
    pub fn new(base_url: impl Into<String>, kind: RunnerKind) -> Self {
        Self::with_client(base_url, kind, Client::new())
    }

    /// Create a new job runner client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, kind: RunnerKind, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            client,
            kind,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn kind(&self) -> RunnerKind {
        self.kind
    }
}

#[async_trait]
impl JobRunner for HttpJobRunner {
    async fn start(
        &self,
        project: &str,
        parameters: HashMap<String, String>,
    ) -> Result<Vec<JobSnapshot>> {
        let url = format!("{}/projects/{}/jobs", self.base_url, project);
        debug!("Starting job for project {} via {}", project, url);

        let response = self
            .client
            .post(&url)
            .json(&StartJob { parameters })
            .send()
            .await?;

        let started: StartedJobs = handle_response(response).await?;

        started
            .jobs
            .into_iter()
            .map(|desc| self.kind.decode(desc).map_err(ClientError::from))
            .collect()
    }

    async fn describe(&self, job_id: &str) -> Result<Option<JobSnapshot>> {
        let url = format!("{}/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        match handle_response::<JobDescription>(response).await {
            Ok(desc) => Ok(Some(self.kind.decode(desc)?)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(phase: &str, status: &str, exit_code: Option<i32>) -> JobDescription {
        JobDescription {
            id: "job-1".to_string(),
            phase: phase.to_string(),
            status: status.to_string(),
            exit_code,
        }
    }

    #[test]
    fn test_build_runner_decodes_build_phases() {
        let snapshot = RunnerKind::Build
            .decode(desc("PRE_BUILD", "IN_PROGRESS", None))
            .unwrap();
        assert_eq!(snapshot.phase, Phase::PreBuild);
        assert_eq!(snapshot.status, JobStatus::InProgress);
    }

    #[test]
    fn test_task_runner_decodes_task_statuses() {
        let snapshot = RunnerKind::Task
            .decode(desc("STOPPED", "SUCCEEDED", Some(1)))
            .unwrap();
        assert_eq!(snapshot.phase, Phase::Completed);
        assert_eq!(snapshot.exit_code, Some(1));
        assert!(!snapshot.succeeded());
    }

    #[test]
    fn test_unknown_names_fail_to_decode() {
        assert!(RunnerKind::Build.decode(desc("RUNNING", "IN_PROGRESS", None)).is_err());
        assert!(RunnerKind::Task.decode(desc("RUNNING", "WAITING", None)).is_err());
    }

    #[test]
    fn test_runner_kind_parse() {
        assert_eq!("build".parse::<RunnerKind>().unwrap(), RunnerKind::Build);
        assert_eq!("TASK".parse::<RunnerKind>().unwrap(), RunnerKind::Task);
        assert!("lambda".parse::<RunnerKind>().is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let runner = HttpJobRunner::new("http://localhost:9000/", RunnerKind::Build);
        assert_eq!(runner.base_url(), "http://localhost:9000");
        assert_eq!(runner.kind(), RunnerKind::Build);
    }
}
