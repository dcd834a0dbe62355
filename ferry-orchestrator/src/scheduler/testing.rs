//! Scripted job runner for scheduler tests

use async_trait::async_trait;
use ferry_client::{JobRunner, Result};
use ferry_core::domain::job::{JobSnapshot, JobStatus};
use ferry_core::domain::phase::Phase;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub fn snapshot(phase: Phase, status: JobStatus) -> JobSnapshot {
    JobSnapshot {
        id: "job-1".to_string(),
        phase,
        status,
        exit_code: None,
    }
}

/// Replays a fixed sequence of snapshots; the last one repeats forever
pub struct ScriptedRunner {
    started: Vec<JobSnapshot>,
    script: Mutex<VecDeque<JobSnapshot>>,
    describes: Mutex<usize>,
    starts: Mutex<Vec<(String, HashMap<String, String>)>>,
}

impl ScriptedRunner {
    pub fn new(script: Vec<JobSnapshot>) -> Arc<Self> {
        Self::starting(
            vec![snapshot(Phase::Submitted, JobStatus::InProgress)],
            script,
        )
    }

    /// Runner whose `start` reports the given instances
    pub fn starting(started: Vec<JobSnapshot>, script: Vec<JobSnapshot>) -> Arc<Self> {
        Arc::new(Self {
            started,
            script: Mutex::new(script.into()),
            describes: Mutex::new(0),
            starts: Mutex::new(Vec::new()),
        })
    }

    pub fn describe_calls(&self) -> usize {
        *self.describes.lock().unwrap()
    }

    pub fn starts(&self) -> Vec<(String, HashMap<String, String>)> {
        self.starts.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobRunner for ScriptedRunner {
    async fn start(
        &self,
        project: &str,
        parameters: HashMap<String, String>,
    ) -> Result<Vec<JobSnapshot>> {
        self.starts
            .lock()
            .unwrap()
            .push((project.to_string(), parameters));
        Ok(self.started.clone())
    }

    async fn describe(&self, _job_id: &str) -> Result<Option<JobSnapshot>> {
        *self.describes.lock().unwrap() += 1;

        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            Ok(script.pop_front())
        } else {
            Ok(script.front().cloned())
        }
    }
}
