//! Job runner DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the single input parameter carried by a replication job
pub const BATCH_HANDLE_PARAM: &str = "BATCH_HANDLE";

/// Request to start job instances of a project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJob {
    pub parameters: HashMap<String, String>,
}

/// Jobs started by a [`StartJob`] request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartedJobs {
    #[serde(default)]
    pub jobs: Vec<JobDescription>,
}

/// Job state as reported by the runner
///
/// `phase` and `status` are left as the runner's own names; the client
/// decodes them according to the runner variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDescription {
    pub id: String,
    pub phase: String,
    pub status: String,
    #[serde(default)]
    pub exit_code: Option<i32>,
}
