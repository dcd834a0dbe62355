//! Job phase clock
//!
//! Phases are totally ordered so a caller can ask whether a job has
//! reached or already passed a stage.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A job lifecycle stage name that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown job phase: {0}")]
    UnknownPhase(String),

    #[error("unknown job status: {0}")]
    UnknownStatus(String),
}

/// Lifecycle stage of an external job
///
/// Variant order is the execution order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Submitted,
    Queued,
    Provisioning,
    DownloadSource,
    Install,
    PreBuild,
    Build,
    PostBuild,
    UploadArtifacts,
    Finalizing,
    Completed,
}

impl Phase {
    /// Every phase in clock order
    pub const ALL: [Phase; 11] = [
        Phase::Submitted,
        Phase::Queued,
        Phase::Provisioning,
        Phase::DownloadSource,
        Phase::Install,
        Phase::PreBuild,
        Phase::Build,
        Phase::PostBuild,
        Phase::UploadArtifacts,
        Phase::Finalizing,
        Phase::Completed,
    ];

    /// Phase a job must reach before it counts as dispatched
    pub const RUNNABLE: Phase = Phase::PreBuild;

    /// Phase of a job that has finished, successfully or not
    pub const TERMINAL: Phase = Phase::Completed;

    /// Ordinal position on the clock, starting at 0
    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Canonical build-runner name for this phase
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Submitted => "SUBMITTED",
            Phase::Queued => "QUEUED",
            Phase::Provisioning => "PROVISIONING",
            Phase::DownloadSource => "DOWNLOAD_SOURCE",
            Phase::Install => "INSTALL",
            Phase::PreBuild => "PRE_BUILD",
            Phase::Build => "BUILD",
            Phase::PostBuild => "POST_BUILD",
            Phase::UploadArtifacts => "UPLOAD_ARTIFACTS",
            Phase::Finalizing => "FINALIZING",
            Phase::Completed => "COMPLETED",
        }
    }

    /// Maps a container-task lifecycle status onto the clock
    pub fn from_task_status(status: &str) -> Result<Self, DecodeError> {
        match status {
            "PROVISIONING" => Ok(Phase::Provisioning),
            "PENDING" => Ok(Phase::DownloadSource),
            "ACTIVATING" => Ok(Phase::PreBuild),
            "RUNNING" => Ok(Phase::Build),
            "DEACTIVATING" => Ok(Phase::PostBuild),
            "STOPPING" | "DEPROVISIONING" => Ok(Phase::Finalizing),
            "STOPPED" => Ok(Phase::Completed),
            other => Err(DecodeError::UnknownPhase(other.to_string())),
        }
    }
}

impl FromStr for Phase {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownPhase(s.to_string()))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_follows_ordinal() {
        for a in Phase::ALL {
            for b in Phase::ALL {
                assert_eq!(a < b, a.ordinal() < b.ordinal(), "{} vs {}", a, b);
                assert_eq!(a == b, a.ordinal() == b.ordinal());
            }
        }
    }

    #[test]
    fn test_parse_round_trips_names() {
        for phase in Phase::ALL {
            assert_eq!(phase.as_str().parse::<Phase>().unwrap(), phase);
        }
    }

    #[test]
    fn test_unknown_phase_is_decode_error() {
        let err = "WARMING_UP".parse::<Phase>().unwrap_err();
        assert_eq!(err, DecodeError::UnknownPhase("WARMING_UP".to_string()));
    }

    #[test]
    fn test_task_statuses_are_monotonic() {
        let statuses = [
            "PROVISIONING",
            "PENDING",
            "ACTIVATING",
            "RUNNING",
            "DEACTIVATING",
            "STOPPING",
            "DEPROVISIONING",
            "STOPPED",
        ];
        let phases: Vec<Phase> = statuses
            .iter()
            .map(|s| Phase::from_task_status(s).unwrap())
            .collect();

        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
        assert!(Phase::from_task_status("RUNNING").unwrap() > Phase::RUNNABLE);
        assert!(Phase::from_task_status("LOST").is_err());
    }

    #[test]
    fn test_serde_uses_runner_names() {
        let json = serde_json::to_string(&Phase::DownloadSource).unwrap();
        assert_eq!(json, "\"DOWNLOAD_SOURCE\"");
        let phase: Phase = serde_json::from_str("\"PRE_BUILD\"").unwrap();
        assert_eq!(phase, Phase::PreBuild);
    }
}
