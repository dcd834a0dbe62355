//! Podman image management
//!
//! Handles the local image lifecycle of a replication job:
//! - Checking podman availability
//! - Logging in to registries
//! - Pulling, tagging and pushing images
//! - Removing pulled images once the batch is done

use std::io::{BufRead, BufReader, Write};
use std::process::{Command, Output, Stdio};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::registry::RegistryLogin;
use ferry_client::BasicCredentials;

/// Lines of push output kept for the error message
const PUSH_TAIL_LINES: usize = 5;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to execute 'podman {command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'podman {command}' failed with exit code {code}: {stderr}")]
    Failed {
        command: String,
        code: i32,
        stderr: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Local container engine operations the replication engine needs
pub trait ContainerEngine: Send + Sync {
    /// Pulls an image and returns its local image id
    fn pull(&self, image: &str) -> Result<String>;

    /// Adds `target` as a name for a local image
    fn tag(&self, image_id: &str, target: &str) -> Result<()>;

    /// Pushes a tagged image, logging progress as it goes
    fn push(&self, target: &str) -> Result<()>;

    /// Removes a local image
    fn remove(&self, image_id: &str) -> Result<()>;
}

/// [`ContainerEngine`] backed by the podman CLI
#[derive(Debug, Clone, Default)]
pub struct PodmanEngine;

impl PodmanEngine {
    pub fn new() -> Self {
        Self
    }

    /// Checks if podman is installed and available
    pub fn check_available(&self) -> Result<()> {
        let version = self.run(&["--version"])?;
        info!("Podman is available: {}", version.trim());
        Ok(())
    }

    /// Runs podman to completion and returns its stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("podman")
            .args(args)
            .output()
            .map_err(|source| EngineError::Spawn {
                command: command_name(args),
                source,
            })?;

        check_output(args, output)
    }
}

impl ContainerEngine for PodmanEngine {
    fn pull(&self, image: &str) -> Result<String> {
        info!("Pulling image {}", image);
        let stdout = self.run(&["pull", "--quiet", image])?;

        // --quiet prints the image id on the last line
        let image_id = stdout.lines().last().unwrap_or_default().trim().to_string();
        debug!("Pulled {} as {}", image, image_id);
        Ok(image_id)
    }

    fn tag(&self, image_id: &str, target: &str) -> Result<()> {
        info!("Tagging image with {}", target);
        self.run(&["tag", image_id, target]).map(|_| ())
    }

    fn push(&self, target: &str) -> Result<()> {
        info!("Pushing image to {}", target);
        let args = ["push", target];

        let mut child = Command::new("podman")
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| EngineError::Spawn {
                command: command_name(&args),
                source,
            })?;

        // Podman reports per-layer progress on stderr
        let mut tail: Vec<String> = Vec::new();
        if let Some(stderr) = child.stderr.take() {
            for line in BufReader::new(stderr).lines().map_while(|line| line.ok()) {
                debug!("Push: {}", line);
                if tail.len() == PUSH_TAIL_LINES {
                    tail.remove(0);
                }
                tail.push(line);
            }
        }

        let status = child.wait().map_err(|source| EngineError::Spawn {
            command: command_name(&args),
            source,
        })?;

        if !status.success() {
            let err = EngineError::Failed {
                command: command_name(&args),
                code: status.code().unwrap_or(-1),
                stderr: tail.join("\n"),
            };
            error!("{}", err);
            return Err(err);
        }

        Ok(())
    }

    fn remove(&self, image_id: &str) -> Result<()> {
        debug!("Removing image {}", image_id);
        self.run(&["rmi", "--force", image_id]).map(|_| ())
    }
}

impl RegistryLogin for PodmanEngine {
    fn login(&self, host: &str, credentials: &BasicCredentials) -> Result<()> {
        info!("Logging in to registry {}", host);
        let args = [
            "login",
            "--username",
            credentials.username.as_str(),
            "--password-stdin",
            host,
        ];
        let spawn_error = |source| EngineError::Spawn {
            command: command_name(&args),
            source,
        };

        let mut child = Command::new("podman")
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(credentials.password.as_bytes())
                .map_err(spawn_error)?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        let stdout = check_output(&args, output)?;
        debug!("Login response: {}", stdout.trim());
        Ok(())
    }
}

/// First argument only, so credentials never end up in logs
fn command_name(args: &[&str]) -> String {
    args.first().copied().unwrap_or_default().to_string()
}

fn check_output(args: &[&str], output: Output) -> Result<String> {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !stderr.trim().is_empty() {
        debug!("podman {} stderr: {}", command_name(args), stderr.trim());
    }

    if !output.status.success() {
        let err = EngineError::Failed {
            command: command_name(args),
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.trim().to_string(),
        };
        error!("{}", err);
        return Err(err);
    }

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_name_hides_arguments() {
        assert_eq!(command_name(&["login", "--username", "AKIA"]), "login");
        assert_eq!(command_name(&[]), "");
    }

    #[test]
    fn test_failed_message() {
        let err = EngineError::Failed {
            command: "push".to_string(),
            code: 125,
            stderr: "denied: requested access to the resource is denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "'podman push' failed with exit code 125: denied: requested access to the resource is denied"
        );
    }
}
