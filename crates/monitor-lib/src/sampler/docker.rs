//! Running container count via the docker CLI

use tokio::process::Command;

use crate::error::SampleError;

/// Counts running containers with `docker ps -q`
pub struct DockerCounter {
    binary: String,
}

impl DockerCounter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command_line(&self) -> String {
        format!("{} ps -q", self.binary)
    }

    pub async fn count_running(&self) -> Result<u64, SampleError> {
        let output = Command::new(&self.binary)
            .args(["ps", "-q"])
            .output()
            .await
            .map_err(|source| SampleError::Spawn {
                command: self.command_line(),
                source,
            })?;

        if !output.status.success() {
            return Err(SampleError::CommandFailed {
                command: self.command_line(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(count_container_ids(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Count container IDs in `docker ps -q` output, one per non-empty line
pub fn count_container_ids(stdout: &str) -> u64 {
    stdout.lines().filter(|line| !line.trim().is_empty()).count() as u64
}
