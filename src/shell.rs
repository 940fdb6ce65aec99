//! [`Target`] implementation that runs commands on the local host.

use std::time::Duration;

use tokio::process::Command;
use tracing::debug;

use crate::error::MetadataError;
use crate::host::Target;
use crate::platform::Platform;

/// Runs commands through `sh -c` on the machine this process runs on.
#[derive(Debug, Clone)]
pub struct LocalShell {
    platform: Platform,
    timeout: Option<Duration>,
}

impl LocalShell {
    /// Create a local shell target reporting `platform`.
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            timeout: None,
        }
    }

    /// Fail commands that run longer than `timeout` with
    /// [`MetadataError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Target for LocalShell {
    fn platform(&self) -> &Platform {
        &self.platform
    }

    async fn execute(&self, command: &str) -> Result<String, MetadataError> {
        debug!(command, "executing");

        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(command).kill_on_drop(true);

        let output = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, cmd.output())
                .await
                .map_err(|_| MetadataError::Timeout)??,
            None => cmd.output().await?,
        };

        if !output.status.success() {
            return Err(MetadataError::Command {
                command: command.to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| MetadataError::Utf8)
    }
}
