//! Validation probe that runs a candidate executable and captures its output.

use async_trait::async_trait;
use gcl_core::{ValidationError, ValidationProbe};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Default time a candidate gets to print its help text.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `<path> <args>` and returns what it printed.
///
/// Standard output is returned when non-empty, otherwise standard error; some
/// tools print their usage there. A non-zero exit status is not an error on
/// its own, the signature check decides.
#[derive(Debug, Clone, Copy)]
pub struct CommandProbe {
    timeout: Duration,
}

impl CommandProbe {
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for CommandProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValidationProbe for CommandProbe {
    async fn run(&self, path: &str, args: &[String]) -> Result<String, ValidationError> {
        let failed = |reason: String| ValidationError::ProbeFailed {
            path: path.to_string(),
            reason,
        };

        let output = Command::new(path)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();
        let output = tokio::time::timeout(self.timeout, output)
            .await
            .map_err(|_| failed(format!("no response within {}s", self.timeout.as_secs())))?
            .map_err(|e| failed(e.to_string()))?;

        debug!(path, status = ?output.status, "Probe finished");
        let captured = if output.stdout.is_empty() {
            output.stderr
        } else {
            output.stdout
        };
        Ok(String::from_utf8_lossy(&captured).into_owned())
    }
}
