//! Child-process channel over piped stdio.
//!
//! Each spawned process gets:
//! - a writer task draining an unbounded queue into stdin
//! - an output reader forwarding stdout chunks as events
//! - a stderr reader logging lines through `tracing`
//! - a monitor task that waits for exit or a disconnect request
//!
//! All four share one cancellation token; the event stream closes once every
//! task has finished.

use async_trait::async_trait;
use gcl_core::{ChannelEvent, ProcessChannel, ProcessError, ProcessSpawner, SpawnedProcess};
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shutdown::{GRACE_PERIOD, shutdown_child};
use super::stream::{spawn_log_reader, spawn_output_reader};

/// Live handle to a gcl child process.
#[derive(Debug)]
pub struct StdioChannel {
    pid: Option<u32>,
    connected: Arc<AtomicBool>,
    writes: mpsc::UnboundedSender<Vec<u8>>,
    shutdown: CancellationToken,
}

impl StdioChannel {
    /// OS process id, if the child had one when spawned.
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }
}

impl ProcessChannel for StdioChannel {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn disconnect(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            debug!(pid = ?self.pid, "Disconnect requested");
        }
        self.shutdown.cancel();
    }

    fn send(&self, bytes: &[u8]) -> Result<(), ProcessError> {
        if !self.is_connected() {
            return Err(ProcessError::NotConnected);
        }
        self.writes
            .send(bytes.to_vec())
            .map_err(|_| ProcessError::NotConnected)
    }
}

/// Spawns gcl as a tokio child process with piped stdio.
#[derive(Debug, Clone, Copy)]
pub struct StdioSpawner {
    grace: Duration,
}

impl StdioSpawner {
    pub const fn new() -> Self {
        Self {
            grace: GRACE_PERIOD,
        }
    }

    /// Override how long a child gets to exit after SIGTERM on disconnect.
    #[must_use]
    pub const fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }
}

impl Default for StdioSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessSpawner for StdioSpawner {
    async fn spawn(&self, path: &str, args: &[String]) -> Result<SpawnedProcess, ProcessError> {
        let spawn_failed = |reason: String| ProcessError::SpawnFailed {
            path: path.to_string(),
            reason,
        };

        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_failed(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed("stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed("stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| spawn_failed("stderr not captured".to_string()))?;

        let pid = child.id();
        info!(path = %path, pid = ?pid, "Spawned gcl");

        let (events_tx, events) = mpsc::unbounded_channel();
        let (writes_tx, writes_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));
        let shutdown = CancellationToken::new();

        spawn_output_reader(stdout, events_tx.clone());
        spawn_log_reader(stderr, Arc::from(path));
        tokio::spawn(write_requests(
            stdin,
            writes_rx,
            events_tx.clone(),
            shutdown.clone(),
        ));
        tokio::spawn(monitor_child(
            child,
            events_tx,
            Arc::clone(&connected),
            shutdown.clone(),
            self.grace,
        ));

        let channel = Arc::new(StdioChannel {
            pid,
            connected,
            writes: writes_tx,
            shutdown,
        });
        Ok(SpawnedProcess { channel, events })
    }
}

/// Drain queued requests into stdin until shutdown or a write failure.
async fn write_requests(
    mut stdin: ChildStdin,
    mut writes: mpsc::UnboundedReceiver<Vec<u8>>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    shutdown: CancellationToken,
) {
    loop {
        let bytes = tokio::select! {
            () = shutdown.cancelled() => break,
            next = writes.recv() => match next {
                Some(bytes) => bytes,
                None => break,
            },
        };

        let written = async {
            stdin.write_all(&bytes).await?;
            stdin.flush().await
        };
        if let Err(e) = written.await {
            warn!(error = %e, "Write to gcl failed");
            let _ = events.send(ChannelEvent::Error(ProcessError::WriteFailed(e.to_string())));
            break;
        }
        debug!(bytes = bytes.len(), "Wrote request to gcl");
    }

    debug!("stdin writer task exiting");
}

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    Requested,
}

/// Wait for the child to exit on its own, or stop it when asked to.
async fn monitor_child(
    mut child: Child,
    events: mpsc::UnboundedSender<ChannelEvent>,
    connected: Arc<AtomicBool>,
    shutdown: CancellationToken,
    grace: Duration,
) {
    let outcome = tokio::select! {
        status = child.wait() => Outcome::Exited(status),
        () = shutdown.cancelled() => Outcome::Requested,
    };

    match outcome {
        Outcome::Exited(status) => {
            let was_connected = connected.swap(false, Ordering::SeqCst);
            shutdown.cancel();
            let code = match status {
                Ok(status) => status.code(),
                Err(e) => {
                    warn!(error = %e, "Failed to wait for gcl");
                    None
                }
            };
            if was_connected {
                warn!(code = ?code, "gcl exited unexpectedly");
                let _ = events.send(ChannelEvent::Error(ProcessError::Exited { code }));
            } else {
                debug!(code = ?code, "gcl exited after disconnect");
            }
        }
        Outcome::Requested => match shutdown_child(&mut child, grace).await {
            Ok(status) => debug!(code = ?status.code(), "gcl stopped"),
            Err(e) => warn!(error = %e, "Failed to stop gcl"),
        },
    }
}
