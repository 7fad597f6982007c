//! Process channel port.
//!
//! A channel wraps one running backend process. Writes are synchronous from
//! the caller's point of view (they are queued, and fail immediately when the
//! channel cannot accept them); output and process failures arrive on a single
//! ordered event stream handed out at spawn time.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::ProcessError;

/// Something that happened on a process channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A raw chunk of the process's standard output.
    Output(Vec<u8>),
    /// A process-level failure (crash, read failure, write failure).
    Error(ProcessError),
}

/// Live handle to a spawned process.
pub trait ProcessChannel: Send + Sync {
    /// Whether the process is still running and accepting input.
    fn is_connected(&self) -> bool;

    /// Request teardown of the process. Safe to call more than once.
    fn disconnect(&self);

    /// Queue raw bytes for the process's standard input.
    fn send(&self, bytes: &[u8]) -> Result<(), ProcessError>;
}

/// A freshly spawned process: its channel plus the receiving end of its
/// event stream.
///
/// Events produced before anyone reads `events` are buffered, so no output is
/// lost between spawning and wiring.
pub struct SpawnedProcess {
    pub channel: Arc<dyn ProcessChannel>,
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl std::fmt::Debug for SpawnedProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpawnedProcess")
            .field("connected", &self.channel.is_connected())
            .finish_non_exhaustive()
    }
}

/// Starts backend processes.
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Spawn `path` with `args`, with piped standard streams.
    async fn spawn(&self, path: &str, args: &[String]) -> Result<SpawnedProcess, ProcessError>;
}
