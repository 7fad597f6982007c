//! Port definitions (trait abstractions) for external collaborators.
//!
//! Ports define the interfaces the connection pipeline expects from the
//! operating system. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No `tokio::process` or filesystem types in any signature
//! - Errors are the domain cause types from [`crate::error`]
//! - Intent-based methods (search, probe, spawn), not implementation-leaking

pub mod config_store;
pub mod path_search;
pub mod process_channel;
pub mod validation_probe;

use std::sync::Arc;

pub use config_store::{ConfigStore, MemoryConfigStore};
pub use path_search::PathSearch;
pub use process_channel::{ChannelEvent, ProcessChannel, ProcessSpawner, SpawnedProcess};
pub use validation_probe::ValidationProbe;

/// Container for the collaborators needed to establish a connection.
///
/// Adapters build one of these at their composition root and hand it to
/// [`Connection::make`](crate::Connection::make).
#[derive(Clone)]
pub struct ConnectionPorts {
    /// Executable search used when no path is configured.
    pub search: Arc<dyn PathSearch>,
    /// Probe that checks a candidate is really gcl.
    pub probe: Arc<dyn ValidationProbe>,
    /// Starts the backend process.
    pub spawner: Arc<dyn ProcessSpawner>,
}

impl ConnectionPorts {
    /// Create a new ports container.
    pub fn new(
        search: Arc<dyn PathSearch>,
        probe: Arc<dyn ValidationProbe>,
        spawner: Arc<dyn ProcessSpawner>,
    ) -> Self {
        Self {
            search,
            probe,
            spawner,
        }
    }
}

impl std::fmt::Debug for ConnectionPorts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPorts").finish_non_exhaustive()
    }
}
