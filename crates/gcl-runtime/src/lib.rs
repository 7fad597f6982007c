//! OS-level adapters for gcl-link.
//!
//! This crate implements the ports defined in `gcl-core`:
//! - [`StdioSpawner`]: runs gcl as a child process over piped stdio
//! - [`WhichPathSearch`]: finds executables on `PATH`
//! - [`CommandProbe`]: captures a candidate's `--help` output
//! - [`FileConfigStore`]: persists settings as JSON
//!
//! [`connect`] wires them together.

#![deny(unsafe_code)]

pub mod probe;
pub mod process;
pub mod search;
pub mod settings;

use gcl_core::{ConfigStore, ConnectOptions, Connection, ConnectionPorts, ConnectionResult};
use std::sync::Arc;

pub use probe::{CommandProbe, DEFAULT_PROBE_TIMEOUT};
pub use process::{StdioChannel, StdioSpawner};
pub use search::WhichPathSearch;
pub use settings::{FileConfigStore, Settings, data_root};

/// Ports backed by the real operating system.
pub fn default_ports() -> ConnectionPorts {
    ConnectionPorts::new(
        Arc::new(WhichPathSearch::new()),
        Arc::new(CommandProbe::new()),
        Arc::new(StdioSpawner::new()),
    )
}

/// Resolve, validate and spawn gcl using the OS adapters.
pub async fn connect(store: &dyn ConfigStore, options: ConnectOptions) -> ConnectionResult<Connection> {
    Connection::make(store, &default_ports(), options).await
}
