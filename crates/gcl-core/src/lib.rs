//! Core connection logic for talking to the gcl backend.
//!
//! This crate owns everything that does not touch the operating system
//! directly: the error taxonomy, the port traits adapters implement, the
//! event bus, the JSON frame decoder, path resolution and the connection
//! itself. Process, filesystem and search adapters live in `gcl-runtime`.

#![deny(unsafe_code)]

pub mod bus;
pub mod connection;
pub mod error;
pub mod ports;
pub mod resolver;
pub mod wire;

pub use bus::{EventBus, ListenerId};
pub use connection::{ConnectOptions, Connection, Delivery};
pub use error::{
    ConfigError, ConnectionError, ConnectionResult, PathSearchError, ProcessError, ValidationError,
};
pub use ports::{
    ChannelEvent, ConfigStore, ConnectionPorts, MemoryConfigStore, PathSearch, ProcessChannel,
    ProcessSpawner, SpawnedProcess, ValidationProbe,
};
pub use resolver::{GCL_BINARY_NAME, GCL_SIGNATURE, HELP_FLAG, PathResolver};
pub use wire::FrameDecoder;
