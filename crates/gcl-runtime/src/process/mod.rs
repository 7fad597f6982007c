//! Process management for the gcl backend.
//!
//! - `channel`: the stdio [`ProcessChannel`](gcl_core::ProcessChannel) and its spawner
//! - `stream`: stdout/stderr readers
//! - `shutdown`: graceful child termination

mod channel;
pub mod shutdown;
pub mod stream;

pub use channel::{StdioChannel, StdioSpawner};
pub use shutdown::shutdown_child;
