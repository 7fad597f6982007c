//! Error taxonomy for connecting to and talking with the gcl backend.
//!
//! Every failure a caller can observe is a [`ConnectionError`]. The wrapped
//! cause types come from the collaborator that failed (executable search,
//! validation probe, process transport), so adapters can produce them without
//! knowing about the connection pipeline.

use std::time::Duration;
use thiserror::Error;

/// The OS executable search could not produce a path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathSearchError {
    /// No executable with this name is on the search path.
    #[error("Cannot find '{name}' on the search path. Install gcl or set its path explicitly.")]
    NotFound { name: String },

    /// The search itself failed (unreadable PATH, bad working directory, etc.).
    #[error("Failed to search for executable: {0}")]
    Failed(String),
}

/// A candidate path did not pass the validation probe.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The probe ran, but its output does not carry the gcl signature.
    #[error("'{path}' does not look like the gcl executable")]
    Mismatch { path: String },

    /// The probe could not be executed at all.
    #[error("Failed to run '{path}': {reason}")]
    ProbeFailed { path: String, reason: String },
}

/// Process-level and transport-level failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    /// The executable could not be started.
    #[error("Failed to start '{path}': {reason}")]
    SpawnFailed { path: String, reason: String },

    /// Writing a request to the process failed.
    #[error("Failed to write to gcl: {0}")]
    WriteFailed(String),

    /// Reading the process output failed.
    #[error("Failed to read from gcl: {0}")]
    ReadFailed(String),

    /// The process terminated without being asked to.
    #[error("gcl exited unexpectedly ({})", describe_exit(.code))]
    Exited { code: Option<i32> },

    /// The channel is no longer connected.
    #[error("Not connected to gcl")]
    NotConnected,

    /// No response arrived within the request deadline.
    #[error("gcl did not respond within {}ms", millis(.0))]
    Timeout(Duration),
}

#[allow(clippy::ref_option)]
fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}"))
}

const fn millis(duration: &Duration) -> u128 {
    duration.as_millis()
}

/// Failure of the configuration store collaborator.
///
/// This is the store's own error, surfaced unchanged by operations that
/// persist the executable path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Could not determine where settings live.
    #[error("Cannot determine settings directory")]
    NoDataDir,

    /// Reading or writing the settings file failed.
    #[error("Failed to access settings file {path}: {reason}")]
    Io { path: String, reason: String },

    /// The settings file exists but is not valid.
    #[error("Invalid settings file {path}: {reason}")]
    Invalid { path: String, reason: String },
}

/// Error surfaced to callers of connection operations.
///
/// Each variant renders through its cause's own message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectionError {
    /// Executable search failed.
    #[error(transparent)]
    PathSearch(#[from] PathSearchError),

    /// A resolved path failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Spawn, write, exit, or other transport fault.
    #[error(transparent)]
    Process(#[from] ProcessError),

    /// The configuration store failed to persist the path.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for connection operations.
pub type ConnectionResult<T> = Result<T, ConnectionError>;
