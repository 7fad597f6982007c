//! CLI-specific error types and mappings.
//!
//! Maps [`ConnectionError`] causes to exit codes and user-facing messages.

use gcl_core::{ConfigError, ConnectionError};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Bad user input (e.g. a request that is not JSON).
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// Terminal IO failed.
    #[error("IO error: {0}")]
    Io(String),

    /// Settings could not be located, read or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// gcl could not be found on PATH.
    #[error("{0}")]
    Search(String),

    /// The executable is not gcl, or could not be probed.
    #[error("{0}")]
    Validation(String),

    /// Spawning or talking to gcl failed.
    #[error("Process error: {0}")]
    Process(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Arguments(_) => 2,
            Self::Validation(_) => 65, // EX_DATAERR
            Self::Search(_) => 69,     // EX_UNAVAILABLE
            Self::Process(_) => 71,    // EX_OSERR
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<ConnectionError> for CliError {
    fn from(err: ConnectionError) -> Self {
        match err {
            ConnectionError::PathSearch(e) => Self::Search(e.to_string()),
            ConnectionError::Validation(e) => Self::Validation(e.to_string()),
            ConnectionError::Process(e) => Self::Process(e.to_string()),
            ConnectionError::Config(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
