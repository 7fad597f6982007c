//! Available subcommands.

use clap::Subcommand;

/// Operations on the gcl backend.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the gcl executable that would be used (configured or found on PATH)
    Path,

    /// Validate an executable and store it as the gcl path
    SetPath {
        /// Path to the gcl executable
        path: String,
    },

    /// Check that an executable is gcl by probing its --help output
    Validate {
        /// Executable to check (defaults to the resolved path)
        path: Option<String>,
    },

    /// Connect, send one JSON request and print the response
    Send {
        /// Request document (read from stdin when omitted)
        request: Option<String>,
    },

    /// Connect and send each stdin line as a request, printing every message
    Session,
}
