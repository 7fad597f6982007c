//! Main CLI parser and top-level argument handling.
//!
//! This module defines the root CLI structure with global options.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Commands;

/// Command-line interface for the gcl connection manager.
#[derive(Parser, Debug)]
#[command(name = "gcl-link")]
#[command(about = "Locate, validate and talk to the gcl backend")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output on stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Give up on a response after this many milliseconds
    #[arg(long = "timeout-ms", env = "GCL_LINK_TIMEOUT_MS", global = true)]
    pub timeout_ms: Option<u64>,

    /// Use this settings file instead of the one in the data directory
    #[arg(long = "settings", env = "GCL_LINK_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
