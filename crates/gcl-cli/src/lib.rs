//! `gcl-link` command-line front end.
//!
//! Parses arguments, composes the OS adapters from `gcl-runtime` and routes
//! each command to a handler.

#![deny(unsafe_code)]

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::Commands;
pub use error::CliError;
pub use parser::Cli;

/// Route a parsed command to its handler.
pub async fn dispatch(ctx: &CliContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Path => handlers::path::execute(ctx).await,
        Commands::SetPath { path } => handlers::set_path::execute(ctx, &path).await,
        Commands::Validate { path } => handlers::validate::execute(ctx, path.as_deref()).await,
        Commands::Send { request } => handlers::send::execute(ctx, request).await,
        Commands::Session => handlers::session::execute(ctx).await,
    }
}
