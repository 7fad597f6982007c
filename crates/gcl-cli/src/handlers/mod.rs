//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<(), CliError>`
//! - Thin wrappers that:
//!   1. Parse/validate CLI-specific input
//!   2. Call into `gcl-core` through the context
//!   3. Print results to stdout, diagnostics go through `tracing`

pub mod path;
pub mod send;
pub mod session;
pub mod set_path;
pub mod validate;

use serde_json::Value;

use crate::error::CliError;

/// Parse a request document, rejecting anything that is not JSON.
pub fn parse_request(raw: &str) -> Result<Value, CliError> {
    serde_json::from_str(raw.trim())
        .map_err(|e| CliError::Arguments(format!("request is not valid JSON: {e}")))
}

/// Render a message on a single line.
pub fn render(value: &Value) -> String {
    value.to_string()
}
