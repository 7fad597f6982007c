//! Send command handler.
//!
//! Connects, writes one request and prints the next message gcl emits.

use tokio::io::AsyncReadExt;
use tracing::debug;

use super::{parse_request, render};
use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the send command. Reads the request from stdin when `request` is `None`.
pub async fn execute(ctx: &CliContext, request: Option<String>) -> Result<(), CliError> {
    let raw = match request {
        Some(raw) => raw,
        None => {
            let mut raw = String::new();
            tokio::io::stdin().read_to_string(&mut raw).await?;
            raw
        }
    };
    let request = parse_request(&raw)?;

    let connection = ctx.connect().await?;
    debug!(path = %connection.path(), "Sending request");
    let response = connection.send_json(&request).await;
    connection.disconnect();

    println!("{}", render(&response?));
    Ok(())
}
