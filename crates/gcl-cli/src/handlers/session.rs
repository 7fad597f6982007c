//! Session command handler.
//!
//! Keeps one connection open for the lifetime of stdin. Every non-empty line
//! is sent as a request; every message gcl emits (responses and unsolicited
//! output alike) is printed on its own line as it arrives.

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

use super::{parse_request, render};
use crate::bootstrap::CliContext;
use crate::error::CliError;
use gcl_core::{ConnectionError, ProcessError};

/// Whether an error means the connection is gone for good.
const fn is_fatal(err: &ConnectionError) -> bool {
    matches!(
        err,
        ConnectionError::Process(
            ProcessError::NotConnected
                | ProcessError::Exited { .. }
                | ProcessError::ReadFailed(_)
                | ProcessError::WriteFailed(_)
        )
    )
}

/// Execute the session command.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let connection = ctx.connect().await?;
    let printer = connection.on_message(|delivery| match delivery {
        Ok(message) => println!("{}", render(message)),
        Err(e) => debug!(error = %e, "Connection reported an error"),
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let outcome = loop {
        let Some(line) = lines.next_line().await? else {
            break Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let request = match parse_request(&line) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Skipping line");
                continue;
            }
        };

        match connection.send_json(&request).await {
            Ok(_) => {}
            Err(e) if is_fatal(&e) => break Err(e.into()),
            Err(e) => warn!(error = %e, "Request failed"),
        }
    };

    connection.off(printer);
    connection.disconnect();
    outcome
}
