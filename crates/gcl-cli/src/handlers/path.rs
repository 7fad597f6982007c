//! Path command handler.
//!
//! Prints the executable that a connection would use, without validating it.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Execute the path command.
pub async fn execute(ctx: &CliContext) -> Result<(), CliError> {
    let path = ctx.resolver().get_path(&ctx.store).await?;
    println!("{path}");
    Ok(())
}
