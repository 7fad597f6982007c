//! Set-path command handler.

use tracing::info;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Validate `path` and store it as the gcl executable.
///
/// Nothing is written when validation fails.
pub async fn execute(ctx: &CliContext, path: &str) -> Result<(), CliError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(CliError::Arguments("path must not be empty".to_string()));
    }

    let resolver = ctx.resolver();
    let path = resolver.validate_path(path.to_string()).await?;
    let path = resolver.set_path(&ctx.store, path).await?;
    info!(path = %path, settings = %ctx.store.path().display(), "Stored gcl path");
    println!("{path}");
    Ok(())
}
