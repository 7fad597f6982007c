//! Validate command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Probe `path`, or the resolved path when none is given.
pub async fn execute(ctx: &CliContext, path: Option<&str>) -> Result<(), CliError> {
    let resolver = ctx.resolver();
    let candidate = match path.map(str::trim) {
        Some(path) if !path.is_empty() => path.to_string(),
        _ => resolver.get_path(&ctx.store).await?,
    };

    let path = resolver.validate_path(candidate).await?;
    println!("{path}: ok");
    Ok(())
}
