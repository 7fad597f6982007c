//! Executable search port.

use async_trait::async_trait;

use crate::error::PathSearchError;

/// Locates an executable by name on the operating system's search path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PathSearch: Send + Sync {
    /// Resolve `name` to a path. The result may carry surrounding whitespace;
    /// callers trim it.
    async fn search(&self, name: &str) -> Result<String, PathSearchError>;
}
