//! Executable search on `PATH`.

use async_trait::async_trait;
use gcl_core::{PathSearch, PathSearchError};
use tracing::debug;

/// [`PathSearch`] backed by the `which` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhichPathSearch;

impl WhichPathSearch {
    pub const fn new() -> Self {
        Self
    }
}

fn lookup(name: &str) -> Result<String, PathSearchError> {
    match which::which(name) {
        Ok(path) => Ok(path.to_string_lossy().into_owned()),
        Err(which::Error::CannotFindBinaryPath) => Err(PathSearchError::NotFound {
            name: name.to_string(),
        }),
        Err(e) => Err(PathSearchError::Failed(e.to_string())),
    }
}

#[async_trait]
impl PathSearch for WhichPathSearch {
    async fn search(&self, name: &str) -> Result<String, PathSearchError> {
        let owned = name.to_string();
        let found = tokio::task::spawn_blocking(move || lookup(&owned))
            .await
            .map_err(|e| PathSearchError::Failed(format!("search task failed: {e}")))?;
        debug!(name, result = ?found, "Executable search finished");
        found
    }
}
