//! Locating and validating the gcl executable.
//!
//! Resolution order:
//! 1. The configured path, trimmed, when it is non-trivial
//! 2. An OS search for [`GCL_BINARY_NAME`] otherwise
//!
//! A resolved candidate is then probed with `--help`; its output must start
//! with [`GCL_SIGNATURE`].

use std::sync::Arc;
use tracing::debug;

use crate::error::{ConnectionResult, ValidationError};
use crate::ports::{ConfigStore, PathSearch, ValidationProbe};

/// Name searched for when no path is configured.
pub const GCL_BINARY_NAME: &str = "gcl";

/// Argument passed to a candidate when validating it.
pub const HELP_FLAG: &str = "--help";

/// Case-sensitive prefix the probe output must start with.
pub const GCL_SIGNATURE: &str = "GCL";

/// Whether a stored path should be ignored in favour of searching.
pub fn is_unset(stored: &str) -> bool {
    let trimmed = stored.trim();
    trimmed.is_empty() || trimmed == "."
}

/// Whether probe output identifies gcl.
pub fn has_signature(output: &str) -> bool {
    output.starts_with(GCL_SIGNATURE)
}

/// Resolves, validates and persists the executable path.
#[derive(Clone)]
pub struct PathResolver {
    search: Arc<dyn PathSearch>,
    probe: Arc<dyn ValidationProbe>,
}

impl PathResolver {
    pub fn new(search: Arc<dyn PathSearch>, probe: Arc<dyn ValidationProbe>) -> Self {
        Self { search, probe }
    }

    /// Return the configured path, or search for gcl when none is configured.
    ///
    /// A non-trivial configured value is accepted without searching.
    pub async fn get_path(&self, store: &dyn ConfigStore) -> ConnectionResult<String> {
        let stored = store
            .get_path()
            .await
            .map(|path| path.trim().to_string())
            .unwrap_or_default();

        if !is_unset(&stored) {
            debug!(path = %stored, "Using configured gcl path");
            return Ok(stored);
        }

        debug!(name = GCL_BINARY_NAME, "No gcl path configured, searching");
        let found = self.search.search(GCL_BINARY_NAME).await?;
        Ok(found.trim().to_string())
    }

    /// Persist `path` and hand it back.
    pub async fn set_path(&self, store: &dyn ConfigStore, path: String) -> ConnectionResult<String> {
        store.set_path(&path).await?;
        Ok(path)
    }

    /// Check that `path` really is gcl by probing its help output.
    pub async fn validate_path(&self, path: String) -> ConnectionResult<String> {
        let output = self.probe.run(&path, &[HELP_FLAG.to_string()]).await?;
        if has_signature(&output) {
            debug!(path = %path, "gcl path validated");
            Ok(path)
        } else {
            debug!(path = %path, output = %output.lines().next().unwrap_or_default(), "Probe output lacks gcl signature");
            Err(ValidationError::Mismatch { path }.into())
        }
    }

    /// Resolve, validate, then persist, stopping at the first failure.
    pub async fn resolve(&self, store: &dyn ConfigStore) -> ConnectionResult<String> {
        let path = self.get_path(store).await?;
        let path = self.validate_path(path).await?;
        self.set_path(store, path).await
    }
}

impl std::fmt::Debug for PathResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathResolver").finish_non_exhaustive()
    }
}
