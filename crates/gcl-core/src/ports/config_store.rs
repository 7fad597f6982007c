//! Configuration store port.
//!
//! The store remembers which gcl executable to use between sessions.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::ConfigError;

/// Persistence for the configured executable path.
///
/// # Design Rules
///
/// - Reading never fails: an unreadable store behaves like an empty one
/// - Writing reports the store's own [`ConfigError`]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// The stored path, if any. The value is returned exactly as stored.
    async fn get_path(&self) -> Option<String>;

    /// Persist a new path.
    async fn set_path(&self, path: &str) -> Result<(), ConfigError>;
}

/// In-memory store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    path: Mutex<Option<String>>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `path`.
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            path: Mutex::new(Some(path.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.path
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_path(&self) -> Option<String> {
        self.slot().clone()
    }

    async fn set_path(&self, path: &str) -> Result<(), ConfigError> {
        *self.slot() = Some(path.to_string());
        Ok(())
    }
}
