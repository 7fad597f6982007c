//! CLI bootstrap - the composition root.
//!
//! This module is the only place where OS adapters are wired together for
//! the CLI:
//! - Settings file store (via gcl-runtime)
//! - Path search, validation probe and process spawner (via gcl-runtime)
//! - Connection options from settings and flags
//!
//! Command handlers receive the composed [`CliContext`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use gcl_core::{ConnectOptions, Connection, ConnectionPorts, PathResolver};
use gcl_runtime::settings::SETTINGS_FILE;
use gcl_runtime::{FileConfigStore, data_root, default_ports};
use tracing::{debug, warn};

use crate::error::CliError;
use crate::parser::Cli;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Settings file to use; the data root's `settings.json` when `None`.
    pub settings_path: Option<PathBuf>,
    /// Request timeout from the command line, overriding settings.
    pub timeout_ms: Option<u64>,
}

impl CliConfig {
    /// Build config from parsed arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            settings_path: cli.settings.clone(),
            timeout_ms: cli.timeout_ms,
        }
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    /// Where the gcl path is persisted.
    pub store: FileConfigStore,
    /// OS adapters used to resolve and spawn gcl.
    pub ports: ConnectionPorts,
    /// Options for new connections.
    pub options: ConnectOptions,
}

impl CliContext {
    /// Path resolver over this context's ports.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(Arc::clone(&self.ports.search), Arc::clone(&self.ports.probe))
    }

    /// Open a connection to gcl.
    pub async fn connect(&self) -> Result<Connection, CliError> {
        Ok(Connection::make(&self.store, &self.ports, self.options).await?)
    }
}

/// Compose the CLI context from config.
pub async fn bootstrap(config: CliConfig) -> Result<CliContext, CliError> {
    let settings_path = match config.settings_path {
        Some(path) => path,
        None => data_root()?.join(SETTINGS_FILE),
    };
    debug!(path = %settings_path.display(), "Using settings file");
    let store = FileConfigStore::new(settings_path);

    let options = match config.timeout_ms {
        Some(0) => ConnectOptions::default(),
        Some(ms) => ConnectOptions::default().with_request_timeout(Duration::from_millis(ms)),
        None => match store.load().await {
            Ok(settings) => settings.connect_options(),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable settings, no request timeout");
                ConnectOptions::default()
            }
        },
    };

    Ok(CliContext {
        store,
        ports: default_ports(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcl_runtime::Settings;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_timeout_comes_from_settings_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        FileConfigStore::new(&path)
            .save(&Settings {
                gcl_path: None,
                request_timeout_ms: Some(750),
            })
            .await
            .unwrap();

        let ctx = bootstrap(CliConfig {
            settings_path: Some(path),
            timeout_ms: None,
        })
        .await
        .unwrap();
        assert_eq!(ctx.options.request_timeout, Some(Duration::from_millis(750)));
    }

    #[tokio::test]
    async fn test_flag_overrides_settings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        FileConfigStore::new(&path)
            .save(&Settings {
                gcl_path: None,
                request_timeout_ms: Some(750),
            })
            .await
            .unwrap();

        let ctx = bootstrap(CliConfig {
            settings_path: Some(path.clone()),
            timeout_ms: Some(20),
        })
        .await
        .unwrap();
        assert_eq!(ctx.options.request_timeout, Some(Duration::from_millis(20)));

        let ctx = bootstrap(CliConfig {
            settings_path: Some(path),
            timeout_ms: Some(0),
        })
        .await
        .unwrap();
        assert_eq!(ctx.options.request_timeout, None);
    }

    #[tokio::test]
    async fn test_corrupt_settings_file_means_no_timeout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ \"request_timeout_ms\": ").unwrap();

        let ctx = bootstrap(CliConfig {
            settings_path: Some(path.clone()),
            timeout_ms: None,
        })
        .await
        .unwrap();
        assert_eq!(ctx.options.request_timeout, None);
        // Nothing is rewritten while bootstrapping
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{ \"request_timeout_ms\": "
        );
    }

    #[tokio::test]
    async fn test_missing_settings_file_means_no_timeout() {
        let dir = tempdir().unwrap();
        let ctx = bootstrap(CliConfig {
            settings_path: Some(dir.path().join(SETTINGS_FILE)),
            timeout_ms: None,
        })
        .await
        .unwrap();
        assert_eq!(ctx.options.request_timeout, None);
        assert_eq!(ctx.store.path(), dir.path().join(SETTINGS_FILE));
    }
}
