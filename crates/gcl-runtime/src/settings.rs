//! Persistent settings and the file-backed configuration store.
//!
//! Settings live in `settings.json` under the data root:
//! `$GCL_LINK_DATA_DIR` when set, otherwise `<platform data dir>/gcl-link`.

use async_trait::async_trait;
use gcl_core::{ConfigError, ConfigStore, ConnectOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "GCL_LINK_DATA_DIR";

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "gcl-link";

/// File name of the settings document inside the data root.
pub const SETTINGS_FILE: &str = "settings.json";

/// User settings.
///
/// All fields are optional so partial files load with defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Configured gcl executable. Empty or `"."` means "search for it".
    pub gcl_path: Option<String>,

    /// Response deadline for requests, in milliseconds.
    pub request_timeout_ms: Option<u64>,
}

impl Settings {
    /// Connection options derived from these settings.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::default();
        if let Some(ms) = self.request_timeout_ms.filter(|ms| *ms > 0) {
            options = options.with_request_timeout(Duration::from_millis(ms));
        }
        options
    }
}

/// Resolve the data root from the environment.
pub fn data_root() -> Result<PathBuf, ConfigError> {
    data_root_from(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from), dirs::data_dir())
}

/// Resolve the data root from an explicit override and platform directory.
pub fn data_root_from(
    override_dir: Option<PathBuf>,
    platform_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir.filter(|dir| !dir.as_os_str().is_empty()) {
        return Ok(dir);
    }
    platform_dir
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or(ConfigError::NoDataDir)
}

fn io_error(path: &Path, e: &std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}

/// [`ConfigStore`] backed by a JSON settings file.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    /// Use the settings file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `settings.json` under the resolved data root.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(data_root()?.join(SETTINGS_FILE)))
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the settings file. A missing file yields defaults.
    pub async fn load(&self) -> Result<Settings, ConfigError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No settings file, using defaults");
                return Ok(Settings::default());
            }
            Err(e) => return Err(io_error(&self.path, &e)),
        };

        serde_json::from_slice(&contents).map_err(|e| ConfigError::Invalid {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Write the settings file, creating its directory if needed.
    pub async fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, &e))?;
        }

        let mut contents = serde_json::to_vec_pretty(settings).map_err(|e| ConfigError::Invalid {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        contents.push(b'\n');
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| io_error(&self.path, &e))?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get_path(&self) -> Option<String> {
        match self.load().await {
            Ok(settings) => settings.gcl_path,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable settings");
                None
            }
        }
    }

    async fn set_path(&self, path: &str) -> Result<(), ConfigError> {
        let mut settings = self.load().await?;
        settings.gcl_path = Some(path.to_string());
        self.save(&settings).await
    }
}
