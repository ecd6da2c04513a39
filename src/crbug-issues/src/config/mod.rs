//! Configuration loading.
//!
//! Settings come from an optional `crbug.toml`, then environment overrides:
//! ```toml
//! [tracker]
//! base-url = "https://issues.chromium.org"
//! tracker-id = "157"
//!
//! [browser]
//! driver-command = "crbug-browser-driver"
//! settle-delay-ms = 2000
//! ```

mod error;
mod settings;

pub use error::ConfigError;
pub use settings::{BrowserSettings, TrackerSettings};

use crate::transport::Endpoints;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "crbug.toml";

/// Overrides `[tracker] base-url`.
pub const BASE_URL_ENV: &str = "CRBUG_BASE_URL";

/// Overrides `[browser] driver-command` and enables the browser strategy.
pub const BROWSER_DRIVER_ENV: &str = "CRBUG_BROWSER_DRIVER";

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub tracker: TrackerSettings,
    pub browser: BrowserSettings,
}

impl TrackerConfig {
    /// Loads configuration, applies environment overrides and validates it.
    ///
    /// With `path` set the file must exist; without it [`DEFAULT_CONFIG_FILE`]
    /// is used when present and built-in defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// setting is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if path.exists() {
            Self::from_file(path)?
        } else if required {
            return Err(ConfigError::MissingFile {
                path: path.display().to_string(),
            });
        } else {
            debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate(&path.display().to_string())?;
        Ok(config)
    }

    /// Parses a configuration file without overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(path = %path.display(), "Loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies environment variable overrides.
    ///
    /// Environment variables take precedence over the config file.
    pub fn apply_env_overrides(&mut self) {
        if let Some(base_url) = non_empty_env(BASE_URL_ENV) {
            self.tracker.base_url = base_url;
        }
        if let Some(driver) = non_empty_env(BROWSER_DRIVER_ENV) {
            self.browser.driver_command = driver;
            self.browser.enabled = true;
        }
    }

    /// Validates every setting.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first problem.
    pub fn validate(&self, path: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::ValidationError {
            path: path.to_string(),
            message,
        };

        if Endpoints::new(&self.tracker.base_url, self.tracker.tracker_id.clone()).is_err() {
            return Err(invalid(format!(
                "base-url is not a valid http(s) URL: {}",
                self.tracker.base_url
            )));
        }
        if self.tracker.tracker_id.trim().is_empty() {
            return Err(invalid("tracker-id must not be empty".to_string()));
        }
        if self.tracker.request_timeout_secs == 0 {
            return Err(invalid("request-timeout-secs must be positive".to_string()));
        }
        if self.browser.enabled {
            if self.browser.driver_command.trim().is_empty() {
                return Err(invalid("driver-command must not be empty".to_string()));
            }
            if self.browser.navigation_timeout_secs == 0 || self.browser.command_timeout_secs == 0
            {
                return Err(invalid("browser timeouts must be positive".to_string()));
            }
        }
        Ok(())
    }

    /// Builds the tracker endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if the base URL is invalid.
    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        Endpoints::new(&self.tracker.base_url, self.tracker.tracker_id.clone()).map_err(|e| {
            ConfigError::ValidationError {
                path: "tracker.base-url".to_string(),
                message: e.to_string(),
            }
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
