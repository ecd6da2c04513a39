//! Runner configuration.

use std::path::{Path, PathBuf};

/// Default number of issues fetched at the same time.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Explicit configuration file; `None` looks for `crbug.toml`.
    config_path: Option<PathBuf>,
    /// Maximum issues fetched concurrently.
    concurrency: usize,
    /// Whether the browser strategy may run.
    browser: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            concurrency: DEFAULT_CONCURRENCY,
            browser: true,
        }
    }
}

impl RunnerConfig {
    /// Creates a new configuration for a run.
    #[must_use]
    pub fn new(config_path: Option<PathBuf>, concurrency: usize, browser: bool) -> Self {
        Self {
            config_path,
            concurrency: concurrency.max(1),
            browser,
        }
    }

    /// Returns the explicit configuration file, if any.
    #[must_use]
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Returns the max concurrent fetches.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns whether the browser strategy is allowed.
    #[must_use]
    pub fn browser(&self) -> bool {
        self.browser
    }
}
