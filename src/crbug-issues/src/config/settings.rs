//! Setting sections of the configuration file.

use serde::Deserialize;
use std::time::Duration;

/// `[tracker]` section: where and how to reach the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TrackerSettings {
    /// Tracker root URL.
    pub base_url: String,

    /// Tracker instance id sent with every structured request.
    pub tracker_id: String,

    /// Timeout applied to each HTTP request.
    pub request_timeout_secs: u64,

    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            base_url: "https://issues.chromium.org".to_string(),
            tracker_id: "157".to_string(),
            request_timeout_secs: 30,
            user_agent: concat!("crbug-issues/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// `[browser]` section: the automation driver used as last resort.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BrowserSettings {
    /// Whether the browser strategy runs at all.
    pub enabled: bool,

    /// Driver executable speaking the JSON line protocol.
    pub driver_command: String,

    /// Extra arguments for the driver.
    pub driver_args: Vec<String>,

    /// Upper bound for page navigation.
    pub navigation_timeout_secs: u64,

    /// Fixed wait after navigation before extraction starts.
    pub settle_delay_ms: u64,

    /// Upper bound for every other driver command.
    pub command_timeout_secs: u64,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            driver_command: "crbug-browser-driver".to_string(),
            driver_args: Vec::new(),
            navigation_timeout_secs: 30,
            settle_delay_ms: 2_000,
            command_timeout_secs: 10,
        }
    }
}

impl BrowserSettings {
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
