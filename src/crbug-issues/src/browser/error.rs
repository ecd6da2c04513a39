//! Browser automation error types.

use thiserror::Error;

/// Errors raised by an automation session.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// The driver process could not be started.
    #[error("Failed to launch browser driver '{command}': {source}")]
    Launch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the driver failed.
    #[error("Browser driver I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The driver sent something that is not a protocol message.
    #[error("Browser driver protocol error: {0}")]
    Protocol(#[from] serde_json::Error),

    /// The driver exited while a command was pending.
    #[error("Browser driver exited unexpectedly")]
    DriverExited,

    /// The driver reported a failed command.
    #[error("Browser driver '{op}' failed: {message}")]
    Driver { op: &'static str, message: String },

    /// A command did not complete in time.
    #[error("Browser driver '{op}' timed out after {timeout_ms} ms")]
    Timeout { op: &'static str, timeout_ms: u64 },
}

impl BrowserError {
    /// Returns true for timeouts, after which extraction may still proceed.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
