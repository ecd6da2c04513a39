//! Runner error types.

/// Errors that can occur while setting up a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Configuration loading and validation errors.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// HTTP client initialization errors.
    #[error(transparent)]
    Transport(#[from] crate::transport::TransportError),
}
