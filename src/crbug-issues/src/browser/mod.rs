//! Browser automation capability.
//!
//! The engine needs only "navigate, wait, then read the DOM", expressed by
//! [`AutomationSession`]. Sessions are exclusive and must be released on
//! every exit path; [`SessionGuard`] enforces this.

mod driver;
mod error;

pub use driver::{DriverAutomation, DriverSession};
pub use error::BrowserError;

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Opens automation sessions.
#[async_trait]
pub trait BrowserAutomation: Send + Sync {
    /// Starts a fresh, exclusive session (one headless browser).
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, BrowserError>;
}

/// One live browser session.
#[async_trait]
pub trait AutomationSession: Send {
    /// Navigates and waits for the page to settle, bounded by `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Text of the first element matching `selector`, if any.
    async fn query_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Text of every element matching `selector`, in document order.
    async fn query_all_text(&mut self, selector: &str) -> Result<Vec<String>, BrowserError>;

    /// Rendered text of the whole page.
    async fn page_text(&mut self) -> Result<String, BrowserError>;

    /// Shuts the session down gracefully.
    async fn close(&mut self) -> Result<(), BrowserError>;

    /// Tears the session down without waiting. Used when a guard is dropped
    /// before it was released.
    fn abort(&mut self) {}
}

/// Scoped ownership of an [`AutomationSession`].
///
/// Call [`SessionGuard::release`] when done. If the guard is dropped instead
/// (early return, panic, cancelled future) the session is aborted.
pub struct SessionGuard {
    session: Box<dyn AutomationSession>,
    released: bool,
}

impl SessionGuard {
    /// Opens a session from `automation`.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if the session cannot be started.
    pub async fn acquire(automation: &dyn BrowserAutomation) -> Result<Self, BrowserError> {
        let session = automation.open_session().await?;
        debug!("Browser session acquired");
        Ok(Self {
            session,
            released: false,
        })
    }

    /// The guarded session.
    pub fn session(&mut self) -> &mut dyn AutomationSession {
        self.session.as_mut()
    }

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns [`BrowserError`] if the graceful shutdown failed; the session
    /// is aborted in that case.
    pub async fn release(mut self) -> Result<(), BrowserError> {
        self.released = true;
        let result = self.session.close().await;
        if result.is_err() {
            self.session.abort();
        }
        debug!("Browser session released");
        result
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if !self.released {
            warn!("Browser session dropped without release, aborting");
            self.session.abort();
        }
    }
}
