//! In-memory fakes for the transport and browser capabilities.

use crate::browser::{AutomationSession, BrowserAutomation, BrowserError};
use crate::transport::{TransportError, Upstream};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// Answers requests by URL path; unknown paths get HTTP 404.
#[derive(Default)]
pub struct FakeUpstream {
    bodies: HashMap<String, String>,
    failing: HashMap<String, u16>,
    pub requests: Mutex<Vec<String>>,
    pub posted: Mutex<Vec<Value>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, path: &str, body: &str) -> Self {
        self.bodies.insert(path.to_string(), body.to_string());
        self
    }

    pub fn with_status(mut self, path: &str, status: u16) -> Self {
        self.failing.insert(path.to_string(), status);
        self
    }

    pub fn requested_paths(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &Url) -> Result<String, TransportError> {
        let path = url.path().to_string();
        self.requests.lock().unwrap().push(path.clone());
        if let Some(status) = self.failing.get(&path) {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: *status,
            });
        }
        self.bodies
            .get(&path)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: 404,
            })
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        self.answer(url)
    }

    async fn post_json(
        &self,
        url: &Url,
        body: &Value,
        _referer: Option<&Url>,
    ) -> Result<String, TransportError> {
        self.posted.lock().unwrap().push(body.clone());
        self.answer(url)
    }
}

/// What a scripted browser session returns.
#[derive(Clone, Default)]
pub struct PageScript {
    pub texts: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
    pub page_text: String,
    pub navigation_times_out: bool,
    pub navigation_fails: bool,
}

#[derive(Default)]
pub struct SessionCounters {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
    pub aborted: AtomicUsize,
}

impl SessionCounters {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Opens sessions that replay a [`PageScript`].
pub struct ScriptedAutomation {
    script: PageScript,
    pub counters: Arc<SessionCounters>,
    pub fail_to_open: bool,
}

impl ScriptedAutomation {
    pub fn new(script: PageScript) -> Self {
        Self {
            script,
            counters: Arc::default(),
            fail_to_open: false,
        }
    }
}

#[async_trait]
impl BrowserAutomation for ScriptedAutomation {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, BrowserError> {
        if self.fail_to_open {
            return Err(BrowserError::DriverExited);
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct ScriptedSession {
    script: PageScript,
    counters: Arc<SessionCounters>,
}

#[async_trait]
impl AutomationSession for ScriptedSession {
    async fn navigate(&mut self, _url: &str, timeout: Duration) -> Result<(), BrowserError> {
        if self.script.navigation_fails {
            return Err(BrowserError::Driver {
                op: "navigate",
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        if self.script.navigation_times_out {
            return Err(BrowserError::Timeout {
                op: "navigate",
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    async fn query_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.script.texts.get(selector).cloned())
    }

    async fn query_all_text(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        Ok(self.script.lists.get(selector).cloned().unwrap_or_default())
    }

    async fn page_text(&mut self) -> Result<String, BrowserError> {
        Ok(self.script.page_text.clone())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn abort(&mut self) {
        self.counters.aborted.fetch_add(1, Ordering::SeqCst);
    }
}
