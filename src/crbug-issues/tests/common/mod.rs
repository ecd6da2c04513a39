#![allow(dead_code)]

use async_trait::async_trait;
use crbug_issues::browser::{AutomationSession, BrowserAutomation, BrowserError};
use crbug_issues::{Endpoints, TransportError, Upstream};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/tracker")
}

pub fn fixture(name: &str) -> String {
    std::fs::read_to_string(fixtures_root().join(name)).unwrap()
}

pub fn endpoints() -> Endpoints {
    Endpoints::new("https://issues.chromium.org", "157").unwrap()
}

/// Serves bodies by URL path; everything else answers with `default_status`.
pub struct RecordedUpstream {
    bodies: HashMap<String, String>,
    default_status: u16,
    requests: Mutex<Vec<String>>,
}

impl RecordedUpstream {
    pub fn new(default_status: u16) -> Self {
        Self {
            bodies: HashMap::new(),
            default_status,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn serve(mut self, path: &str, fixture_name: &str) -> Self {
        self.bodies.insert(path.to_string(), fixture(fixture_name));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, url: &Url) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(url.path().to_string());
        self.bodies
            .get(url.path())
            .cloned()
            .ok_or_else(|| TransportError::Status {
                url: url.to_string(),
                status: self.default_status,
            })
    }
}

#[async_trait]
impl Upstream for RecordedUpstream {
    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        self.answer(url)
    }

    async fn post_json(
        &self,
        url: &Url,
        _body: &Value,
        _referer: Option<&Url>,
    ) -> Result<String, TransportError> {
        self.answer(url)
    }
}

/// Browser whose pages render fixed selector texts.
#[derive(Default)]
pub struct StaticBrowser {
    pub texts: HashMap<String, String>,
    pub lists: HashMap<String, Vec<String>>,
    pub page_text: String,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub visited: Arc<Mutex<Vec<String>>>,
}

impl StaticBrowser {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserAutomation for StaticBrowser {
    async fn open_session(&self) -> Result<Box<dyn AutomationSession>, BrowserError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StaticSession {
            texts: self.texts.clone(),
            lists: self.lists.clone(),
            page_text: self.page_text.clone(),
            closed: Arc::clone(&self.closed),
            visited: Arc::clone(&self.visited),
        }))
    }
}

struct StaticSession {
    texts: HashMap<String, String>,
    lists: HashMap<String, Vec<String>>,
    page_text: String,
    closed: Arc<AtomicUsize>,
    visited: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl AutomationSession for StaticSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn query_text(&mut self, selector: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.texts.get(selector).cloned())
    }

    async fn query_all_text(&mut self, selector: &str) -> Result<Vec<String>, BrowserError> {
        Ok(self.lists.get(selector).cloned().unwrap_or_default())
    }

    async fn page_text(&mut self) -> Result<String, BrowserError> {
        Ok(self.page_text.clone())
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
