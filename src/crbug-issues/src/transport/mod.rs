//! HTTP access to the tracker.
//!
//! Strategies depend on the [`Upstream`] capability rather than on a concrete
//! client so they can be exercised against recorded bodies.

mod endpoints;
mod error;

pub use endpoints::Endpoints;
pub use error::TransportError;

use crate::config::TrackerSettings;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ORIGIN, REFERER, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches raw response bodies from the tracker.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Performs a GET and returns the body text.
    async fn get_text(&self, url: &Url) -> Result<String, TransportError>;

    /// POSTs a JSON body and returns the response text.
    async fn post_json(
        &self,
        url: &Url,
        body: &Value,
        referer: Option<&Url>,
    ) -> Result<String, TransportError>;
}

/// [`Upstream`] backed by a `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    http: reqwest::Client,
    origin: Option<HeaderValue>,
}

impl HttpUpstream {
    /// Builds a client with the configured user agent and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the headers are invalid or the client
    /// cannot be constructed.
    pub fn new(settings: &TrackerSettings) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&settings.user_agent)
                .map_err(|_| TransportError::InvalidHeader { header: "user-agent" })?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.request_timeout_secs.max(1)))
            .build()
            .map_err(TransportError::Client)?;

        let origin = Url::parse(&settings.base_url)
            .ok()
            .and_then(|url| HeaderValue::from_str(&url.origin().ascii_serialization()).ok());

        Ok(Self { http, origin })
    }

    async fn send(
        &self,
        url: &Url,
        request: reqwest::RequestBuilder,
    ) -> Result<String, TransportError> {
        let response = request.send().await.map_err(|source| TransportError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "Tracker response");
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| TransportError::Body {
            url: url.to_string(),
            source,
        })
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn get_text(&self, url: &Url) -> Result<String, TransportError> {
        self.send(url, self.http.get(url.clone())).await
    }

    async fn post_json(
        &self,
        url: &Url,
        body: &Value,
        referer: Option<&Url>,
    ) -> Result<String, TransportError> {
        let mut request = self
            .http
            .post(url.clone())
            .json(body);
        if let Some(origin) = &self.origin {
            request = request.header(ORIGIN, origin.clone());
        }
        if let Some(referer) = referer {
            request = request.header(REFERER, referer.as_str());
        }
        self.send(url, request).await
    }
}
