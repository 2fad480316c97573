//! HTTP capability used by every network-facing component.
//!
//! Components take a `&dyn HttpClient` and never construct clients
//! themselves; a [`Session`] owns the pooled client for one logical operation.

use crate::config::HttpConfig;
use crate::error::MangaError;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// A fully read HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response from a status and body.
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Minimal GET capability shared across concurrent fetches.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Fetches `url` and reads the whole body.
    async fn get(&self, url: &str) -> Result<HttpResponse, MangaError>;
}

/// `HttpClient` backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Builds a client with the configured user agent and timeout.
    pub fn new(config: &HttpConfig) -> Result<Self, MangaError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, MangaError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(url, %status, bytes = body.len(), "response");

        Ok(HttpResponse { status, body })
    }
}

/// One HTTP client for the lifetime of a manga or chapter download.
///
/// The client is released exactly once, when the session is dropped.
#[derive(Debug)]
pub struct Session {
    client: ReqwestClient,
}

impl Session {
    /// Opens a session with a freshly built client.
    pub fn open(config: &HttpConfig) -> Result<Self, MangaError> {
        debug!("opening HTTP session");
        Ok(Self {
            client: ReqwestClient::new(config)?,
        })
    }

    /// The client handle to pass to locators and downloaders.
    pub fn client(&self) -> &dyn HttpClient {
        &self.client
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        debug!("closing HTTP session");
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory client serving canned responses by URL.
    ///
    /// Unknown URLs answer 404. Tracks how many requests were unresolved at
    /// the same time.
    #[derive(Default)]
    pub struct FakeClient {
        responses: HashMap<String, HttpResponse>,
        delay: Option<Duration>,
        url_delays: HashMap<String, Duration>,
        requests: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl FakeClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, status: StatusCode, body: impl Into<Bytes>) -> Self {
            self.responses
                .insert(url.to_string(), HttpResponse::new(status, body));
            self
        }

        pub fn ok(self, url: &str, body: impl Into<Bytes>) -> Self {
            self.with(url, StatusCode::OK, body)
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn with_url_delay(mut self, url: &str, delay: Duration) -> Self {
            self.url_delays.insert(url.to_string(), delay);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpClient for FakeClient {
        async fn get(&self, url: &str) -> Result<HttpResponse, MangaError> {
            self.requests.lock().unwrap().push(url.to_string());
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.url_delays.get(url).copied().or(self.delay) {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(self
                .responses
                .get(url)
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(StatusCode::NOT_FOUND, "")))
        }
    }
}
