//! Upstream transport trait and implementations.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::error::FetchError;

/// Fetches raw document bytes from upstream.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Get the transport name.
    fn name(&self) -> &str;

    /// GET `url` and return the body of a successful response.
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed transport.
///
/// Each request, body included, is bounded by `timeout`; when it elapses the
/// in-flight request is dropped.
pub struct HttpTransport {
    client: Client,
    timeout: Duration,
    /// `timeout` in milliseconds for errors, saturating at `u64::MAX`.
    timeout_ms: u64,
}

impl HttpTransport {
    /// Create a transport that sends `user_agent` on every request.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Request {
                url: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            timeout,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }

    async fn send(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let request = self.client.get(url).build().map_err(|e| FetchError::Request {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| FetchError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(body.to_vec())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let body = tokio::time::timeout(self.timeout, self.send(url))
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: self.timeout_ms,
            })??;

        debug!(url, bytes = body.len(), "Received upstream body");
        Ok(body)
    }
}

/// Canned upstream behaviour for [`MockTransport`].
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// 200 with this body.
    Body(Vec<u8>),
    /// Non-success status.
    Status(u16),
    /// The request times out.
    Timeout,
}

/// Mock transport for testing.
///
/// URLs without a registered response answer 404. Every call is counted,
/// whatever its outcome.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockTransport {
    responses: dashmap::DashMap<String, MockResponse>,
    requests: dashmap::DashMap<String, usize>,
    delay: Option<Duration>,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockTransport {
    /// Create a new mock transport.
    pub fn new() -> Self {
        Self {
            responses: dashmap::DashMap::new(),
            requests: dashmap::DashMap::new(),
            delay: None,
        }
    }

    /// Delay every response, to let concurrent callers overlap.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Set the response for a URL.
    pub fn respond(&self, url: impl Into<String>, response: MockResponse) {
        self.responses.insert(url.into(), response);
    }

    /// Respond to a URL with a UTF-8 body.
    pub fn respond_body(&self, url: impl Into<String>, body: &str) {
        self.respond(url, MockResponse::Body(body.as_bytes().to_vec()));
    }

    /// Number of requests made for a URL.
    pub fn requests(&self, url: &str) -> usize {
        self.requests.get(url).map(|n| *n).unwrap_or(0)
    }

    /// Number of requests made for any URL.
    pub fn total_requests(&self) -> usize {
        self.requests.iter().map(|n| *n.value()).sum()
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        *self.requests.entry(url.to_string()).or_insert(0) += 1;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .get(url)
            .map(|r| r.clone())
            .unwrap_or(MockResponse::Status(404));

        match response {
            MockResponse::Body(body) => Ok(body),
            MockResponse::Status(status) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            MockResponse::Timeout => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: 0,
            }),
        }
    }
}
