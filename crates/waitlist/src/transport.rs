//! HTTP transport for the waitlist service.
//!
//! [`WaitlistTransport`] is the seam between request policy (what to send,
//! how to read the answer) and the wire. [`HttpTransport`] is the `reqwest`
//! implementation; tests substitute a scripted transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{instrument, warn};

use crate::error::TransportError;

/// Raw status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text. Empty when an error status carried a body
    /// that could not be read.
    pub body: String,
}

impl TransportResponse {
    /// True for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends waitlist requests.
///
/// Implementations perform exactly one attempt per call: no retries, no
/// backoff. `bearer` is attached as `Authorization: Bearer <token>` when
/// present and omitted otherwise.
#[async_trait]
pub trait WaitlistTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError>;

    async fn get(&self, url: &str, bearer: Option<&str>)
    -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with no request timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Create a transport that gives up after `timeout`.
    ///
    /// Pass [`crate::config::REQUEST_TIMEOUT`] for the recommended value.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn send(
        request: reqwest::RequestBuilder,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        let request = match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        // The status alone classifies an error reply; a broken body must not hide it.
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if !status.is_success() => {
                warn!(status = status.as_u16(), error = %e, "Failed to read error response body");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl WaitlistTransport for HttpTransport {
    #[instrument(skip(self, body, bearer), fields(url = %url))]
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        Self::send(self.client.post(url).json(body), bearer).await
    }

    #[instrument(skip(self, bearer), fields(url = %url))]
    async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        Self::send(self.client.get(url), bearer).await
    }
}
