//! Waitlist service client.
//!
//! Sends join, leave and count requests and turns raw HTTP responses into
//! typed results. Deciding what a rejection means for the shopper is left to
//! [`crate::WaitlistSession`] and [`crate::CountTracker`].

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::WaitlistConfig;
use crate::error::{CountError, RequestError};
use crate::messages::WaitlistMessages;
use crate::transport::{HttpTransport, TransportResponse, WaitlistTransport};
use crate::types::{
    JoinWaitlistRequest, JoinWaitlistResponse, LeaveWaitlistRequest, LeaveWaitlistResponse,
    Reply, WaitlistCountResponse,
};

const TOO_MANY_REQUESTS: u16 = 429;
const NOT_FOUND: u16 = 404;

/// Client for the remote waitlist service.
///
/// Cheap to clone; clones share configuration and transport.
#[derive(Clone)]
pub struct WaitlistClient {
    inner: Arc<WaitlistClientInner>,
}

struct WaitlistClientInner {
    config: WaitlistConfig,
    transport: Arc<dyn WaitlistTransport>,
    messages: WaitlistMessages,
}

impl std::fmt::Debug for WaitlistClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitlistClient")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl WaitlistClient {
    /// Create a client that talks HTTP via `reqwest`.
    #[must_use]
    pub fn new(config: WaitlistConfig) -> Self {
        Self::with_transport(config, Arc::new(HttpTransport::new()))
    }

    /// Create a client over a custom transport.
    #[must_use]
    pub fn with_transport(config: WaitlistConfig, transport: Arc<dyn WaitlistTransport>) -> Self {
        Self::with_parts(config, transport, WaitlistMessages::default())
    }

    /// Create a client with custom transport and shopper-facing messages.
    #[must_use]
    pub fn with_parts(
        config: WaitlistConfig,
        transport: Arc<dyn WaitlistTransport>,
        messages: WaitlistMessages,
    ) -> Self {
        Self {
            inner: Arc::new(WaitlistClientInner {
                config,
                transport,
                messages,
            }),
        }
    }

    /// Configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &WaitlistConfig {
        &self.inner.config
    }

    /// Messages used when reporting outcomes.
    #[must_use]
    pub fn messages(&self) -> &WaitlistMessages {
        &self.inner.messages
    }

    fn bearer(&self) -> Option<&str> {
        self.inner
            .config
            .api_key()
            .map(|key| key.expose_secret())
    }

    /// Add an email to a variant's waitlist.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::RateLimited` on 429, `RequestError::Transport`
    /// if no response arrived and `RequestError::Parse` if a success status
    /// carried malformed JSON.
    #[instrument(skip(self, request), fields(variant_id = %request.variant_id))]
    pub async fn join(
        &self,
        request: &JoinWaitlistRequest,
    ) -> Result<Reply<JoinWaitlistResponse>, RequestError> {
        let url = self.inner.config.join_url();
        self.post(&url, request).await
    }

    /// Remove an email from a variant's waitlist.
    ///
    /// # Errors
    ///
    /// Same as [`Self::join`].
    #[instrument(skip(self, request), fields(variant_id = %request.variant_id))]
    pub async fn leave(
        &self,
        request: &LeaveWaitlistRequest,
    ) -> Result<Reply<LeaveWaitlistResponse>, RequestError> {
        let url = self.inner.config.leave_url();
        self.post(&url, request).await
    }

    async fn post<B, R>(&self, url: &str, body: &B) -> Result<Reply<R>, RequestError>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let body = serde_json::to_value(body)?;
        let response = self
            .inner
            .transport
            .post_json(url, &body, self.bearer())
            .await?;

        decode_reply(response)
    }

    /// Fetch the number of shoppers waiting on a variant.
    ///
    /// A 404 means the variant has no waitlist yet and counts as zero.
    ///
    /// # Errors
    ///
    /// Returns `CountError::Status` for any other non-success status,
    /// `CountError::Transport` if no response arrived and
    /// `CountError::Parse` for a malformed body.
    #[instrument(skip(self))]
    pub async fn fetch_count(&self, numeric_variant_id: &str) -> Result<u64, CountError> {
        let url = self.inner.config.count_url(numeric_variant_id);
        let response = self.inner.transport.get(&url, self.bearer()).await?;

        if response.status == NOT_FOUND {
            debug!("No waitlist for variant yet");
            return Ok(0);
        }

        if !response.is_success() {
            warn!(status = response.status, "Waitlist count request failed");
            return Err(CountError::Status(response.status));
        }

        let parsed: WaitlistCountResponse = serde_json::from_str(&response.body)?;
        Ok(parsed.count)
    }
}

/// Map a raw join/leave response to a [`Reply`].
///
/// 429 wins over whatever the body says. A malformed body is only an error
/// when the status claims success; otherwise the reply is kept without body.
fn decode_reply<R: DeserializeOwned>(response: TransportResponse) -> Result<Reply<R>, RequestError> {
    if response.status == TOO_MANY_REQUESTS {
        warn!("Waitlist service rate limited the request");
        return Err(RequestError::RateLimited);
    }

    match serde_json::from_str::<R>(&response.body) {
        Ok(body) => Ok(Reply {
            status: response.status,
            body: Some(body),
        }),
        Err(e) if response.is_success() => {
            warn!(
                error = %e,
                body = %response.body.chars().take(200).collect::<String>(),
                "Failed to parse waitlist response"
            );
            Err(RequestError::Parse(e))
        }
        Err(_) => {
            warn!(
                status = response.status,
                body = %response.body.chars().take(200).collect::<String>(),
                "Waitlist service returned non-JSON error"
            );
            Ok(Reply {
                status: response.status,
                body: None,
            })
        }
    }
}
