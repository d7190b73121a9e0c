//! Join/leave state machine for one "notify me" widget.
//!
//! ```text
//! idle ──join──▶ joining ──▶ joined | idle + error
//! joined ─leave─▶ leaving ──▶ idle | joined + error
//! ```
//!
//! Every call is stamped with a generation number. Only the most recently
//! issued call (or [`WaitlistSession::reset`]) may write state, so a slow
//! response that settles after a newer call or a reset is discarded.

use std::fmt;
use std::future::Future;
use std::sync::{PoisonError, RwLock};

use restock_core::{Email, normalize_email};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::client::WaitlistClient;
use crate::error::{ErrorKind, RequestError};
use crate::types::{
    JoinWaitlistRequest, JoinWaitlistResponse, LeaveWaitlistRequest, LeaveWaitlistResponse,
    Reply, WaitlistReply,
};

// =============================================================================
// Public types
// =============================================================================

/// The variant a widget collects signups for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistTarget {
    pub variant_id: String,
    pub product_id: String,
    pub product_title: Option<String>,
    pub variant_title: Option<String>,
}

impl From<&restock_core::VariantInfo> for WaitlistTarget {
    fn from(variant: &restock_core::VariantInfo) -> Self {
        Self {
            variant_id: variant.id.clone(),
            product_id: variant.product_id.clone(),
            product_title: Some(variant.product_title.clone()),
            variant_title: variant.variant_title.clone(),
        }
    }
}

/// Observable widget state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistState {
    pub email: String,
    pub is_joining: bool,
    pub is_leaving: bool,
    pub is_joined: bool,
    pub error: Option<String>,
    pub success_message: Option<String>,
}

/// A failed join or leave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitlistFailure<R> {
    pub kind: ErrorKind,
    /// Message suitable for showing to the shopper.
    pub error: String,
    /// The service's answer, when it sent one we could read.
    pub response: Option<R>,
}

impl<R> fmt::Display for WaitlistFailure<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.error)
    }
}

impl<R: fmt::Debug> std::error::Error for WaitlistFailure<R> {}

/// Result of a join or leave call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitlistOutcome<R> {
    Success(R),
    Failure(WaitlistFailure<R>),
}

impl<R> WaitlistOutcome<R> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Shopper-facing error message, if the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(failure) => Some(&failure.error),
        }
    }

    /// Convert into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the failure when the call did not succeed.
    pub fn into_result(self) -> Result<R, WaitlistFailure<R>> {
        match self {
            Self::Success(response) => Ok(response),
            Self::Failure(failure) => Err(failure),
        }
    }
}

/// Callback receiving a successful response.
pub type SuccessCallback<R> = Box<dyn Fn(&R) + Send + Sync>;

/// Callback receiving a shopper-facing error message.
pub type ErrorCallback = Box<dyn Fn(&str) + Send + Sync>;

/// Optional completion hooks, fired after state has been updated.
#[derive(Default)]
pub struct WaitlistCallbacks {
    on_join_success: Option<SuccessCallback<JoinWaitlistResponse>>,
    on_join_error: Option<ErrorCallback>,
    on_leave_success: Option<SuccessCallback<LeaveWaitlistResponse>>,
    on_leave_error: Option<ErrorCallback>,
}

impl fmt::Debug for WaitlistCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitlistCallbacks")
            .field("on_join_success", &self.on_join_success.is_some())
            .field("on_join_error", &self.on_join_error.is_some())
            .field("on_leave_success", &self.on_leave_success.is_some())
            .field("on_leave_error", &self.on_leave_error.is_some())
            .finish()
    }
}

impl WaitlistCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn on_join_success(
        mut self,
        f: impl Fn(&JoinWaitlistResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_join_success = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_join_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_join_error = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_leave_success(
        mut self,
        f: impl Fn(&LeaveWaitlistResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_leave_success = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_leave_error(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_leave_error = Some(Box::new(f));
        self
    }
}

// =============================================================================
// WaitlistSession
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Join,
    Leave,
}

impl Operation {
    fn set_in_flight(self, state: &mut WaitlistState, in_flight: bool) {
        match self {
            Self::Join => {
                state.is_joining = in_flight;
                if in_flight {
                    state.is_leaving = false;
                }
            }
            Self::Leave => {
                state.is_leaving = in_flight;
                if in_flight {
                    state.is_joining = false;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: WaitlistState,
    generation: u64,
}

/// Join/leave state for one waitlist widget.
///
/// Operations never panic or return errors: every failure becomes a
/// [`WaitlistOutcome::Failure`] and is mirrored into [`WaitlistState::error`].
#[derive(Debug)]
pub struct WaitlistSession {
    client: WaitlistClient,
    target: WaitlistTarget,
    callbacks: WaitlistCallbacks,
    inner: RwLock<Inner>,
}

impl WaitlistSession {
    #[must_use]
    pub fn new(client: WaitlistClient, target: WaitlistTarget) -> Self {
        Self::with_callbacks(client, target, WaitlistCallbacks::default())
    }

    #[must_use]
    pub fn with_callbacks(
        client: WaitlistClient,
        target: WaitlistTarget,
        callbacks: WaitlistCallbacks,
    ) -> Self {
        Self {
            client,
            target,
            callbacks,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> WaitlistState {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .state
            .clone()
    }

    /// The variant this session signs shoppers up for.
    #[must_use]
    pub const fn target(&self) -> &WaitlistTarget {
        &self.target
    }

    /// Put `email_input` on the waitlist.
    ///
    /// Invalid addresses fail immediately without touching the network.
    #[instrument(skip(self, email_input), fields(variant_id = %self.target.variant_id))]
    pub async fn join(&self, email_input: &str) -> WaitlistOutcome<JoinWaitlistResponse> {
        let target = &self.target;
        let shop = self.client.config().shop_domain().to_string();

        let (outcome, applied) = self
            .submit(Operation::Join, email_input, |email| {
                let request = JoinWaitlistRequest {
                    email,
                    variant_id: target.variant_id.clone(),
                    product_id: target.product_id.clone(),
                    product_title: target.product_title.clone(),
                    variant_title: target.variant_title.clone(),
                    shop,
                };
                async move { self.client.join(&request).await }
            })
            .await;

        if applied {
            notify(
                &outcome,
                self.callbacks.on_join_success.as_ref(),
                self.callbacks.on_join_error.as_ref(),
            );
        }
        outcome
    }

    /// Take `email_input` off the waitlist.
    #[instrument(skip(self, email_input), fields(variant_id = %self.target.variant_id))]
    pub async fn leave(&self, email_input: &str) -> WaitlistOutcome<LeaveWaitlistResponse> {
        let variant_id = self.target.variant_id.clone();
        let shop = self.client.config().shop_domain().to_string();

        let (outcome, applied) = self
            .submit(Operation::Leave, email_input, |email| {
                let request = LeaveWaitlistRequest {
                    email,
                    variant_id,
                    shop,
                };
                async move { self.client.leave(&request).await }
            })
            .await;

        if applied {
            notify(
                &outcome,
                self.callbacks.on_leave_success.as_ref(),
                self.callbacks.on_leave_error.as_ref(),
            );
        }
        outcome
    }

    /// Return to the initial idle state.
    ///
    /// Responses to calls issued before the reset are discarded when they
    /// arrive; the requests themselves are not cancelled.
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.generation += 1;
        inner.state = WaitlistState::default();
    }

    /// Shared join/leave flow. Returns the outcome and whether it was
    /// applied to state (false when a newer call or reset superseded it).
    async fn submit<R, F, Fut>(
        &self,
        op: Operation,
        email_input: &str,
        send: F,
    ) -> (WaitlistOutcome<R>, bool)
    where
        R: WaitlistReply + Clone,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Reply<R>, RequestError>>,
    {
        let messages = self.client.messages();

        let email = match Email::parse(email_input) {
            Ok(email) => {
                debug!(?op, email_domain = email.domain(), "Submitting waitlist request");
                email.into_inner()
            }
            Err(e) => {
                let failure = WaitlistFailure {
                    kind: ErrorKind::InvalidEmail,
                    error: messages.invalid_email.clone(),
                    response: None,
                };
                let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
                inner.generation += 1;
                inner.state.email = normalize_email(email_input);
                inner.state.is_joining = false;
                inner.state.is_leaving = false;
                inner.state.error = Some(failure.error.clone());
                drop(inner);
                debug!(reason = %e, "Rejected email without sending a request");
                return (WaitlistOutcome::Failure(failure), true);
            }
        };

        let generation = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.generation += 1;
            op.set_in_flight(&mut inner.state, true);
            inner.state.email.clone_from(&email);
            inner.state.error = None;
            inner.state.success_message = None;
            inner.generation
        };

        let outcome = self.interpret(op, send(email).await);

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if inner.generation != generation {
            debug!(?op, "Discarding response superseded by a newer call or reset");
            return (outcome, false);
        }

        op.set_in_flight(&mut inner.state, false);
        match &outcome {
            WaitlistOutcome::Success(response) => {
                inner.state.is_joined = op == Operation::Join;
                let default = match op {
                    Operation::Join => &messages.joined,
                    Operation::Leave => &messages.left,
                };
                inner.state.success_message =
                    Some(response.message().unwrap_or(default).to_string());
            }
            WaitlistOutcome::Failure(failure) => {
                inner.state.error = Some(failure.error.clone());
            }
        }
        (outcome, true)
    }

    /// Turn a client result into a shopper-facing outcome.
    fn interpret<R>(
        &self,
        op: Operation,
        result: Result<Reply<R>, RequestError>,
    ) -> WaitlistOutcome<R>
    where
        R: WaitlistReply + Clone,
    {
        let messages = self.client.messages();

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                let kind = e.kind();
                warn!(?op, error = %e, "Waitlist request failed");
                return WaitlistOutcome::Failure(WaitlistFailure {
                    kind,
                    error: kind.message(messages).to_string(),
                    response: None,
                });
            }
        };

        let accepted = reply.is_accepted();
        match reply.body {
            Some(body) if accepted => {
                info!(?op, "Waitlist request accepted");
                WaitlistOutcome::Success(body)
            }
            body => {
                let error = body
                    .as_ref()
                    .and_then(WaitlistReply::error)
                    .unwrap_or_else(|| ErrorKind::Unknown.message(messages))
                    .to_string();
                warn!(?op, status = reply.status, error = %error, "Waitlist request rejected");

                WaitlistOutcome::Failure(WaitlistFailure {
                    kind: ErrorKind::Unknown,
                    error,
                    response: body,
                })
            }
        }
    }
}

fn notify<R>(
    outcome: &WaitlistOutcome<R>,
    on_success: Option<&SuccessCallback<R>>,
    on_error: Option<&ErrorCallback>,
) {
    match outcome {
        WaitlistOutcome::Success(response) => {
            if let Some(f) = on_success {
                f(response);
            }
        }
        WaitlistOutcome::Failure(failure) => {
            if let Some(f) = on_error {
                f(&failure.error);
            }
        }
    }
}
