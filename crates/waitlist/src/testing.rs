//! Scripted in-memory transport.
//!
//! Available to this crate's tests and, with the `testing` feature, to
//! hosts that want to exercise their waitlist widgets without a backend.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::TransportError;
use crate::transport::{TransportResponse, WaitlistTransport};

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<serde_json::Value>,
    pub bearer: Option<String>,
}

enum Scripted {
    Reply {
        response: TransportResponse,
        gate: Option<Arc<Notify>>,
    },
    Fail(TransportError),
}

/// Transport that replays queued responses in order and records every call.
///
/// Calls made with an empty queue fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON response.
    pub fn push_json(&self, status: u16, body: serde_json::Value) {
        self.push_text(status, &body.to_string());
    }

    /// Queue a raw text response.
    pub fn push_text(&self, status: u16, body: &str) {
        self.push(Scripted::Reply {
            response: TransportResponse {
                status,
                body: body.to_string(),
            },
            gate: None,
        });
    }

    /// Queue a JSON response that is held back until the returned handle
    /// is notified.
    #[must_use]
    pub fn push_gated_json(&self, status: u16, body: &serde_json::Value) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.push(Scripted::Reply {
            response: TransportResponse {
                status,
                body: body.to_string(),
            },
            gate: Some(Arc::clone(&gate)),
        });
        gate
    }

    /// Queue a transport failure.
    pub fn push_error(&self, error: TransportError) {
        self.push(Scripted::Fail(error));
    }

    /// Every call made so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, scripted: Scripted) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(scripted);
    }

    async fn respond(&self, call: RecordedCall) -> Result<TransportResponse, TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);

        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        match next {
            Some(Scripted::Reply { response, gate }) => {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                Ok(response)
            }
            Some(Scripted::Fail(error)) => Err(error),
            None => Err(TransportError::Http("no scripted response".to_string())),
        }
    }
}

#[async_trait]
impl WaitlistTransport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        self.respond(RecordedCall {
            method: "POST",
            url: url.to_string(),
            body: Some(body.clone()),
            bearer: bearer.map(String::from),
        })
        .await
    }

    async fn get(
        &self,
        url: &str,
        bearer: Option<&str>,
    ) -> Result<TransportResponse, TransportError> {
        self.respond(RecordedCall {
            method: "GET",
            url: url.to_string(),
            body: None,
            bearer: bearer.map(String::from),
        })
        .await
    }
}
