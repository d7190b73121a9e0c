//! Wire types for the waitlist service.
//!
//! These mirror the service's JSON contract (camelCase field names) and are
//! not owned by this crate.

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Join / Leave
// =============================================================================

/// Body of `POST /api/v1/join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistRequest {
    pub email: String,
    pub variant_id: String,
    pub product_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,
    pub shop: String,
}

/// Response of `POST /api/v1/join`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinWaitlistResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/v1/leave`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveWaitlistRequest {
    pub email: String,
    pub variant_id: String,
    pub shop: String,
}

/// Response of `POST /api/v1/leave`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveWaitlistResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Common view over join and leave responses.
pub trait WaitlistReply {
    /// Whether the service accepted the request.
    fn success(&self) -> bool;
    /// Server-supplied failure reason.
    fn error(&self) -> Option<&str>;
    /// Server-supplied confirmation text.
    fn message(&self) -> Option<&str>;
}

impl WaitlistReply for JoinWaitlistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl WaitlistReply for LeaveWaitlistResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// A response the service actually sent, with its HTTP status.
///
/// `body` is `None` when a non-success status carried something other than
/// the expected JSON (an HTML error page from a proxy, for instance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply<R> {
    pub status: u16,
    pub body: Option<R>,
}

impl<R: WaitlistReply> Reply<R> {
    /// True for a 2xx status whose body reports success.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        (200..300).contains(&self.status) && self.body.as_ref().is_some_and(R::success)
    }
}

// =============================================================================
// Count
// =============================================================================

/// Response of `GET /api/v1/count/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistCountResponse {
    /// Numeric variant ID. Accepted as either a JSON string or number.
    #[serde(deserialize_with = "string_or_number")]
    pub variant_id: String,
    pub count: u64,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}
