//! Restock Waitlist - Back-in-stock waitlist client.
//!
//! Talks to the remote waitlist service on behalf of a storefront "notify
//! me" widget:
//! - [`WaitlistSession`] - join/leave state machine for one variant
//! - [`CountTracker`] - how many shoppers are waiting, cached per shop
//! - [`WaitlistClient`] - typed requests over a pluggable transport
//!
//! # Architecture
//!
//! HTTP goes through the [`WaitlistTransport`] trait. [`HttpTransport`] is
//! the `reqwest` implementation; tests and hosts without a network use
//! `testing::MockTransport` (feature `testing`). Counts are shared between
//! widgets through a [`CountCache`] the host owns.
//!
//! # Example
//!
//! ```rust,ignore
//! use restock_waitlist::{WaitlistClient, WaitlistConfig, WaitlistSession, WaitlistTarget};
//!
//! let config = WaitlistConfig::from_env()?;
//! let client = WaitlistClient::new(config);
//! let session = WaitlistSession::new(client, WaitlistTarget::from(&variant));
//!
//! let outcome = session.join("shopper@example.com").await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod client;
pub mod config;
pub mod count;
pub mod error;
pub mod messages;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod types;

pub use cache::{CacheEntry, CacheKey, Clock, CountCache, ManualClock, SystemClock};
pub use client::WaitlistClient;
pub use config::{ConfigError, WaitlistConfig};
pub use count::{CountState, CountTracker};
pub use error::{CountError, ErrorKind, RequestError, TransportError};
pub use messages::WaitlistMessages;
pub use session::{
    WaitlistCallbacks, WaitlistFailure, WaitlistOutcome, WaitlistSession, WaitlistState,
    WaitlistTarget,
};
pub use transport::{HttpTransport, TransportResponse, WaitlistTransport};
pub use types::{
    JoinWaitlistRequest, JoinWaitlistResponse, LeaveWaitlistRequest, LeaveWaitlistResponse,
    Reply, WaitlistCountResponse, WaitlistReply,
};
