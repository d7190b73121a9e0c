//! Waitlist count for a single variant, with caching.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use restock_core::extract_numeric_id;
use tracing::{debug, instrument, warn};

use crate::cache::{CacheKey, CountCache};
use crate::client::WaitlistClient;
use crate::error::CountError;

/// Observable state of a [`CountTracker`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountState {
    pub count: u64,
    pub is_loading: bool,
    pub error: Option<String>,
}

/// Fetches and remembers how many shoppers wait on one variant.
///
/// Failures never escape: they are recorded in [`CountState::error`] and the
/// count degrades to zero so the widget can still render.
#[derive(Debug)]
pub struct CountTracker {
    client: WaitlistClient,
    cache: CountCache,
    key: CacheKey,
    max_age: Duration,
    state: RwLock<CountState>,
}

impl CountTracker {
    /// Create a tracker for `variant_id` (global or numeric ID).
    ///
    /// Counts stay fresh for the client configuration's cache duration.
    #[must_use]
    pub fn new(client: WaitlistClient, cache: CountCache, variant_id: &str) -> Self {
        let key = CacheKey::new(
            client.config().shop_domain(),
            extract_numeric_id(variant_id),
        );
        let max_age = client.config().cache_duration();
        Self {
            client,
            cache,
            key,
            max_age,
            state: RwLock::new(CountState::default()),
        }
    }

    /// Override how long a cached count is served.
    #[must_use]
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn state(&self) -> CountState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Numeric variant ID this tracker reports on.
    #[must_use]
    pub fn variant_id(&self) -> &str {
        &self.key.variant_id
    }

    /// Return the waitlist count, from cache when fresh.
    #[instrument(skip(self), fields(variant_id = %self.key.variant_id))]
    pub async fn fetch_count(&self) -> u64 {
        if let Some(count) = self.cache.get_fresh(&self.key, self.max_age).await {
            self.update(|state| {
                state.count = count;
                state.error = None;
            });
            return count;
        }

        self.fetch_from_network().await
    }

    /// Drop the cached count and fetch it again.
    #[instrument(skip(self), fields(variant_id = %self.key.variant_id))]
    pub async fn refetch(&self) -> u64 {
        self.cache.invalidate(&self.key).await;
        self.fetch_from_network().await
    }

    async fn fetch_from_network(&self) -> u64 {
        self.update(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let result = self.client.fetch_count(&self.key.variant_id).await;

        match result {
            Ok(count) => {
                // 404 arrives here as Ok(0) and is cached like any other count.
                self.cache.insert(self.key.clone(), count).await;
                debug!(count, "Fetched waitlist count");
                self.update(|state| {
                    state.count = count;
                    state.is_loading = false;
                });
                count
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch waitlist count");
                let message = self.failure_message(&e);
                self.update(|state| {
                    state.count = 0;
                    state.error = Some(message);
                    state.is_loading = false;
                });
                0
            }
        }
    }

    fn failure_message(&self, error: &CountError) -> String {
        let base = &self.client.messages().count_failed;
        match error {
            CountError::Status(status) => format!("{base} (HTTP {status})"),
            CountError::Transport(_) | CountError::Parse(_) => base.clone(),
        }
    }

    fn update(&self, f: impl FnOnce(&mut CountState)) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, Utc};
    use serde_json::json;

    use super::*;
    use crate::cache::ManualClock;
    use crate::config::WaitlistConfig;
    use crate::error::TransportError;
    use crate::testing::MockTransport;

    struct Fixture {
        mock: Arc<MockTransport>,
        clock: Arc<ManualClock>,
        cache: CountCache,
        client: WaitlistClient,
    }

    fn fixture() -> Fixture {
        let mock = Arc::new(MockTransport::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = CountCache::new(100, clock.clone());
        let config =
            WaitlistConfig::new("https://waitlist.example.com", "shop.myshopify.com", None)
                .unwrap();
        let client = WaitlistClient::with_transport(config, mock.clone());
        Fixture {
            mock,
            clock,
            cache,
            client,
        }
    }

    fn tracker(f: &Fixture) -> CountTracker {
        CountTracker::new(
            f.client.clone(),
            f.cache.clone(),
            "gid://shopify/ProductVariant/123",
        )
    }

    #[tokio::test]
    async fn test_second_fetch_within_window_uses_cache() {
        let f = fixture();
        f.mock.push_json(200, json!({"variantId": "123", "count": 5}));
        let tracker = tracker(&f);

        assert_eq!(tracker.fetch_count().await, 5);
        assert_eq!(tracker.fetch_count().await, 5);

        assert_eq!(f.mock.call_count(), 1);
        assert_eq!(
            f.mock.calls().first().unwrap().url,
            "https://waitlist.example.com/api/v1/count/123?shop=shop.myshopify.com"
        );
    }

    #[tokio::test]
    async fn test_cache_is_shared_between_trackers() {
        let f = fixture();
        f.mock.push_json(200, json!({"variantId": "123", "count": 5}));

        assert_eq!(tracker(&f).fetch_count().await, 5);
        assert_eq!(tracker(&f).fetch_count().await, 5);
        assert_eq!(f.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_hits_network() {
        let f = fixture();
        f.mock.push_json(200, json!({"variantId": "123", "count": 5}));
        f.mock.push_json(200, json!({"variantId": "123", "count": 6}));
        let tracker = tracker(&f);

        assert_eq!(tracker.fetch_count().await, 5);
        f.clock.advance(TimeDelta::milliseconds(60_000));
        assert_eq!(tracker.fetch_count().await, 6);

        assert_eq!(f.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_refetch_always_hits_network() {
        let f = fixture();
        f.mock.push_json(200, json!({"variantId": "123", "count": 5}));
        f.mock.push_json(200, json!({"variantId": "123", "count": 8}));
        let tracker = tracker(&f);

        tracker.fetch_count().await;
        assert_eq!(tracker.refetch().await, 8);

        assert_eq!(f.mock.call_count(), 2);
        assert_eq!(tracker.state().count, 8);
    }

    #[tokio::test]
    async fn test_not_found_is_cached_zero() {
        let f = fixture();
        f.mock.push_text(404, "");
        let tracker = tracker(&f);

        assert_eq!(tracker.fetch_count().await, 0);
        assert_eq!(
            tracker.state(),
            CountState {
                count: 0,
                is_loading: false,
                error: None,
            }
        );

        let entry = f
            .cache
            .entry(&CacheKey::new("shop.myshopify.com", "123"))
            .await
            .unwrap();
        assert_eq!(entry.count, 0);

        assert_eq!(tracker.fetch_count().await, 0);
        assert_eq!(f.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_server_error_reports_and_is_not_cached() {
        let f = fixture();
        f.mock.push_text(500, "oops");
        f.mock.push_json(200, json!({"variantId": "123", "count": 2}));
        let tracker = tracker(&f);

        assert_eq!(tracker.fetch_count().await, 0);
        let state = tracker.state();
        assert_eq!(state.count, 0);
        assert!(!state.is_loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Failed to fetch waitlist count (HTTP 500)")
        );
        assert!(
            f.cache
                .entry(&CacheKey::new("shop.myshopify.com", "123"))
                .await
                .is_none()
        );

        // Next fetch goes back to the network and clears the error.
        assert_eq!(tracker.fetch_count().await, 2);
        assert_eq!(f.mock.call_count(), 2);
        assert!(tracker.state().error.is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_zero() {
        let f = fixture();
        f.mock
            .push_error(TransportError::Http("connection reset".to_string()));
        let tracker = tracker(&f);

        assert_eq!(tracker.fetch_count().await, 0);
        let state = tracker.state();
        assert_eq!(state.error.as_deref(), Some("Failed to fetch waitlist count"));
        assert!(!state.is_loading);
    }

    #[tokio::test]
    async fn test_cache_hit_clears_earlier_error() {
        let f = fixture();
        f.mock.push_text(500, "oops");
        f.mock.push_json(200, json!({"variantId": "123", "count": 4}));
        let failed = tracker(&f);
        let other = tracker(&f);

        assert_eq!(failed.fetch_count().await, 0);
        assert!(failed.state().error.is_some());

        assert_eq!(other.fetch_count().await, 4);
        assert_eq!(failed.fetch_count().await, 4);

        assert_eq!(
            failed.state(),
            CountState {
                count: 4,
                is_loading: false,
                error: None,
            }
        );
        assert_eq!(f.mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_custom_max_age() {
        let f = fixture();
        f.mock.push_json(200, json!({"variantId": "123", "count": 1}));
        f.mock.push_json(200, json!({"variantId": "123", "count": 2}));
        let tracker = tracker(&f).with_max_age(Duration::from_secs(5));

        tracker.fetch_count().await;
        f.clock.advance(TimeDelta::seconds(5));
        assert_eq!(tracker.fetch_count().await, 2);
    }
}
