//! Waitlist count cache.
//!
//! One [`CountCache`] is shared by every count widget in a host process.
//! Entries are snapshots, so concurrent writers on the same key simply
//! overwrite each other. Freshness is judged against an injected [`Clock`]
//! rather than moka's own expiry, so hosts and tests control time.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use moka::future::Cache;
use tracing::debug;

/// Default maximum number of cached counts.
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache key: counts are per shop and per numeric variant ID.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct CacheKey {
    pub shop_domain: String,
    pub variant_id: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(shop_domain: impl Into<String>, variant_id: impl Into<String>) -> Self {
        Self {
            shop_domain: shop_domain.into(),
            variant_id: variant_id.into(),
        }
    }
}

/// A cached count and when it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub count: u64,
    pub fetched_at: DateTime<Utc>,
}

/// Shared, size-bounded store of waitlist counts.
///
/// Cheap to clone; clones share entries. Owned by the host, which may
/// [`clear`](Self::clear) it on logout or when the shop changes.
#[derive(Clone)]
pub struct CountCache {
    entries: Cache<CacheKey, CacheEntry>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for CountCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountCache")
            .field("entries", &self.entries.entry_count())
            .field("clock", &self.clock)
            .finish()
    }
}

impl Default for CountCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, Arc::new(SystemClock))
    }
}

impl CountCache {
    /// Create a cache holding at most `capacity` counts.
    #[must_use]
    pub fn new(capacity: u64, clock: Arc<dyn Clock>) -> Self {
        let entries = Cache::builder().max_capacity(capacity).build();
        Self { entries, clock }
    }

    /// Current time according to this cache's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Return the cached count if it is younger than `max_age`.
    pub async fn get_fresh(&self, key: &CacheKey, max_age: Duration) -> Option<u64> {
        let entry = self.entries.get(key).await?;
        let age = self.clock.now().signed_duration_since(entry.fetched_at);

        // A negative age means the clock moved backwards; keep the entry.
        let fresh = age.to_std().map_or(true, |age| age < max_age);
        if fresh {
            debug!(variant_id = %key.variant_id, count = entry.count, "Waitlist count cache hit");
            Some(entry.count)
        } else {
            debug!(variant_id = %key.variant_id, "Waitlist count cache entry stale");
            None
        }
    }

    /// Store a count stamped with the current time.
    pub async fn insert(&self, key: CacheKey, count: u64) {
        let entry = CacheEntry {
            count,
            fetched_at: self.clock.now(),
        };
        self.entries.insert(key, entry).await;
    }

    /// Raw entry, regardless of age.
    pub async fn entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.get(key).await
    }

    /// Drop one entry.
    pub async fn invalidate(&self, key: &CacheKey) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    /// Number of entries after pending maintenance has run.
    pub async fn entry_count(&self) -> u64 {
        self.entries.run_pending_tasks().await;
        self.entries.entry_count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cache() -> (CountCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (CountCache::new(100, clock.clone()), clock)
    }

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn test_fresh_until_max_age() {
        let (cache, clock) = cache();
        let key = CacheKey::new("shop", "1");
        cache.insert(key.clone(), 4).await;

        assert_eq!(cache.get_fresh(&key, MINUTE).await, Some(4));

        clock.advance(TimeDelta::seconds(59));
        assert_eq!(cache.get_fresh(&key, MINUTE).await, Some(4));

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(cache.get_fresh(&key, MINUTE).await, None);
    }

    #[tokio::test]
    async fn test_keys_are_scoped_by_shop() {
        let (cache, _) = cache();
        cache.insert(CacheKey::new("shop-a", "1"), 4).await;

        assert_eq!(cache.get_fresh(&CacheKey::new("shop-b", "1"), MINUTE).await, None);
    }

    #[tokio::test]
    async fn test_overwrite_restamps() {
        let (cache, clock) = cache();
        let key = CacheKey::new("shop", "1");
        cache.insert(key.clone(), 1).await;
        clock.advance(TimeDelta::seconds(90));
        cache.insert(key.clone(), 2).await;

        assert_eq!(cache.get_fresh(&key, MINUTE).await, Some(2));
    }

    #[tokio::test]
    async fn test_invalidate_and_clear() {
        let (cache, _) = cache();
        let a = CacheKey::new("shop", "1");
        let b = CacheKey::new("shop", "2");
        cache.insert(a.clone(), 1).await;
        cache.insert(b.clone(), 2).await;

        cache.invalidate(&a).await;
        assert!(cache.entry(&a).await.is_none());
        assert_eq!(cache.entry_count().await, 1);

        cache.clear();
        assert!(cache.entry(&b).await.is_none());
    }
}
