use std::{
    collections::HashMap,
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use ipscope_core::model::{GeoResult, LookupTarget};
use tokio::sync::RwLock;

/// Time source of the cache.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant { Instant::now() }
}

#[derive(Clone, Debug)]
struct CacheEntry {
    value: GeoResult,
    expires_at: Instant,
}

/// Successful lookups, kept for a fixed time after they were stored.
///
/// Entries are only removed when a read finds them expired; there is no
/// background sweeper and no capacity bound. Cloning the cache yields a
/// handle to the same entries.
///
/// Entries are keyed by the lookup target itself, so a caller lookup never
/// shares an entry with an address lookup, whatever that address spells.
#[derive(Clone)]
pub struct GeoCache {
    entries: Arc<RwLock<HashMap<LookupTarget, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for GeoCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoCache").field("ttl", &self.ttl).finish_non_exhaustive()
    }
}

impl GeoCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self { Self::with_clock(ttl, Arc::new(SystemClock)) }

    #[must_use]
    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl, clock }
    }

    /// Cached value for `target`, evicting it if it has expired.
    pub async fn get(&self, target: &LookupTarget) -> Option<GeoResult> {
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(target) {
                None => return None,
                Some(entry) if now <= entry.expires_at => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut entries = self.entries.write().await;
        // Another request may have refreshed the entry between the two locks.
        if entries.get(target).is_some_and(|entry| now > entry.expires_at) {
            drop(entries.remove(target));
            tracing::trace!(key = %target.cache_key(), "Evicted expired geo cache entry");
        }
        None
    }

    /// Store `value` under `target` for one TTL. Error results are ignored.
    pub async fn set(&self, target: LookupTarget, value: GeoResult) {
        if value.is_error() {
            return;
        }

        let entry = CacheEntry { value, expires_at: self.clock.now() + self.ttl };
        drop(self.entries.write().await.insert(target, entry));
    }

    pub async fn len(&self) -> usize { self.entries.read().await.len() }

    pub async fn is_empty(&self) -> bool { self.entries.read().await.is_empty() }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::{Duration, Instant},
    };

    use ipscope_core::model::{GeoResult, LookupTarget};
    use serde_json::json;

    use super::{Clock, GeoCache};

    fn address(address: &str) -> LookupTarget { LookupTarget::address(address) }

    /// Clock that only moves when told to.
    #[derive(Debug)]
    pub(crate) struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        pub(crate) fn new() -> Arc<Self> { Arc::new(Self { now: Mutex::new(Instant::now()) }) }

        pub(crate) fn advance(&self, duration: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += duration;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant { *self.now.lock().unwrap() }
    }

    const TTL: Duration = Duration::from_millis(60_000);

    #[tokio::test]
    async fn test_round_trip() {
        let cache = GeoCache::with_clock(TTL, ManualClock::new());
        let value = GeoResult::Success(json!({ "ip": "8.8.8.8", "country": "US" }));

        cache.set(address("8.8.8.8"), value.clone()).await;

        assert_eq!(cache.get(&address("8.8.8.8")).await, Some(value));
        assert_eq!(cache.get(&address("1.1.1.1")).await, None);
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let clock = ManualClock::new();
        let cache = GeoCache::with_clock(TTL, clock.clone());
        let value = GeoResult::Success(json!({ "ip": "8.8.8.8" }));

        cache.set(address("8.8.8.8"), value.clone()).await;

        clock.advance(TTL);
        assert_eq!(cache.get(&address("8.8.8.8")).await, Some(value), "still valid at exactly the TTL");

        clock.advance(Duration::from_millis(1));
        assert_eq!(cache.get(&address("8.8.8.8")).await, None);
        assert!(cache.is_empty().await, "expired entry is evicted on read");
    }

    #[tokio::test]
    async fn test_set_restarts_ttl() {
        let clock = ManualClock::new();
        let cache = GeoCache::with_clock(TTL, clock.clone());

        cache.set(LookupTarget::Caller, GeoResult::Success(json!({ "ip": "1.1.1.1" }))).await;
        clock.advance(Duration::from_millis(50_000));
        cache.set(LookupTarget::Caller, GeoResult::Success(json!({ "ip": "2.2.2.2" }))).await;
        clock.advance(Duration::from_millis(50_000));

        assert_eq!(
            cache.get(&LookupTarget::Caller).await,
            Some(GeoResult::Success(json!({ "ip": "2.2.2.2" })))
        );
    }

    #[tokio::test]
    async fn test_errors_are_never_stored() {
        let cache = GeoCache::with_clock(TTL, ManualClock::new());

        cache.set(address("8.8.8.8"), GeoResult::fetch_failed("connection refused")).await;
        cache.set(LookupTarget::Caller, GeoResult::Success(json!({ "error": true, "reason": "RateLimited" }))).await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.get(&address("8.8.8.8")).await, None);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = GeoCache::with_clock(TTL, ManualClock::new());
        let handle = cache.clone();

        handle.set(address("8.8.8.8"), GeoResult::Success(json!({ "ip": "8.8.8.8" }))).await;

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_caller_and_address_entries_are_distinct() {
        let cache = GeoCache::with_clock(TTL, ManualClock::new());

        cache.set(LookupTarget::Caller, GeoResult::Success(json!({ "ip": "198.51.100.77" }))).await;

        assert_eq!(LookupTarget::Caller.cache_key(), address("public").cache_key());
        assert_eq!(cache.get(&address("public")).await, None);
    }
}
