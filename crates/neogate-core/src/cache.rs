use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

// ==============================================================================
// Cache Entry
// ==============================================================================

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

// ==============================================================================
// TTL Cache
// ==============================================================================

/// In-memory store for expensive read results with a fixed time-to-live.
///
/// Expiry is checked lazily on read; nothing sweeps the map on a timer and
/// there is no capacity-based eviction. Each service instance owns its own
/// cache, so separate networks never observe each other's entries.
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `value`, replacing any previous entry and restarting its TTL.
    pub async fn set(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.write().await.insert(key, entry);
    }

    /// Return the value if present and unexpired.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    pub async fn has(&self, key: &K) -> bool {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|entry| entry.is_fresh(now))
    }

    pub async fn remove(&self, key: &K) {
        self.entries.write().await.remove(key);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, including ones that have expired but were
    /// not yet overwritten or removed.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(30);

    #[tokio::test(start_paused = true)]
    async fn get_returns_value_until_ttl_elapses() {
        let cache = TtlCache::new(TTL);
        cache.set("height", 42_u32).await;

        assert_eq!(cache.get(&"height").await, Some(42));
        assert!(cache.has(&"height").await);

        tokio::time::advance(TTL - Duration::from_millis(1)).await;
        assert_eq!(cache.get(&"height").await, Some(42));

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(cache.get(&"height").await, None);
        assert!(!cache.has(&"height").await);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_restarts_expiry() {
        let cache = TtlCache::new(TTL);
        cache.set("k", "first").await;

        tokio::time::advance(Duration::from_secs(20)).await;
        cache.set("k", "second").await;

        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(cache.get(&"k").await, Some("second"));

        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        let cache: TtlCache<String, u64> = TtlCache::new(TTL);
        assert_eq!(cache.get(&"nope".to_owned()).await, None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let cache = TtlCache::new(TTL);
        cache.set(1_u32, "a").await;
        cache.set(2_u32, "b").await;

        cache.remove(&1).await;
        assert!(!cache.has(&1).await);
        assert!(cache.has(&2).await);

        // Removing a missing key is a no-op.
        cache.remove(&1).await;

        cache.clear().await;
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_not_swept() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1_u8).await;
        tokio::time::advance(TTL * 2).await;

        assert_eq!(cache.get(&"k").await, None);
        assert_eq!(cache.len().await, 1);
    }
}
