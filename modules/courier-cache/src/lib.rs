//! A keyed TTL cache: short-lived rendered feed bodies
//! and de-dup memory. Per-entry TTL, background eviction at `TTL/2`.
//!
//! Keys are plain `String`s; callers with structured composite keys
//! (e.g. `(feed_name, format)`) build them with [`composite_key`] so
//! prefix invalidation (`"<name>:"`) stays simple string matching.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Join composite key parts with `:` — `composite_key(&["feed", "rss"])`
/// → `"feed:rss"`.
pub fn composite_key(parts: &[&str]) -> String {
    parts.join(":")
}

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<V: Clone + Send + Sync> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone + Send + Sync + 'static> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap();
        entries.get(key).and_then(|e| {
            if e.expires_at > Instant::now() {
                Some(e.value.clone())
            } else {
                None
            }
        })
    }

    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl);
    }

    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(
            key.into(),
            Entry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub fn invalidate_key(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }

    /// Remove every key starting with `prefix` (e.g. invalidating all
    /// formats cached for one feed name after a new entry is inserted).
    pub fn invalidate_pattern(&self, prefix: &str) {
        self.entries
            .write()
            .unwrap()
            .retain(|k, _| !k.starts_with(prefix));
    }

    pub fn clear(&self) {
        self.entries.write().unwrap().clear();
    }

    fn evict_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "ttl cache swept expired entries");
        }
    }

    /// Spawn a background task that sweeps expired entries every
    /// `TTL/2`, stopping when `token` is cancelled.
    pub fn spawn_evictor(
        self: std::sync::Arc<Self>,
        token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let period = (self.default_ttl / 2).max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                tokio::select! {
                    _ = interval.tick() => self.evict_expired(),
                    _ = token.cancelled() => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_key_joins_with_colon() {
        assert_eq!(composite_key(&["feed", "rss"]), "feed:rss");
    }

    #[test]
    fn set_then_get_round_trips() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(3600));
        cache.set("k", "v".to_string());
        assert_eq!(cache.get("k"), Some("v".to_string()));
    }

    #[test]
    fn expired_entries_are_not_returned() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_millis(1));
        cache.set("k", "v".to_string());
        std::thread::sleep(Duration::from_millis(10));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn invalidate_pattern_removes_matching_prefix() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(3600));
        cache.set(composite_key(&["feed", "rss"]), "a".to_string());
        cache.set(composite_key(&["feed", "atom"]), "b".to_string());
        cache.set(composite_key(&["other", "rss"]), "c".to_string());

        cache.invalidate_pattern("feed:");

        assert_eq!(cache.get(&composite_key(&["feed", "rss"])), None);
        assert_eq!(cache.get(&composite_key(&["feed", "atom"])), None);
        assert_eq!(cache.get(&composite_key(&["other", "rss"])), Some("c".to_string()));
    }

    #[test]
    fn invalidate_key_removes_only_that_key() {
        let cache: TtlCache<String> = TtlCache::new(Duration::from_secs(3600));
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.invalidate_key("a");
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("b"), Some("2".to_string()));
    }

    #[tokio::test]
    async fn evictor_sweeps_expired_entries_in_background() {
        let cache = std::sync::Arc::new(TtlCache::<String>::new(Duration::from_millis(20)));
        cache.set("k", "v".to_string());
        let token = CancellationToken::new();
        let handle = cache.clone().spawn_evictor(token.clone());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(cache.entries.read().unwrap().len(), 0);

        token.cancel();
        handle.await.unwrap();
    }
}
