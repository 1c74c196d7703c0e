use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

/// Fixed lifetime of cached read-only responses.
pub const RESPONSE_TTL: Duration = Duration::from_secs(3600);

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// Read-through cache for GET endpoints, keyed by path + query string.
/// Entries live for the fixed TTL; mutations do not invalidate, so a stale
/// read is possible until expiry.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn key(path: &str, query: &str) -> String {
        format!("{}?{}", path, query)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let hit = self.entries.get(key)?;
        if hit.expires_at <= Instant::now() {
            drop(hit);
            self.entries.remove(key);
            return None;
        }
        Some(hit.value.clone())
    }

    pub fn insert(&self, key: String, value: Value) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(RESPONSE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_inserted_value_until_expiry() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        let key = ResponseCache::key("/api/users/user_info", "email=a%40x.com");
        cache.insert(key.clone(), json!({"id": 1}));
        assert_eq!(cache.get(&key), Some(json!({"id": 1})));
    }

    #[test]
    fn misses_unknown_keys() {
        let cache = ResponseCache::default();
        assert_eq!(cache.get("/api/users/user_info?email=b%40x.com"), None);
    }

    #[test]
    fn expired_entries_are_dropped() {
        let cache = ResponseCache::new(Duration::from_millis(10));
        cache.insert("k".into(), json!(1));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn distinct_queries_get_distinct_entries() {
        let cache = ResponseCache::default();
        cache.insert(
            ResponseCache::key("/api/users/referrals_info", "referrer_id=1"),
            json!([1]),
        );
        assert_eq!(
            cache.get(&ResponseCache::key("/api/users/referrals_info", "referrer_id=2")),
            None
        );
    }
}
