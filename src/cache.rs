use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Short-lived key-value store for the latest position of each object.
pub trait PositionCache: Send + Sync {
    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration);

    /// Returns the value if it has not expired.
    fn get(&self, key: &str) -> Option<String>;

    /// Drops expired entries. Readers never see them either way.
    fn purge_expired(&self) {}
}

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// In-process cache. Expired entries are invisible, and dropped on read or by `purge_expired`.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.values().filter(|e| e.expires_at > now).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PositionCache for MemoryCache {
    fn set_with_ttl(&self, key: &str, value: String, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now + ttl,
            },
        );
    }

    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, e| e.expires_at > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(45);

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("sat:ISS", "{}".into(), TTL);
        assert_eq!(cache.get("sat:ISS").as_deref(), Some("{}"));

        tokio::time::advance(Duration::from_secs(44)).await;
        assert!(cache.get("sat:ISS").is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("sat:ISS"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rewrite_extends_lifetime() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("sat:A", "1".into(), TTL);
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.set_with_ttl("sat:A", "2".into(), TTL);
        tokio::time::advance(Duration::from_secs(30)).await;

        assert_eq!(cache.get("sat:A").as_deref(), Some("2"));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_stay_until_purged() {
        let cache = MemoryCache::new();
        cache.set_with_ttl("sat:old", "x".into(), TTL);
        tokio::time::advance(TTL).await;
        cache.set_with_ttl("sat:new", "y".into(), TTL);

        assert_eq!(cache.entries.lock().unwrap().len(), 2);
        assert_eq!(cache.len(), 1);

        cache.purge_expired();
        assert_eq!(cache.entries.lock().unwrap().len(), 1);
        assert_eq!(cache.get("sat:new").as_deref(), Some("y"));
    }
}
