//! Read-through TTL cache for job-board lookups.
//!
//! A hit short-circuits the upstream network call; entries expire after a
//! fixed time-to-live. Values are cloned out so callers never hold the lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::clock::Clock;

struct Entry<T> {
    value: T,
    stored_at: Instant,
}

pub struct TtlCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Entry<T>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value if present and fresh; stale entries are
    /// evicted on access.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = self.clock.now();
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: String, value: T) {
        let stored_at = self.clock.now();
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key, Entry { value, stored_at });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::test::ManualClock;

    fn cache(ttl_secs: u64) -> (TtlCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        (
            TtlCache::new(Duration::from_secs(ttl_secs), clock.clone()),
            clock,
        )
    }

    #[test]
    fn test_miss_then_hit() {
        let (cache, _clock) = cache(300);
        assert_eq!(cache.get("search:rust"), None);
        cache.insert("search:rust".to_string(), "jobs".to_string());
        assert_eq!(cache.get("search:rust"), Some("jobs".to_string()));
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (cache, clock) = cache(300);
        cache.insert("desc:123".to_string(), "text".to_string());

        clock.advance(Duration::from_secs(299));
        assert!(cache.get("desc:123").is_some());

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("desc:123"), None);
    }

    #[test]
    fn test_insert_refreshes_expiry() {
        let (cache, clock) = cache(300);
        cache.insert("k".to_string(), "v1".to_string());
        clock.advance(Duration::from_secs(200));
        cache.insert("k".to_string(), "v2".to_string());
        clock.advance(Duration::from_secs(200));
        assert_eq!(cache.get("k"), Some("v2".to_string()));
    }
}
