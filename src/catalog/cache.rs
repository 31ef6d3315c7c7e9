use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Process-wide cache of fetched catalog text, keyed by URL.
///
/// Staleness up to the TTL is acceptable; a miss always means a fresh fetch.
/// Swap in `NoopCache` where caching would get in the way.
pub trait CatalogCache: Send + Sync {
    fn get(&self, url: &str) -> Option<Arc<str>>;
    fn put(&self, url: &str, text: Arc<str>);
}

struct Slot {
    text: Arc<str>,
    fetched_at: Instant,
}

pub struct TtlCache {
    ttl: Duration,
    slots: Mutex<HashMap<String, Slot>>,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl CatalogCache for TtlCache {
    fn get(&self, url: &str) -> Option<Arc<str>> {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots.get(url) {
            Some(slot) if slot.fetched_at.elapsed() <= self.ttl => Some(Arc::clone(&slot.text)),
            Some(_) => {
                slots.remove(url);
                None
            }
            None => None,
        }
    }

    fn put(&self, url: &str, text: Arc<str>) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.insert(
            url.to_string(),
            Slot {
                text,
                fetched_at: Instant::now(),
            },
        );
    }
}

pub struct NoopCache;

impl CatalogCache for NoopCache {
    fn get(&self, _url: &str) -> Option<Arc<str>> {
        None
    }

    fn put(&self, _url: &str, _text: Arc<str>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_entry_is_returned() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        cache.put("http://example/tle", Arc::from("catalog text"));
        assert_eq!(
            cache.get("http://example/tle").as_deref(),
            Some("catalog text")
        );
        assert!(cache.get("http://example/other").is_none());
    }

    #[test]
    fn expired_entry_is_evicted() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.put("http://example/tle", Arc::from("catalog text"));
        std::thread::sleep(Duration::from_millis(5));
        assert!(cache.get("http://example/tle").is_none());
    }

    #[test]
    fn refresh_replaces_the_slot() {
        let cache = TtlCache::new(Duration::from_secs(3600));
        cache.put("http://example/tle", Arc::from("old"));
        cache.put("http://example/tle", Arc::from("new"));
        assert_eq!(cache.get("http://example/tle").as_deref(), Some("new"));
    }

    #[test]
    fn noop_cache_never_hits() {
        let cache = NoopCache;
        cache.put("http://example/tle", Arc::from("catalog text"));
        assert!(cache.get("http://example/tle").is_none());
    }
}
