use std::{
    collections::HashMap,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use gridsub_discovery::ScheddAd;
use parking_lot::Mutex;
use thiserror::Error;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(1800);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error(
        "unable to contact the collector and cached results for {name} are too old for using ({age_secs}s)"
    )]
    StaleCacheEntry { name: String, age_secs: u64 },

    #[error("unable to contact the collector and cached results do not exist for {name}")]
    NoCacheEntry { name: String },
}

struct CacheEntry {
    ad: ScheddAd,
    updated: u64,
}

/// Last collector answer per schedd, kept to ride out collector outages.
///
/// Entries are never evicted; once older than the TTL they are refused.
pub struct CollectorCache {
    ttl_secs: u64,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for CollectorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl CollectorCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl_secs: ttl.as_secs(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self, name: &str, ad: ScheddAd) {
        self.store_at(name, ad, now_secs());
    }

    pub fn load(&self, name: &str) -> Result<ScheddAd, CacheError> {
        self.load_at(name, now_secs())
    }

    /// Overwrite the entry for `name`, stamped with `now` (unix seconds).
    pub fn store_at(&self, name: &str, ad: ScheddAd, now: u64) {
        self.entries
            .lock()
            .insert(name.to_string(), CacheEntry { ad, updated: now });
    }

    pub fn load_at(&self, name: &str, now: u64) -> Result<ScheddAd, CacheError> {
        let entries = self.entries.lock();
        let entry = entries.get(name).ok_or_else(|| CacheError::NoCacheEntry {
            name: name.to_string(),
        })?;

        let age_secs = now.saturating_sub(entry.updated);
        if age_secs >= self.ttl_secs {
            return Err(CacheError::StaleCacheEntry {
                name: name.to_string(),
                age_secs,
            });
        }
        Ok(entry.ad.clone())
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn entry_expires_after_ttl() {
        let cache = CollectorCache::default();
        cache.store_at("sched1", ScheddAd::named("sched1"), 0);

        assert_eq!(cache.load_at("sched1", 1799), Ok(ScheddAd::named("sched1")));
        assert_eq!(
            cache.load_at("sched1", 1800),
            Err(CacheError::StaleCacheEntry {
                name: "sched1".to_string(),
                age_secs: 1800,
            })
        );
        assert!(matches!(
            cache.load_at("sched1", 1801),
            Err(CacheError::StaleCacheEntry { .. })
        ));
    }

    #[test]
    fn unknown_name_has_no_entry() {
        let cache = CollectorCache::default();
        assert_eq!(
            cache.load_at("never", 0),
            Err(CacheError::NoCacheEntry {
                name: "never".to_string()
            })
        );
    }

    #[test]
    fn store_overwrites_and_refreshes() {
        let cache = CollectorCache::new(Duration::from_secs(10));
        cache.store_at("s", ScheddAd::named("old"), 0);
        cache.store_at("s", ScheddAd::named("new"), 100);

        assert_eq!(cache.load_at("s", 105), Ok(ScheddAd::named("new")));
    }

    #[test]
    fn clock_going_backwards_counts_as_fresh() {
        let cache = CollectorCache::default();
        cache.store_at("s", ScheddAd::named("s"), 500);
        assert!(cache.load_at("s", 100).is_ok());
    }

    #[test]
    fn concurrent_store_and_load_see_whole_entries() {
        let cache = Arc::new(CollectorCache::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let name = format!("schedd{i}");
                    for _ in 0..100 {
                        cache.store(&name, ScheddAd::named(&name));
                        let ad = cache.load(&name).unwrap();
                        assert_eq!(ad.name.as_deref(), Some(name.as_str()));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        for i in 0..8 {
            assert!(cache.load(&format!("schedd{i}")).is_ok());
        }
    }
}
