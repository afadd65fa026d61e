// Short-lived memo of assembled documents, keyed by the canonical resolved config.
// Not LRU: expired entries are swept only once the map grows past its size bound.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;

use crate::types::ClockConfig;

/// Millisecond wall clock used to age cache entries.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// The host's real clock.
pub struct SystemClock;

impl TimeSource for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        chrono::Utc::now().timestamp_millis().max(0) as u64
    }
}

/// Storage for generated documents.
pub trait DocumentCache: Send + Sync {
    fn get(&self, config: &ClockConfig) -> Option<Arc<str>>;
    fn put(&self, config: &ClockConfig, document: Arc<str>);
}

/// Caching disabled: every lookup misses.
pub struct NoCache;

impl DocumentCache for NoCache {
    fn get(&self, _config: &ClockConfig) -> Option<Arc<str>> {
        None
    }

    fn put(&self, _config: &ClockConfig, _document: Arc<str>) {}
}

struct CacheEntry {
    document: Arc<str>,
    inserted_ms: u64,
}

/// Time-to-live cache with an opportunistic expiry sweep.
pub struct TtlCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl_ms: u64,
    capacity: usize,
    clock: Box<dyn TimeSource>,
}

impl TtlCache {
    pub fn new(ttl_ms: u64, capacity: usize) -> Self {
        Self::with_time_source(ttl_ms, capacity, Box::new(SystemClock))
    }

    pub fn with_time_source(ttl_ms: u64, capacity: usize, clock: Box<dyn TimeSource>) -> Self {
        TtlCache {
            entries: Mutex::new(HashMap::new()),
            ttl_ms,
            capacity,
            clock,
        }
    }

    /// Cache key for a resolved configuration. A config that cannot be serialized is never cached.
    pub fn key(config: &ClockConfig) -> Option<String> {
        config.canonical_json().ok()
    }

    /// Entries currently held, fresh or not.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Servable by `get`: younger than the TTL.
    fn is_fresh(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.inserted_ms) < self.ttl_ms
    }

    /// Dropped by the sweep: strictly older than the TTL.
    fn is_expired(&self, entry: &CacheEntry, now_ms: u64) -> bool {
        now_ms.saturating_sub(entry.inserted_ms) > self.ttl_ms
    }
}

impl DocumentCache for TtlCache {
    fn get(&self, config: &ClockConfig) -> Option<Arc<str>> {
        let key = Self::key(config)?;
        let now = self.clock.now_ms();
        let entries = self.entries.lock();
        entries
            .get(&key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| Arc::clone(&entry.document))
    }

    fn put(&self, config: &ClockConfig, document: Arc<str>) {
        let Some(key) = Self::key(config) else {
            return;
        };
        let now = self.clock.now_ms();
        let mut entries = self.entries.lock();
        entries.insert(
            key,
            CacheEntry {
                document,
                inserted_ms: now,
            },
        );

        if entries.len() > self.capacity {
            let before = entries.len();
            entries.retain(|_, entry| !self.is_expired(entry, now));
            debug!("Swept {} expired documents from cache", before - entries.len());
        }
    }
}
