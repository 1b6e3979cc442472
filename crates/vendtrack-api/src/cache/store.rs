// ── Cache store ──
//
// One mutex around one map. Every operation (including the lazy expiry
// inside `get` and the full scan inside `invalidate`) completes under a
// single lock acquisition, so no reader can observe a half-applied
// invalidation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, info, trace};

/// Time-to-live applied to every entry: 2 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

struct CacheEntry {
    payload: Value,
    stored_at: Instant,
}

/// Counters exposed for telemetry and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed by pattern invalidation (not by expiry or clear).
    pub invalidated: u64,
}

/// In-memory response cache with a fixed, store-wide TTL.
///
/// Entries expire lazily: a lookup at or after `stored_at + ttl` removes
/// the entry and reports a miss. There is no background sweep.
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidated: AtomicU64,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidated: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a live entry. Expired entries are deleted and reported absent.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.lock();
        let now = Instant::now();

        let expired = match entries.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                trace!(key, "cache hit");
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.remove(key);
            debug!(key, "cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `payload` under `key`, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, payload: Value) {
        let key = key.into();
        trace!(key = %key, "cache set");
        self.lock().insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove every entry whose key contains `pattern`. Returns the count.
    pub fn invalidate(&self, pattern: &str) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|key, _| !key.contains(pattern));
        let removed = before - entries.len();
        drop(entries);

        self.invalidated
            .fetch_add(u64::try_from(removed).unwrap_or(u64::MAX), Ordering::Relaxed);
        info!(pattern, removed, "cache invalidated");
        removed
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        let count = entries.len();
        entries.clear();
        info!(count, "cache cleared");
    }

    /// Number of stored entries, including ones that have expired but
    /// have not been looked up since.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidated: self.invalidated.load(Ordering::Relaxed),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        // A panic while holding the lock cannot leave the map half-written
        // (each operation is a single HashMap call), so recover the guard.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
