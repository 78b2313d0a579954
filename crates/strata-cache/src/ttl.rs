//! TTL-based memoization cache.
//!
//! Expensive lookups in several services share a pattern: build a value for
//! a key, keep it for a bounded time, and make sure a thundering herd of
//! callers does not rebuild it in parallel. This module extracts that
//! pattern into a reusable generic cache.

use std::sync::{Arc, Mutex, TryLockError};
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// A cached value with its creation timestamp and time to live.
struct Entry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_live(&self) -> bool {
        self.created_at.elapsed() < self.ttl
    }
}

/// One key's storage cell. Builds for the key serialize on this mutex.
type Slot<V> = Arc<Mutex<Option<Entry<V>>>>;

/// A thread-safe memoization cache with per-entry TTL expiry.
///
/// Expiry is lazy: an entry past its TTL behaves as absent everywhere and is
/// dropped the next time its key is touched or [`purge_expired`] runs. A TTL
/// of zero expires immediately, so the entry is never observable.
///
/// Cloning a `TtlCache` creates a new handle to the same underlying data
/// (via `Arc`).
///
/// [`purge_expired`]: TtlCache::purge_expired
pub struct TtlCache<V> {
    slots: Arc<DashMap<String, Slot<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    /// Create a new, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
        }
    }

    /// Return the cached value for `key`, building it if absent or expired.
    ///
    /// At most one unsatisfied build runs per key at a time: concurrent
    /// callers serialize on the key's slot, and whoever arrives after a
    /// successful build observes the cached value instead of building.
    /// Callers for different keys never wait on each other.
    ///
    /// A build failure propagates `E` unchanged and stores nothing, so the
    /// next caller retries.
    pub fn get_or_build<F, E>(&self, key: &str, ttl: Duration, build: F) -> Result<V, E>
    where
        V: Clone,
        F: FnOnce() -> Result<V, E>,
    {
        let slot = self.slot(key);
        let mut guard = lock_slot(&slot, key);
        if let Some(entry) = guard.as_ref() {
            if entry.is_live() {
                tracing::trace!(key, "cache hit");
                return Ok(entry.value.clone());
            }
            tracing::trace!(key, "cache entry expired");
            *guard = None;
        }
        let value = build()?;
        tracing::trace!(key, ?ttl, "cache entry built");
        *guard = Some(Entry {
            value: value.clone(),
            created_at: Instant::now(),
            ttl,
        });
        Ok(value)
    }

    /// Whether a live entry exists for `key`. Never builds.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let Some(slot) = self.slots.get(key).map(|s| Arc::clone(&s)) else {
            return false;
        };
        let guard = lock_slot(&slot, key);
        guard.as_ref().is_some_and(Entry::is_live)
    }

    /// Evict `key`, returning its value if a live entry was present.
    ///
    /// A build already running for the key completes against the detached
    /// slot and is not re-inserted.
    pub fn remove(&self, key: &str) -> Option<V> {
        let (_, slot) = self.slots.remove(key)?;
        let mut guard = lock_slot(&slot, key);
        let entry = guard.take()?;
        if entry.is_live() { Some(entry.value) } else { None }
    }

    /// Sweep expired entries. Call periodically to bound memory usage.
    ///
    /// Keys whose slot is busy building are left for the next sweep.
    pub fn purge_expired(&self) {
        self.slots.retain(|key, slot| match slot.try_lock() {
            Ok(mut guard) => {
                if guard.as_ref().is_some_and(|entry| !entry.is_live()) {
                    *guard = None;
                }
                guard.is_some()
            }
            Err(TryLockError::Poisoned(poisoned)) => {
                tracing::warn!(key, "cache slot mutex poisoned, recovering");
                let mut guard = poisoned.into_inner();
                if guard.as_ref().is_some_and(|entry| !entry.is_live()) {
                    *guard = None;
                }
                guard.is_some()
            }
            Err(TryLockError::WouldBlock) => true,
        });
    }

    /// Number of live entries.
    ///
    /// Slots busy with a build are skipped rather than waited on, so the
    /// count can momentarily lag under contention.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|item| {
                let (key, slot) = item.pair();
                match slot.try_lock() {
                    Ok(guard) => guard.as_ref().is_some_and(Entry::is_live),
                    Err(TryLockError::Poisoned(poisoned)) => {
                        tracing::warn!(key, "cache slot mutex poisoned, recovering");
                        poisoned.into_inner().as_ref().is_some_and(Entry::is_live)
                    }
                    Err(TryLockError::WouldBlock) => false,
                }
            })
            .count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Slot<V> {
        self.slots
            .entry(key.to_owned())
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone()
    }
}

fn lock_slot<'a, V>(slot: &'a Slot<V>, key: &str) -> std::sync::MutexGuard<'a, Option<Entry<V>>> {
    slot.lock().unwrap_or_else(|poisoned| {
        tracing::warn!(key, "cache slot mutex poisoned, recovering");
        poisoned.into_inner()
    })
}
