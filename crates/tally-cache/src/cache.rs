//! Sharded cache with per-entry expiry.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::sweeper::Sweeper;

/// Upper bound on a single entry's lifetime, keeps `Instant` arithmetic in range.
const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Entry stored in the cache.
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn new(value: V, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + ttl.min(MAX_TTL),
        }
    }

    /// An entry is live strictly before its deadline.
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    purged: AtomicU64,
}

impl Counters {
    fn record(&self, found: bool) {
        if found {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// State shared between cache handles and the sweeper.
pub(crate) struct Inner<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    counters: Counters,
}

impl<K: Eq + Hash, V> Inner<K, V> {
    /// Drop every entry whose deadline has passed.
    ///
    /// Runs under each shard's write lock in turn, so it is ordered against
    /// `set`, `take` and `remove` on the same key.
    pub(crate) fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut purged = 0usize;

        self.entries.retain(|_, entry| {
            let live = entry.is_live(now);
            if !live {
                purged += 1;
            }
            live
        });

        if purged > 0 {
            self.counters
                .purged
                .fetch_add(purged as u64, Ordering::Relaxed);
            debug!(
                purged,
                remaining = self.entries.len(),
                "Purged expired cache entries"
            );
        }

        purged
    }
}

/// Thread-safe cache where each entry carries its own deadline.
///
/// All mutations of a key (insert, take, remove, sweep) serialize on the
/// write lock of the shard that owns it. Keys in different shards never
/// contend. Readers receive clones, never references into the map.
///
/// Handles are cheap to clone and share the same storage.
pub struct ExpiringCache<K, V> {
    inner: Arc<Inner<K, V>>,
    config: CacheConfig,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        let entries = match config.effective_shards() {
            Some(shards) => DashMap::with_shard_amount(shards),
            None => DashMap::new(),
        };

        Self {
            inner: Arc::new(Inner {
                entries,
                counters: Counters::default(),
            }),
            config,
        }
    }

    /// Get the cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Insert or replace the entry for `key`, expiring `ttl` from now.
    ///
    /// A zero `ttl` stores an entry that is already absent to every reader.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        self.inner.entries.insert(key, CacheEntry::new(value, ttl));
        self.inner.counters.inserts.fetch_add(1, Ordering::Relaxed);

        trace!(
            ttl_ms = ttl.as_millis() as u64,
            cache_size = self.inner.entries.len(),
            "Cache entry set"
        );
    }

    /// Like [`set`](Self::set) with a signed TTL in seconds.
    /// Non-positive values store an immediately expired entry.
    pub fn set_with_ttl_secs(&self, key: K, value: V, ttl_secs: i64) {
        let ttl = u64::try_from(ttl_secs)
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO);
        self.set(key, value, ttl);
    }

    /// Get a copy of the value for `key` if it exists and has not expired.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let value = self
            .inner
            .entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone());

        self.inner.counters.record(value.is_some());
        value
    }

    /// Atomically remove and return the value for `key`.
    ///
    /// Expiry is checked under the shard lock. When several callers race for
    /// the same key, at most one receives `Some`; the rest see `None` exactly
    /// as if the key had never been set.
    pub fn take<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let taken = self
            .inner
            .entries
            .remove_if(key, |_, entry| entry.is_live(Instant::now()))
            .map(|(_, entry)| entry.value);

        self.inner.counters.record(taken.is_some());
        if taken.is_some() {
            trace!(cache_size = self.inner.entries.len(), "Cache entry taken");
        }
        taken
    }

    /// Remove the entry for `key`.
    ///
    /// Returns `true` only if a live entry was removed. Removing an absent
    /// key is a no-op; an expired entry is dropped but reported as absent.
    pub fn remove<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.inner
            .entries
            .remove(key)
            .is_some_and(|(_, entry)| entry.is_live(now))
    }

    /// Check whether a live entry exists for `key` without touching stats.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.inner
            .entries
            .get(key)
            .is_some_and(|entry| entry.is_live(now))
    }

    /// Return the live value for `key`, or create it with `init`.
    ///
    /// Lookup and creation happen under one shard lock, so concurrent callers
    /// for the same key agree on a single value. An existing live entry keeps
    /// its deadline; a created one expires `ttl` from now.
    pub fn get_or_insert_with<F>(&self, key: K, ttl: Duration, init: F) -> V
    where
        F: FnOnce() -> V,
    {
        let now = Instant::now();
        match self.inner.entries.entry(key) {
            Entry::Occupied(occupied) if occupied.get().is_live(now) => {
                self.inner.counters.record(true);
                occupied.get().value.clone()
            }
            Entry::Occupied(mut occupied) => {
                let value = init();
                occupied.insert(CacheEntry::new(value.clone(), ttl));
                self.inner.counters.record(false);
                self.inner.counters.inserts.fetch_add(1, Ordering::Relaxed);
                value
            }
            Entry::Vacant(vacant) => {
                let value = init();
                vacant.insert(CacheEntry::new(value.clone(), ttl));
                self.inner.counters.record(false);
                self.inner.counters.inserts.fetch_add(1, Ordering::Relaxed);
                value
            }
        }
    }

    /// Number of physically stored entries, including expired ones the
    /// sweeper has not reclaimed yet.
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    /// Check if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    /// Purge expired entries now. Returns how many were dropped.
    ///
    /// This is what the sweeper runs on every tick.
    pub fn purge_expired(&self) -> usize {
        self.inner.purge_expired()
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let counters = &self.inner.counters;
        CacheStats {
            size: self.inner.entries.len(),
            hits: counters.hits.load(Ordering::Relaxed),
            misses: counters.misses.load(Ordering::Relaxed),
            inserts: counters.inserts.load(Ordering::Relaxed),
            purged: counters.purged.load(Ordering::Relaxed),
        }
    }

    /// Spawn the background sweeper if the configuration enables it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_sweeper(&self) -> Option<Sweeper> {
        self.config
            .enable_sweeper
            .then(|| self.spawn_sweeper(self.config.sweep_interval))
    }

    /// Spawn a sweeper with an explicit interval.
    ///
    /// The task only holds a weak reference, so it ends on its own once every
    /// handle to this cache has been dropped.
    pub fn spawn_sweeper(&self, interval: Duration) -> Sweeper {
        Sweeper::spawn(Arc::downgrade(&self.inner), interval)
    }
}

impl<K, V> Clone for ExpiringCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

impl<K: Eq + Hash, V> std::fmt::Debug for ExpiringCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("size", &self.inner.entries.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Entries physically stored (live or awaiting sweep).
    pub size: usize,

    /// Lookups and takes that found a live entry.
    pub hits: u64,

    /// Lookups and takes that found nothing live.
    pub misses: u64,

    /// Entries written.
    pub inserts: u64,

    /// Entries reclaimed by `purge_expired`.
    pub purged: u64,
}
