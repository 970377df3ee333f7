//! Bounded TTL cache of lookup results.
//!
//! Entries are stored per method and keyed by the raw request path, so a
//! hit is a hash probe plus an `Arc` clone. Misses are cached too.
//!
//! Expiry is lazy: a stale entry is dropped when it is next read, and the
//! whole cache is swept at most once per sweep interval from the insert
//! path. When full, the oldest tenth (at least one entry) goes first.
//!
//! Cached matches never hold a pooled param buffer; callers detach them
//! before inserting.

use crate::config::{CacheConfig, CacheSettings};
use crate::stats::Counter;
use brisk_router::{Method, RouteMatch};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

/// A resolved match shared between the cache and its callers
pub type SharedMatch<P> = Arc<RouteMatch<P>>;

struct CacheEntry<P> {
    /// `None` records a lookup that found nothing
    result: Option<SharedMatch<P>>,
    inserted_at: Instant,
}

impl<P> CacheEntry<P> {
    #[inline]
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.inserted_at) >= ttl
    }
}

/// Outcome of a cache probe
pub enum CacheLookup<P> {
    /// Fresh positive entry
    Hit(SharedMatch<P>),
    /// Fresh entry recording that nothing matched
    NegativeHit,
    /// Absent or expired; the result of a search should be inserted
    Miss,
    /// Caching is off; do not insert
    Disabled,
}

struct CacheState<P> {
    by_method: [HashMap<Box<str>, CacheEntry<P>>; Method::COUNT],
    len: usize,
    settings: CacheSettings,
    last_sweep: Instant,
}

impl<P> CacheState<P> {
    fn new(settings: CacheSettings) -> Self {
        Self {
            by_method: std::array::from_fn(|_| HashMap::new()),
            len: 0,
            settings,
            last_sweep: Instant::now(),
        }
    }

    fn clear(&mut self) -> usize {
        let dropped = self.len;
        self.by_method.iter_mut().for_each(HashMap::clear);
        self.len = 0;
        dropped
    }

    fn purge_expired(&mut self, now: Instant) -> usize {
        let ttl = self.settings.ttl;
        let mut removed = 0;
        for map in &mut self.by_method {
            let before = map.len();
            map.retain(|_, entry| !entry.is_expired(now, ttl));
            removed += before - map.len();
        }
        self.len -= removed;
        self.last_sweep = now;
        removed
    }

    /// Drop the `count` entries with the earliest insertion time.
    fn evict_oldest(&mut self, count: usize) -> usize {
        let count = count.min(self.len);
        if count == 0 {
            return 0;
        }

        let mut ages: Vec<(Instant, usize, Box<str>)> = Vec::with_capacity(self.len);
        for (slot, map) in self.by_method.iter().enumerate() {
            ages.extend(map.iter().map(|(key, entry)| (entry.inserted_at, slot, key.clone())));
        }
        if count < ages.len() {
            ages.select_nth_unstable_by_key(count - 1, |(at, _, _)| *at);
            ages.truncate(count);
        }

        let mut removed = 0;
        for (_, slot, key) in ages {
            if self.by_method[slot].remove(&key).is_some() {
                removed += 1;
            }
        }
        self.len -= removed;
        removed
    }
}

/// Thread-safe lookup cache owned by a `Router`
///
/// The periodic sweep only runs when a miss is inserted. A workload served
/// entirely from hits keeps expired entries for paths nobody asks for any
/// more until the next miss or an explicit [`RouteCache::sweep_expired`];
/// `max_size` still bounds them.
pub struct RouteCache<P> {
    state: RwLock<CacheState<P>>,
    /// Mirror of `settings.is_active()`, readable without the lock
    active: AtomicBool,
    sweep_interval: Duration,
    expirations: Counter,
    evictions: Counter,
}

impl<P> RouteCache<P> {
    pub fn new(settings: CacheSettings, sweep_interval: Duration) -> Self {
        Self {
            active: AtomicBool::new(settings.is_active()),
            state: RwLock::new(CacheState::new(settings)),
            sweep_interval,
            expirations: Counter::new(),
            evictions: Counter::new(),
        }
    }

    /// Whether lookups go through the cache. Lock-free.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Probe for `(method, path)`. Fresh hits only take the read lock;
    /// a disabled cache takes no lock at all.
    pub fn get(&self, method: Method, path: &str) -> CacheLookup<P> {
        if !self.is_active() {
            return CacheLookup::Disabled;
        }
        let now = Instant::now();
        {
            let state = self.state.read();
            if !state.settings.is_active() {
                return CacheLookup::Disabled;
            }
            match state.by_method[method.index()].get(path) {
                None => return CacheLookup::Miss,
                Some(entry) if !entry.is_expired(now, state.settings.ttl) => {
                    return match &entry.result {
                        Some(found) => CacheLookup::Hit(Arc::clone(found)),
                        None => CacheLookup::NegativeHit,
                    };
                }
                Some(_) => {}
            }
        }

        // Stale. Another thread may have refreshed it since the read lock
        // was dropped, so check again before removing.
        let mut guard = self.state.write();
        let state = &mut *guard;
        let ttl = state.settings.ttl;
        let map = &mut state.by_method[method.index()];
        if map.get(path).is_some_and(|entry| entry.is_expired(now, ttl)) {
            map.remove(path);
            state.len -= 1;
            self.expirations.inc();
        }
        CacheLookup::Miss
    }

    /// Record the outcome of a tree search. No-op while caching is off,
    /// and in that case the write lock is never taken.
    pub fn insert(&self, method: Method, path: &str, result: Option<SharedMatch<P>>) {
        if !self.is_active() {
            return;
        }
        let now = Instant::now();
        let mut guard = self.state.write();
        let state = &mut *guard;
        if !state.settings.is_active() {
            return;
        }

        if now.saturating_duration_since(state.last_sweep) >= self.sweep_interval {
            let purged = state.purge_expired(now);
            if purged > 0 {
                self.expirations.add(purged as u64);
                trace!(purged, cache_size = state.len, "swept expired route cache entries");
            }
        }

        let slot = method.index();
        if !state.by_method[slot].contains_key(path) && state.len >= state.settings.max_size {
            let max = state.settings.max_size;
            let count = (max / 10).max(1).max(state.len + 1 - max);
            let evicted = state.evict_oldest(count);
            self.evictions.add(evicted as u64);
            trace!(evicted, cache_size = state.len, "evicted oldest route cache entries");
        }

        let entry = CacheEntry {
            result,
            inserted_at: now,
        };
        if state.by_method[slot].insert(path.into(), entry).is_none() {
            state.len += 1;
        }
    }

    /// Drop everything, returning how many entries were dropped
    pub fn clear(&self) -> usize {
        self.state.write().clear()
    }

    /// Purge every expired entry now, returning how many were purged
    pub fn sweep_expired(&self) -> usize {
        let purged = self.state.write().purge_expired(Instant::now());
        self.expirations.add(purged as u64);
        purged
    }

    /// Apply a partial update and return the resulting settings.
    ///
    /// Turning the cache off (or setting a zero TTL) empties it; shrinking
    /// `max_size` drops the oldest entries straight away.
    pub fn reconfigure(&self, update: &CacheConfig) -> CacheSettings {
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.settings.apply(update);
        self.active.store(state.settings.is_active(), Ordering::Release);

        if !state.settings.is_active() {
            state.clear();
        } else if state.len > state.settings.max_size {
            let excess = state.len - state.settings.max_size;
            let evicted = state.evict_oldest(excess);
            self.evictions.add(evicted as u64);
            trace!(evicted, cache_size = state.len, "trimmed route cache to new size");
        }

        state.settings
    }

    pub fn settings(&self) -> CacheSettings {
        self.state.read().settings
    }

    pub fn len(&self) -> usize {
        self.state.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries dropped for reaching their TTL, lazily or by sweep
    pub fn expirations(&self) -> u64 {
        self.expirations.get()
    }

    /// Entries dropped to make room
    pub fn evictions(&self) -> u64 {
        self.evictions.get()
    }
}

impl<P> fmt::Debug for RouteCache<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("RouteCache")
            .field("len", &state.len)
            .field("settings", &state.settings)
            .field("sweep_interval", &self.sweep_interval)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brisk_router::{PooledParams, Route};
    use std::thread;

    fn settings(max_size: usize, ttl: Duration) -> CacheSettings {
        CacheSettings {
            enabled: true,
            max_size,
            ttl,
        }
    }

    fn found(payload: u32) -> Option<SharedMatch<u32>> {
        let route = Route::new(Method::Get, Arc::new(payload));
        Some(Arc::new(RouteMatch::new(route, PooledParams::empty())))
    }

    fn hit_payload(cache: &RouteCache<u32>, method: Method, path: &str) -> Option<u32> {
        match cache.get(method, path) {
            CacheLookup::Hit(m) => Some(*m.payload()),
            _ => None,
        }
    }

    #[test]
    fn test_hit_and_negative_hit() {
        let cache = RouteCache::new(CacheSettings::default(), Duration::from_secs(300));
        cache.insert(Method::Get, "/users", found(7));
        cache.insert(Method::Get, "/nope", None);

        assert_eq!(hit_payload(&cache, Method::Get, "/users"), Some(7));
        assert!(matches!(cache.get(Method::Get, "/nope"), CacheLookup::NegativeHit));
        // keyed by method too
        assert!(matches!(cache.get(Method::Post, "/users"), CacheLookup::Miss));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_hit_shares_the_same_match() {
        let cache = RouteCache::new(CacheSettings::default(), Duration::from_secs(300));
        let stored = found(1);
        cache.insert(Method::Get, "/a", stored.clone());

        match (cache.get(Method::Get, "/a"), stored) {
            (CacheLookup::Hit(m), Some(original)) => assert!(Arc::ptr_eq(&m, &original)),
            _ => panic!("expected a hit"),
        }
    }

    #[test]
    fn test_expired_entry_is_dropped_on_read() {
        let cache = RouteCache::new(settings(100, Duration::from_millis(20)), Duration::from_secs(300));
        cache.insert(Method::Get, "/a", found(1));
        thread::sleep(Duration::from_millis(40));

        assert!(matches!(cache.get(Method::Get, "/a"), CacheLookup::Miss));
        assert_eq!(cache.expirations(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_eviction_drops_oldest_and_bounds_size() {
        let cache = RouteCache::new(settings(10, Duration::from_secs(60)), Duration::from_secs(300));
        cache.insert(Method::Get, "/first", found(0));
        thread::sleep(Duration::from_millis(2));
        for i in 1..10 {
            cache.insert(Method::Get, &format!("/p{i}"), found(i));
        }
        assert_eq!(cache.len(), 10);

        cache.insert(Method::Get, "/overflow", found(99));
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.evictions(), 1);
        assert!(matches!(cache.get(Method::Get, "/first"), CacheLookup::Miss));
        assert_eq!(hit_payload(&cache, Method::Get, "/overflow"), Some(99));

        for i in 0..200 {
            cache.insert(Method::Post, &format!("/q{i}"), None);
            assert!(cache.len() <= 10);
        }
    }

    #[test]
    fn test_bulk_eviction_is_a_tenth() {
        let cache: RouteCache<u32> = RouteCache::new(settings(100, Duration::from_secs(60)), Duration::from_secs(300));
        for i in 0..100 {
            cache.insert(Method::Get, &format!("/{i}"), None);
        }
        cache.insert(Method::Get, "/one-more", None);
        assert_eq!(cache.evictions(), 10);
        assert_eq!(cache.len(), 91);
    }

    #[test]
    fn test_replacing_a_key_does_not_evict() {
        let cache = RouteCache::new(settings(2, Duration::from_secs(60)), Duration::from_secs(300));
        cache.insert(Method::Get, "/a", found(1));
        cache.insert(Method::Get, "/b", found(2));
        cache.insert(Method::Get, "/a", found(3));

        assert_eq!(cache.evictions(), 0);
        assert_eq!(cache.len(), 2);
        assert_eq!(hit_payload(&cache, Method::Get, "/a"), Some(3));
    }

    #[test]
    fn test_disabled_cache_is_bypassed() {
        let cache = RouteCache::new(settings(10, Duration::ZERO), Duration::from_secs(300));
        cache.insert(Method::Get, "/a", found(1));
        assert!(cache.is_empty());
        assert!(matches!(cache.get(Method::Get, "/a"), CacheLookup::Disabled));
    }

    #[test]
    fn test_disabled_cache_takes_no_lock() {
        let cache = RouteCache::new(settings(10, Duration::from_secs(60)), Duration::from_secs(300));
        cache.reconfigure(&CacheConfig::new().enabled(false));
        assert!(!cache.is_active());

        // a write lock attempt here would deadlock against the held read guard
        let held = cache.state.read();
        assert!(matches!(cache.get(Method::Get, "/a"), CacheLookup::Disabled));
        cache.insert(Method::Get, "/a", found(1));
        drop(held);

        assert!(cache.is_empty());
        cache.reconfigure(&CacheConfig::new().enabled(true));
        assert!(cache.is_active());
        assert!(matches!(cache.get(Method::Get, "/a"), CacheLookup::Miss));
    }

    #[test]
    fn test_reconfigure_trims_and_disables() {
        let cache: RouteCache<u32> = RouteCache::new(settings(10, Duration::from_secs(60)), Duration::from_secs(300));
        for i in 0..8 {
            cache.insert(Method::Get, &format!("/{i}"), None);
        }

        let updated = cache.reconfigure(&CacheConfig::new().max_size(3));
        assert_eq!(updated.max_size, 3);
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.evictions(), 5);

        cache.reconfigure(&CacheConfig::new().enabled(false));
        assert!(cache.is_empty());
        cache.insert(Method::Get, "/x", None);
        assert!(cache.is_empty());

        cache.reconfigure(&CacheConfig::new().enabled(true));
        cache.insert(Method::Get, "/x", None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_expired() {
        let cache = RouteCache::new(settings(100, Duration::from_millis(20)), Duration::from_secs(300));
        cache.insert(Method::Get, "/a", None);
        cache.insert(Method::Put, "/b", found(2));
        thread::sleep(Duration::from_millis(40));
        cache.insert(Method::Get, "/fresh", None);

        assert_eq!(cache.sweep_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.expirations(), 2);
    }

    #[test]
    fn test_periodic_sweep_runs_on_insert() {
        let cache: RouteCache<u32> = RouteCache::new(settings(100, Duration::from_millis(20)), Duration::ZERO);
        cache.insert(Method::Get, "/old", None);
        thread::sleep(Duration::from_millis(40));
        cache.insert(Method::Get, "/new", None);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.expirations(), 1);
    }

    #[test]
    fn test_clear_reports_dropped() {
        let cache: RouteCache<u32> = RouteCache::new(CacheSettings::default(), Duration::from_secs(300));
        cache.insert(Method::Get, "/a", None);
        cache.insert(Method::Get, "/b", None);
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }
}
