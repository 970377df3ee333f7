//! Dispatch statistics

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Monotonically increasing counter
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub const fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn add(&self, delta: u64) {
        self.value.fetch_add(delta, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Counters bumped by the router itself
#[derive(Debug, Default)]
pub(crate) struct DispatchCounters {
    pub hits: Counter,
    pub misses: Counter,
    pub inserts: Counter,
    pub removals: Counter,
    pub searches: Counter,
}

/// Point-in-time snapshot of router activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Lookups answered from the cache, negative entries included
    pub hits: u64,
    /// Lookups that had to search the tree
    pub misses: u64,
    /// Successful route registrations
    pub inserts: u64,
    /// Successful route removals
    pub removals: u64,
    /// Tree searches performed
    pub searches: u64,
    /// Cache entries dropped for reaching their TTL
    pub expirations: u64,
    /// Cache entries dropped to make room
    pub evictions: u64,
    pub cache_size: usize,
    pub cache_max_size: usize,
    pub cache_ttl: Duration,
    pub cache_enabled: bool,
    pub route_count: usize,
    pub node_pool_free: usize,
    pub param_pool_free: usize,
}

impl RouterStats {
    /// Fraction of lookups served from the cache, 0.0 before any lookup
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
