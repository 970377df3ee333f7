//! Cached, thread-safe route dispatcher
//!
//! Wraps a [`RadixTree`] in a read-write lock and fronts it with a
//! [`RouteCache`]. Registration and removal take the write lock and clear
//! the cache before releasing it; lookups search under the read lock and
//! record their result before releasing it, so a result computed against an
//! old tree can never land in the cache after an invalidation.

use crate::cache::{CacheLookup, RouteCache, SharedMatch};
use crate::config::{CacheConfig, CacheSettings, RouterConfig};
use crate::error::Result;
use crate::stats::{DispatchCounters, RouterStats};
use brisk_router::{Method, RadixTree};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// HTTP route dispatcher
///
/// Routes are stored per method at each tree position, so one path shape can
/// carry a different payload for each verb. [`Method::All`] registers a
/// fallback used only when the requested verb has no route of its own.
///
/// ```
/// use brisk_core::{Method, Router};
///
/// let router = Router::new();
/// router.get("/users/:id", "show_user").unwrap();
/// router.all("/health", "health").unwrap();
///
/// let m = router.find_route(Method::Get, "/users/42").unwrap();
/// assert_eq!(*m.payload(), "show_user");
/// assert_eq!(m.param("id"), Some("42"));
///
/// assert!(router.find_route(Method::Head, "/health").is_some());
/// assert!(router.find_route(Method::Post, "/users/42").is_none());
/// ```
pub struct Router<P> {
    tree: RwLock<RadixTree<P>>,
    cache: RouteCache<P>,
    counters: DispatchCounters,
}

impl<P> Router<P> {
    /// Create a router with default settings
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router configured from `BRISK_*` environment variables
    pub fn from_env() -> Self {
        Self::with_config(RouterConfig::from_env())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        debug!(
            node_pool_capacity = config.node_pool_capacity,
            param_pool_capacity = config.param_pool_capacity,
            cache_enabled = config.cache.enabled,
            cache_max_size = config.cache.max_size,
            cache_ttl_ms = config.cache.ttl.as_millis() as u64,
            "creating router"
        );
        Self {
            tree: RwLock::new(RadixTree::with_pool_capacity(
                config.node_pool_capacity,
                config.param_pool_capacity,
            )),
            cache: RouteCache::new(config.cache, config.sweep_interval),
            counters: DispatchCounters::default(),
        }
    }

    /// Register `payload` for `method` at `path`, replacing any route already
    /// registered there for the same method.
    pub fn add_route(&self, method: Method, path: &str, payload: P) -> Result<()> {
        let mut tree = self.tree.write();
        let replaced = match tree.insert(method, path, Arc::new(payload)) {
            Ok(replaced) => replaced,
            Err(err) => {
                warn!(%method, path, error = %err, "route rejected");
                return Err(err.into());
            }
        };
        self.counters.inserts.inc();
        let invalidated = self.cache.clear();
        drop(tree);

        debug!(
            %method,
            path,
            replaced = replaced.is_some(),
            invalidated,
            "route registered"
        );
        Ok(())
    }

    /// Add a GET route
    pub fn get(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Get, path, payload)
    }

    /// Add a POST route
    pub fn post(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Post, path, payload)
    }

    /// Add a PUT route
    pub fn put(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Put, path, payload)
    }

    /// Add a DELETE route
    pub fn delete(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Delete, path, payload)
    }

    /// Add a PATCH route
    pub fn patch(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Patch, path, payload)
    }

    /// Add a HEAD route
    pub fn head(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Head, path, payload)
    }

    /// Add an OPTIONS route
    pub fn options(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::Options, path, payload)
    }

    /// Add a fallback route matched by any method without its own route
    pub fn all(&self, path: &str, payload: P) -> Result<()> {
        self.add_route(Method::All, path, payload)
    }

    /// Resolve a request.
    ///
    /// Cache hits return a clone of the stored `Arc`; misses search the tree
    /// and cache the outcome, including "not found". Cached matches carry a
    /// private copy of their params, so the pooled buffer goes straight back
    /// to the pool. With caching off the pooled buffer is handed out as is.
    pub fn find_route(&self, method: Method, path: &str) -> Option<SharedMatch<P>> {
        let cacheable = match self.cache.get(method, path) {
            CacheLookup::Hit(found) => {
                self.counters.hits.inc();
                return Some(found);
            }
            CacheLookup::NegativeHit => {
                self.counters.hits.inc();
                return None;
            }
            CacheLookup::Miss => true,
            CacheLookup::Disabled => false,
        };
        self.counters.misses.inc();

        let tree = self.tree.read();
        self.counters.searches.inc();
        let found = tree.search(method, path);
        trace!(%method, path, found = found.is_some(), "route search");

        if !cacheable {
            return found.map(Arc::new);
        }

        let result = found.map(|m| Arc::new(m.detach()));
        self.cache.insert(method, path, result.clone());
        drop(tree);
        result
    }

    /// Resolve using a textual method (case-insensitive)
    pub fn find_route_str(&self, method: &str, path: &str) -> Result<Option<SharedMatch<P>>> {
        let method: Method = method.parse()?;
        Ok(self.find_route(method, path))
    }

    /// Remove the route for `method` at an exact pattern, as registered.
    /// Returns whether anything was removed.
    pub fn remove_route(&self, method: Method, path: &str) -> bool {
        let mut tree = self.tree.write();
        if tree.remove(method, path).is_none() {
            return false;
        }
        self.counters.removals.inc();
        let invalidated = self.cache.clear();
        drop(tree);

        debug!(%method, path, invalidated, "route removed");
        true
    }

    /// Drop every route
    pub fn clear_routes(&self) {
        let mut tree = self.tree.write();
        let dropped = tree.route_count();
        tree.clear();
        let invalidated = self.cache.clear();
        drop(tree);

        debug!(dropped, invalidated, "routes cleared");
    }

    /// Change cache settings at runtime; fields left `None` keep their value.
    pub fn configure_caching(&self, update: CacheConfig) -> CacheSettings {
        let settings = self.cache.reconfigure(&update);
        info!(
            enabled = settings.enabled,
            max_size = settings.max_size,
            ttl_ms = settings.ttl.as_millis() as u64,
            "route cache reconfigured"
        );
        settings
    }

    pub fn clear_cache(&self) {
        let invalidated = self.cache.clear();
        debug!(invalidated, "route cache cleared");
    }

    /// Purge expired cache entries now instead of waiting for the periodic sweep
    pub fn sweep_expired(&self) -> usize {
        let purged = self.cache.sweep_expired();
        trace!(purged, "route cache swept");
        purged
    }

    pub fn cache_settings(&self) -> CacheSettings {
        self.cache.settings()
    }

    pub fn route_count(&self) -> usize {
        self.tree.read().route_count()
    }

    /// Every registered (method, pattern) pair
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.tree.read().routes()
    }

    pub fn stats(&self) -> RouterStats {
        let (route_count, node_pool_free, param_pool_free) = {
            let tree = self.tree.read();
            (
                tree.route_count(),
                tree.node_pool().free_count(),
                tree.param_pool().free_count(),
            )
        };
        let settings = self.cache.settings();

        RouterStats {
            hits: self.counters.hits.get(),
            misses: self.counters.misses.get(),
            inserts: self.counters.inserts.get(),
            removals: self.counters.removals.get(),
            searches: self.counters.searches.get(),
            expirations: self.cache.expirations(),
            evictions: self.cache.evictions(),
            cache_size: self.cache.len(),
            cache_max_size: settings.max_size,
            cache_ttl: settings.ttl,
            cache_enabled: settings.is_active(),
            route_count,
            node_pool_free,
            param_pool_free,
        }
    }
}

impl<P> Default for Router<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for Router<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("tree", &*self.tree.read())
            .field("cache", &self.cache)
            .finish()
    }
}
