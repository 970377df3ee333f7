//! Router configuration
//!
//! [`RouterConfig`] is fixed at construction. [`CacheConfig`] is a partial
//! update applied at runtime through `Router::configure_caching`.
//!
//! ## Environment Variables
//!
//! [`RouterConfig::from_env`] overlays these on the defaults:
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `BRISK_ROUTE_CACHE` | `on`/`off` (also `1`/`0`, `true`/`false`) | `on` |
//! | `BRISK_ROUTE_CACHE_MAX` | maximum cached lookups | `10000` |
//! | `BRISK_ROUTE_CACHE_TTL_MS` | entry lifetime in ms, `0` disables caching | `60000` |
//! | `BRISK_NODE_POOL_CAPACITY` | pooled tree nodes kept for reuse | `1000` |
//! | `BRISK_PARAM_POOL_CAPACITY` | pooled param buffers kept for reuse | `1000` |
//!
//! Unparseable values are ignored with a warning.

use brisk_router::DEFAULT_POOL_CAPACITY;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_CACHE_MAX_SIZE: usize = 10_000;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(300);

pub const ENV_CACHE: &str = "BRISK_ROUTE_CACHE";
pub const ENV_CACHE_MAX: &str = "BRISK_ROUTE_CACHE_MAX";
pub const ENV_CACHE_TTL_MS: &str = "BRISK_ROUTE_CACHE_TTL_MS";
pub const ENV_NODE_POOL_CAPACITY: &str = "BRISK_NODE_POOL_CAPACITY";
pub const ENV_PARAM_POOL_CAPACITY: &str = "BRISK_PARAM_POOL_CAPACITY";

/// Effective cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub enabled: bool,
    pub max_size: usize,
    pub ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_size: DEFAULT_CACHE_MAX_SIZE,
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl CacheSettings {
    /// Whether lookups go through the cache at all
    pub fn is_active(&self) -> bool {
        self.enabled && !self.ttl.is_zero() && self.max_size > 0
    }

    /// Overlay the fields set in `update`
    pub fn apply(&mut self, update: &CacheConfig) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(max_size) = update.max_size {
            self.max_size = max_size;
        }
        if let Some(ttl) = update.ttl {
            self.ttl = ttl;
        }
    }
}

/// Partial cache update; `None` leaves a setting unchanged.
///
/// ```
/// use brisk_core::CacheConfig;
///
/// let update = CacheConfig::new().max_size(500).ttl_seconds(10);
/// assert_eq!(update.enabled, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheConfig {
    pub enabled: Option<bool>,
    pub max_size: Option<usize>,
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn max_size(mut self, max: usize) -> Self {
        self.max_size = Some(max);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl = Some(Duration::from_secs(seconds));
        self
    }
}

/// Construction-time router configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Released tree nodes kept for reuse (default: 1000)
    pub node_pool_capacity: usize,
    /// Released param buffers kept for reuse (default: 1000)
    pub param_pool_capacity: usize,
    pub cache: CacheSettings,
    /// How often the miss path purges expired entries (default: 5 minutes)
    pub sweep_interval: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            node_pool_capacity: DEFAULT_POOL_CAPACITY,
            param_pool_capacity: DEFAULT_POOL_CAPACITY,
            cache: CacheSettings::default(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

impl RouterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `BRISK_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each variable name
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_CACHE) {
            match parse_switch(&raw) {
                Some(enabled) => config.cache.enabled = enabled,
                None => warn!(var = ENV_CACHE, value = %raw, "ignoring unrecognised switch"),
            }
        }
        if let Some(max) = parse_var(&lookup, ENV_CACHE_MAX) {
            config.cache.max_size = max;
        }
        if let Some(ms) = parse_var(&lookup, ENV_CACHE_TTL_MS) {
            config.cache.ttl = Duration::from_millis(ms);
        }
        if let Some(cap) = parse_var(&lookup, ENV_NODE_POOL_CAPACITY) {
            config.node_pool_capacity = cap;
        }
        if let Some(cap) = parse_var(&lookup, ENV_PARAM_POOL_CAPACITY) {
            config.param_pool_capacity = cap;
        }

        config
    }

    pub fn node_pool_capacity(mut self, capacity: usize) -> Self {
        self.node_pool_capacity = capacity;
        self
    }

    pub fn param_pool_capacity(mut self, capacity: usize) -> Self {
        self.param_pool_capacity = capacity;
        self
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache.enabled = enabled;
        self
    }

    pub fn cache_max_size(mut self, max: usize) -> Self {
        self.cache.max_size = max;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache.ttl = ttl;
        self
    }

    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "1" | "true" | "yes" => Some(true),
        "off" | "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(var = key, value = %raw, "ignoring unparseable value");
            None
        }
    }
}
