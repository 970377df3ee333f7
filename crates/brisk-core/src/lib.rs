//! brisk-core: HTTP-method-aware route dispatcher
//!
//! Maps an incoming `(method, path)` pair to a registered payload plus the
//! path parameters it captured. Built on the `brisk-router` tree, with a
//! bounded TTL result cache in front and pooled parameter buffers behind.
//!
//! ## Path Syntax
//! - `/users` - static segment
//! - `/users/:id` - named parameter, captures one segment
//! - `/files/*` - wildcard, matches one or more trailing segments
//!
//! Static beats parameter beats wildcard at every level.
//!
//! ## Configuration
//! See [`RouterConfig`] for construction-time settings (including
//! `BRISK_*` environment variables) and [`CacheConfig`] for runtime cache
//! tuning.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod error;
pub mod router;
pub mod stats;

// Re-exports
pub use cache::{CacheLookup, RouteCache, SharedMatch};
pub use config::{CacheConfig, CacheSettings, RouterConfig};
pub use error::{Error, Result};
pub use router::Router;
pub use stats::RouterStats;

pub use brisk_router::{Method, Route, RouteError, RouteMatch};
