//! Stored routes and match results

use crate::method::Method;
use crate::pool::PooledParams;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A registered route: the verb it was registered under and its payload.
///
/// The payload is opaque to the router and shared through an `Arc`, so
/// cloning a route never clones `P`.
#[derive(PartialEq)]
pub struct Route<P> {
    pub method: Method,
    pub payload: Arc<P>,
}

impl<P> Route<P> {
    pub fn new(method: Method, payload: Arc<P>) -> Self {
        Self { method, payload }
    }
}

impl<P> Clone for Route<P> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            payload: Arc::clone(&self.payload),
        }
    }
}

impl<P: fmt::Debug> fmt::Debug for Route<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("payload", &self.payload)
            .finish()
    }
}

/// Route match result
///
/// `params` is borrowed from the router's param pool and goes back to it when
/// the match is dropped. Copy the values out ([`RouteMatch::params_map`])
/// to keep them longer.
pub struct RouteMatch<P> {
    /// The matched route
    pub route: Route<P>,
    /// Captured path parameters as (name, value) pairs, in path order
    pub params: PooledParams,
}

impl<P> RouteMatch<P> {
    pub fn new(route: Route<P>, params: PooledParams) -> Self {
        Self { route, params }
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.route.payload
    }

    /// Get a path parameter by name
    #[inline]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get params as HashMap for convenient access. Allocates.
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Copy the params into an exact-size buffer of their own and hand the
    /// pooled buffer back. Use before keeping a match around.
    pub fn detach(self) -> Self {
        let RouteMatch { route, params } = self;
        let owned = PooledParams::detached(params.to_vec());
        drop(params);
        Self {
            route,
            params: owned,
        }
    }

    /// Owned copy of the params, detached from the pool
    pub fn to_owned_params(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

impl<P: fmt::Debug> fmt::Debug for RouteMatch<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("route", &self.route)
            .field("params", &*self.params)
            .finish()
    }
}
