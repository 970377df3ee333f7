//! brisk-router: Arena-backed segment trie for HTTP route matching
//!
//! The data structure behind `brisk-core`'s `Router`. Usable on its own when
//! caching and locking are handled elsewhere.
//!
//! ## Features
//! - O(k) lookup where k = number of path segments
//! - Static paths: `/users`, `/api/v1/health`
//! - Parameters: `/users/:id`, `/posts/:postId/comments/:commentId`
//! - Wildcards: `/files/*`, `/static/*`
//! - Per-method routes at every node, with `ALL` as fallback
//! - Bitmap pre-filter on nodes with many static children
//! - Pooled nodes and parameter buffers
//!
//! ## Path Syntax
//! - `:name` - Named parameter (captures one segment)
//! - `*` - Wildcard (matches one or more remaining segments, captures nothing)
//!
//! Anything else, `*name` included, is a literal.
//!
//! ## Priority
//! 1. Exact static match (highest)
//! 2. Parameter match
//! 3. Wildcard match (lowest)
//!
//! ## Example
//! ```
//! use brisk_router::{Method, RadixTree};
//! use std::sync::Arc;
//!
//! let mut tree = RadixTree::new();
//! tree.insert(Method::Get, "/users", Arc::new(0)).unwrap();
//! tree.insert(Method::Get, "/users/:id", Arc::new(1)).unwrap();
//! tree.insert(Method::Get, "/files/*", Arc::new(2)).unwrap();
//!
//! let m = tree.search(Method::Get, "/users/123").unwrap();
//! assert_eq!(*m.payload(), 1);
//! assert_eq!(m.param("id"), Some("123"));
//!
//! assert_eq!(*tree.search(Method::Get, "/files/a/b").unwrap().payload(), 2);
//! ```

pub mod bitmap;
pub mod error;
pub mod fast_path;
pub mod method;
pub mod node;
pub mod path;
pub mod pool;
pub mod route;
pub mod tree;

pub use bitmap::{StaticChildIndex, STATIC_INDEX_THRESHOLD};
pub use error::RouteError;
pub use fast_path::FastPathTable;
pub use method::{Method, MethodMap};
pub use node::{NodeId, NodeKind, RadixNode};
pub use pool::{NodePool, ParamPool, Params, PooledParams, DEFAULT_POOL_CAPACITY};
pub use route::{Route, RouteMatch};
pub use tree::RadixTree;
