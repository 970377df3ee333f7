//! Root-level shortcut table for single-segment static routes.
//!
//! Conceptually keyed by `"METHOD:segment"`. Stored as one map per method so
//! a probe needs no key formatting.

use crate::method::Method;
use crate::node::NodeId;
use std::collections::HashMap;

#[derive(Debug)]
pub struct FastPathTable {
    by_method: [HashMap<Box<str>, NodeId>; Method::COUNT],
}

impl Default for FastPathTable {
    fn default() -> Self {
        Self {
            by_method: std::array::from_fn(|_| HashMap::new()),
        }
    }
}

impl FastPathTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: Method, segment: &str, node: NodeId) {
        self.by_method[method.index()].insert(segment.into(), node);
    }

    pub fn remove(&mut self, method: Method, segment: &str) -> Option<NodeId> {
        self.by_method[method.index()].remove(segment)
    }

    /// Exact entry for `method`, else the `All` entry.
    #[inline]
    pub fn lookup(&self, method: Method, segment: &str) -> Option<NodeId> {
        self.by_method[method.index()]
            .get(segment)
            .or_else(|| self.by_method[Method::All.index()].get(segment))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_method.iter().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.iter().all(HashMap::is_empty)
    }

    pub fn clear(&mut self) {
        self.by_method.iter_mut().for_each(HashMap::clear);
    }
}
