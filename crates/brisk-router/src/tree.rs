//! The route tree: insertion, search and removal.

use crate::error::RouteError;
use crate::fast_path::FastPathTable;
use crate::method::Method;
use crate::node::{NodeId, NodeKind, RadixNode};
use crate::path;
use crate::pool::{NodePool, ParamPool, Params, PooledParams, DEFAULT_POOL_CAPACITY};
use crate::route::{Route, RouteMatch};
use smallvec::SmallVec;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PatternSegment<'a> {
    Static(&'a str),
    Param(&'a str),
    Wildcard,
}

type Pattern<'a> = SmallVec<[PatternSegment<'a>; 8]>;

/// Split and classify a route pattern. Runs before any mutation so a bad
/// pattern never leaves half-built branches behind.
fn parse_pattern(path: &str) -> Result<Pattern<'_>, RouteError> {
    let raw = path::split(path);
    let mut pattern = Pattern::with_capacity(raw.len());

    for (i, segment) in raw.iter().enumerate() {
        let parsed = if *segment == "*" {
            if i + 1 != raw.len() {
                return Err(RouteError::WildcardNotLast {
                    path: path::normalize(path).into_owned(),
                });
            }
            PatternSegment::Wildcard
        } else if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(RouteError::EmptyParameterName {
                    path: path::normalize(path).into_owned(),
                });
            }
            PatternSegment::Param(name)
        } else {
            PatternSegment::Static(segment)
        };
        pattern.push(parsed);
    }

    Ok(pattern)
}

/// Pops a parameter binding on scope exit unless [`Binding::keep`] was
/// called, so a failed branch never leaks a partial capture.
struct Binding<'p> {
    params: &'p mut Params,
    mark: usize,
    keep: bool,
}

impl<'p> Binding<'p> {
    fn push(params: &'p mut Params, name: Arc<str>, value: &str) -> Self {
        let mark = params.len();
        params.push((name, value.to_owned()));
        Self {
            params,
            mark,
            keep: false,
        }
    }

    fn params(&mut self) -> &mut Params {
        &mut *self.params
    }

    fn keep(mut self) {
        self.keep = true;
    }
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        if !self.keep {
            self.params.truncate(self.mark);
        }
    }
}

/// Segment trie keyed by path pattern, holding one route per method at each
/// terminal node.
///
/// ## Priority
/// At every level:
/// 1. Exact static match (highest)
/// 2. Parameter match
/// 3. Wildcard match (lowest)
///
/// A branch that fails deeper down falls back to the next kind at the same
/// level.
pub struct RadixTree<P> {
    nodes: NodePool<P>,
    root: NodeId,
    fast_paths: FastPathTable,
    params: Arc<ParamPool>,
    route_count: usize,
}

impl<P> RadixTree<P> {
    /// Create a tree with default pool capacities
    pub fn new() -> Self {
        Self::with_pool_capacity(DEFAULT_POOL_CAPACITY, DEFAULT_POOL_CAPACITY)
    }

    pub fn with_pool_capacity(node_capacity: usize, param_capacity: usize) -> Self {
        let mut nodes = NodePool::new(node_capacity);
        let root = nodes.acquire(NodeKind::default());
        Self {
            nodes,
            root,
            fast_paths: FastPathTable::new(),
            params: ParamPool::new(param_capacity),
            route_count: 0,
        }
    }

    /// Insert a route, returning the route it replaced for the same method
    /// and pattern.
    ///
    /// # Example
    /// ```
    /// use brisk_router::{Method, RadixTree};
    /// use std::sync::Arc;
    ///
    /// let mut tree = RadixTree::new();
    /// tree.insert(Method::Get, "/users/:id", Arc::new("get_user")).unwrap();
    /// assert!(tree.insert(Method::Post, "/users/:user_id", Arc::new("x")).is_err());
    /// ```
    pub fn insert(
        &mut self,
        method: Method,
        path: &str,
        payload: Arc<P>,
    ) -> Result<Option<Route<P>>, RouteError> {
        let pattern = parse_pattern(path)?;

        let mut current = self.root;
        for segment in &pattern {
            current = match *segment {
                PatternSegment::Static(literal) => self.static_child_or_insert(current, literal),
                PatternSegment::Param(name) => self.param_child_or_insert(current, name, path)?,
                PatternSegment::Wildcard => self.wildcard_child_or_insert(current),
            };
        }

        let replaced = self.nodes[current]
            .routes
            .insert(method, Route::new(method, payload));
        if replaced.is_none() {
            self.route_count += 1;
        }

        if let [PatternSegment::Static(literal)] = pattern.as_slice() {
            self.fast_paths.insert(method, literal, current);
        }

        Ok(replaced)
    }

    /// Find the route for `method` at a concrete request path.
    ///
    /// Single-segment paths try the fast-path table first. Everything else
    /// walks the tree; params are collected into a pooled buffer that goes
    /// back to the pool when the returned match is dropped.
    pub fn search(&self, method: Method, path: &str) -> Option<RouteMatch<P>> {
        let segments = path::split(path);

        if let [segment] = segments.as_slice() {
            if let Some(route) = self.fast_path(method, segment) {
                return Some(RouteMatch::new(route.clone(), PooledParams::empty()));
            }
        }

        let mut params = self.params.acquire();
        let route = self.search_node(self.root, &segments, method, &mut params)?;
        Some(RouteMatch::new(route.clone(), params))
    }

    fn fast_path(&self, method: Method, segment: &str) -> Option<&Route<P>> {
        let id = self.fast_paths.lookup(method, segment)?;
        self.nodes.get(id)?.routes.resolve(method)
    }

    fn search_node(
        &self,
        id: NodeId,
        segments: &[&str],
        method: Method,
        params: &mut Params,
    ) -> Option<&Route<P>> {
        let node = &self.nodes[id];
        let Some((segment, rest)) = segments.split_first() else {
            return node.routes.resolve(method);
        };

        // Priority 1: exact static match
        if let Some(child) = self.find_static_child(id, segment) {
            if let Some(route) = self.search_node(child, rest, method, params) {
                return Some(route);
            }
        }

        // Priority 2: parameter, unbound again if nothing deeper matches
        if let Some(child) = node.param_child {
            if let Some(name) = self.nodes[child].param_name() {
                let mut binding = Binding::push(params, Arc::clone(name), segment);
                if let Some(route) = self.search_node(child, rest, method, binding.params()) {
                    binding.keep();
                    return Some(route);
                }
            }
        }

        // Priority 3: wildcard swallows whatever is left
        node.wildcard_child
            .and_then(|child| self.nodes[child].routes.resolve(method))
    }

    /// Static child of `parent` whose literal is exactly `segment`.
    /// The bitmap, when present, rejects most misses before the scan.
    fn find_static_child(&self, parent: NodeId, segment: &str) -> Option<NodeId> {
        let node = &self.nodes[parent];
        if let Some(index) = &node.static_index {
            if !index.may_contain(segment) {
                return None;
            }
        }
        node.static_children
            .iter()
            .copied()
            .find(|child| self.nodes[*child].literal() == Some(segment))
    }

    fn static_child_or_insert(&mut self, parent: NodeId, literal: &str) -> NodeId {
        if let Some(child) = self.find_static_child(parent, literal) {
            return child;
        }
        let child = self.nodes.acquire(NodeKind::Static(literal.into()));
        self.nodes[parent].static_children.push(child);
        self.refresh_static_index(parent);
        child
    }

    fn param_child_or_insert(
        &mut self,
        parent: NodeId,
        name: &str,
        path: &str,
    ) -> Result<NodeId, RouteError> {
        if let Some(child) = self.nodes[parent].param_child {
            let existing = self.nodes[child].param_name().map(|n| &**n).unwrap_or_default();
            if existing != name {
                return Err(RouteError::ConflictingParameterName {
                    path: path::normalize(path).into_owned(),
                    existing: existing.to_string(),
                    requested: name.to_string(),
                });
            }
            return Ok(child);
        }
        let child = self.nodes.acquire(NodeKind::Param(Arc::from(name)));
        self.nodes[parent].param_child = Some(child);
        Ok(child)
    }

    fn wildcard_child_or_insert(&mut self, parent: NodeId) -> NodeId {
        if let Some(child) = self.nodes[parent].wildcard_child {
            return child;
        }
        let child = self.nodes.acquire(NodeKind::Wildcard);
        self.nodes[parent].wildcard_child = Some(child);
        child
    }

    fn refresh_static_index(&mut self, id: NodeId) {
        let first_bytes: SmallVec<[u8; 16]> = self.nodes[id]
            .static_children
            .iter()
            .filter_map(|c| self.nodes[*c].literal()?.as_bytes().first().copied())
            .collect();
        self.nodes[id].refresh_static_index(first_bytes);
    }

    /// Remove the route for `method` at an exact pattern (parameter names
    /// included). Branches left without routes or children are pruned right
    /// away and their nodes go back to the pool.
    pub fn remove(&mut self, method: Method, path: &str) -> Option<Route<P>> {
        let pattern = parse_pattern(path).ok()?;

        let mut trail: SmallVec<[NodeId; 16]> = SmallVec::new();
        let mut current = self.root;
        trail.push(current);
        for segment in &pattern {
            current = match *segment {
                PatternSegment::Static(literal) => self.find_static_child(current, literal)?,
                PatternSegment::Param(name) => {
                    let child = self.nodes[current].param_child?;
                    if self.nodes[child].param_name().map(|n| &**n) != Some(name) {
                        return None;
                    }
                    child
                }
                PatternSegment::Wildcard => self.nodes[current].wildcard_child?,
            };
            trail.push(current);
        }

        let removed = self.nodes[current].routes.remove(method)?;
        self.route_count -= 1;

        if let [PatternSegment::Static(literal)] = pattern.as_slice() {
            self.fast_paths.remove(method, literal);
        }

        self.prune(&trail);
        Some(removed)
    }

    fn prune(&mut self, trail: &[NodeId]) {
        for pair in trail.windows(2).rev() {
            let (parent, child) = (pair[0], pair[1]);
            if !self.nodes[child].is_empty() {
                break;
            }
            let was_static = self.nodes[child].literal().is_some();
            self.nodes[parent].unlink(child);
            self.nodes.release(child);
            if was_static {
                self.refresh_static_index(parent);
            }
        }
    }

    /// Drop every route and hand all nodes but the root back to the pool.
    pub fn clear(&mut self) {
        let mut stack: Vec<NodeId> = self.children_of(self.root).collect();
        while let Some(id) = stack.pop() {
            stack.extend(self.children_of(id));
            self.nodes.release(id);
        }
        self.nodes[self.root].reset(NodeKind::default());
        self.fast_paths.clear();
        self.route_count = 0;
    }

    fn children_of(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let node = &self.nodes[id];
        node.static_children
            .iter()
            .copied()
            .chain(node.param_child)
            .chain(node.wildcard_child)
    }

    /// Every registered (method, pattern) pair, depth-first.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut out = Vec::with_capacity(self.route_count);
        let mut prefix = String::new();
        self.collect_routes(self.root, &mut prefix, &mut out);
        out
    }

    fn collect_routes(&self, id: NodeId, prefix: &mut String, out: &mut Vec<(Method, String)>) {
        for (method, _) in self.nodes[id].routes.iter() {
            let pattern = if prefix.is_empty() { "/" } else { prefix.as_str() };
            out.push((method, pattern.to_string()));
        }
        for child in self.children_of(id) {
            let mark = prefix.len();
            prefix.push('/');
            match self.nodes[child].kind() {
                NodeKind::Static(literal) => prefix.push_str(literal),
                NodeKind::Param(name) => {
                    prefix.push(':');
                    prefix.push_str(name);
                }
                NodeKind::Wildcard => prefix.push('*'),
            }
            self.collect_routes(child, prefix, out);
            prefix.truncate(mark);
        }
    }

    /// Number of (method, pattern) routes stored
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }

    pub fn root(&self) -> &RadixNode<P> {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&RadixNode<P>> {
        self.nodes.get(id)
    }

    pub fn node_pool(&self) -> &NodePool<P> {
        &self.nodes
    }

    pub fn param_pool(&self) -> &Arc<ParamPool> {
        &self.params
    }

    pub fn fast_paths(&self) -> &FastPathTable {
        &self.fast_paths
    }
}

impl<P> Default for RadixTree<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> std::fmt::Debug for RadixTree<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RadixTree")
            .field("route_count", &self.route_count)
            .field("fast_paths", &self.fast_paths.len())
            .field("nodes", &self.nodes)
            .finish()
    }
}
