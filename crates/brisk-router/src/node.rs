//! Tree nodes.
//!
//! Nodes live in the [`NodePool`](crate::pool::NodePool) arena and refer to
//! their children by [`NodeId`]. Every node is owned by exactly one slot of
//! its parent (a static child entry, the param child or the wildcard child).

use crate::bitmap::{StaticChildIndex, STATIC_INDEX_THRESHOLD};
use crate::method::MethodMap;
use crate::route::Route;
use smallvec::SmallVec;
use std::sync::Arc;

/// Handle to a node in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline(always)]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Exact literal segment
    Static(Box<str>),
    /// `:name`, captures one segment
    Param(Arc<str>),
    /// `*`, swallows the remaining segments
    Wildcard,
}

impl Default for NodeKind {
    fn default() -> Self {
        // The root is modelled as an empty literal
        NodeKind::Static(Box::from(""))
    }
}

/// A single position in the route tree
#[derive(Debug)]
pub struct RadixNode<P> {
    pub(crate) kind: NodeKind,
    pub(crate) static_children: SmallVec<[NodeId; 4]>,
    pub(crate) param_child: Option<NodeId>,
    pub(crate) wildcard_child: Option<NodeId>,
    pub(crate) routes: MethodMap<Route<P>>,
    pub(crate) static_index: Option<StaticChildIndex>,
}

impl<P> RadixNode<P> {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            static_children: SmallVec::new(),
            param_child: None,
            wildcard_child: None,
            routes: MethodMap::new(),
            static_index: None,
        }
    }

    /// Wipe everything so the node can stand in for an unrelated position.
    /// Keeps the child list's heap buffer if it spilled.
    pub fn reset(&mut self, kind: NodeKind) {
        self.kind = kind;
        self.static_children.clear();
        self.param_child = None;
        self.wildcard_child = None;
        self.routes.clear();
        self.static_index = None;
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn literal(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Static(lit) => Some(&**lit),
            _ => None,
        }
    }

    pub fn param_name(&self) -> Option<&Arc<str>> {
        match &self.kind {
            NodeKind::Param(name) => Some(name),
            _ => None,
        }
    }

    pub fn routes(&self) -> &MethodMap<Route<P>> {
        &self.routes
    }

    pub fn static_children(&self) -> &[NodeId] {
        &self.static_children
    }

    pub fn param_child(&self) -> Option<NodeId> {
        self.param_child
    }

    pub fn wildcard_child(&self) -> Option<NodeId> {
        self.wildcard_child
    }

    pub fn static_index(&self) -> Option<&StaticChildIndex> {
        self.static_index.as_ref()
    }

    pub fn has_children(&self) -> bool {
        !self.static_children.is_empty() || self.param_child.is_some() || self.wildcard_child.is_some()
    }

    /// No routes and no children: safe to prune.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && !self.has_children()
    }

    /// Rebuild or drop the first-byte index after the static children changed.
    /// Takes the first bytes because the child literals live in other slots.
    pub(crate) fn refresh_static_index<I>(&mut self, first_bytes: I)
    where
        I: IntoIterator<Item = u8>,
    {
        self.static_index = if self.static_children.len() > STATIC_INDEX_THRESHOLD {
            Some(first_bytes.into_iter().collect())
        } else {
            None
        };
    }

    /// Detach `child` from whichever slot holds it.
    pub(crate) fn unlink(&mut self, child: NodeId) -> bool {
        if self.param_child == Some(child) {
            self.param_child = None;
            return true;
        }
        if self.wildcard_child == Some(child) {
            self.wildcard_child = None;
            return true;
        }
        match self.static_children.iter().position(|c| *c == child) {
            Some(pos) => {
                self.static_children.remove(pos);
                true
            }
            None => false,
        }
    }
}

impl<P> Default for RadixNode<P> {
    fn default() -> Self {
        Self::new(NodeKind::default())
    }
}
