//! Object pools for tree nodes and parameter buffers.
//!
//! Both pools are bounded free-lists with a soft cap: running dry falls back
//! to a fresh allocation, and releasing into a full pool drops the object.
//! Neither condition is an error.

use crate::node::{NodeId, NodeKind, RadixNode};
use parking_lot::Mutex;
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::sync::Arc;

/// Default soft cap for both pools
pub const DEFAULT_POOL_CAPACITY: usize = 1000;

/// Initial capacity of a freshly allocated param buffer.
/// Most REST routes carry at most a handful of path params.
pub const INLINE_PARAMS: usize = 8;

/// Captured (name, value) pairs in path order
pub type Params = Vec<(Arc<str>, String)>;

enum Slot<P> {
    /// Reachable from the tree
    Live(RadixNode<P>),
    /// Reset and parked on the free-list
    Free(RadixNode<P>),
    /// Storage dropped; only the index is recycled
    Vacant,
}

/// Arena of tree nodes with a bounded free-list.
///
/// `acquire` hands out a [`NodeId`]; `release` returns it. Indexing a
/// released id panics, the same way indexing past the end of a `Vec` does.
pub struct NodePool<P> {
    slots: Vec<Slot<P>>,
    free: Vec<NodeId>,
    vacant: Vec<NodeId>,
    capacity: usize,
    live: usize,
}

impl<P> NodePool<P> {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::with_capacity(capacity.min(DEFAULT_POOL_CAPACITY)),
            vacant: Vec::new(),
            capacity,
            live: 0,
        }
    }

    /// Take a node for `kind`, reusing a pooled one when available.
    pub fn acquire(&mut self, kind: NodeKind) -> NodeId {
        self.live += 1;

        if let Some(id) = self.free.pop() {
            let slot = &mut self.slots[id.index()];
            let mut node = match mem::replace(slot, Slot::Vacant) {
                Slot::Free(node) => node,
                // free-list only ever holds parked nodes
                _ => RadixNode::default(),
            };
            node.reset(kind);
            *slot = Slot::Live(node);
            return id;
        }

        let node = Slot::Live(RadixNode::new(kind));
        if let Some(id) = self.vacant.pop() {
            self.slots[id.index()] = node;
            return id;
        }

        let id = NodeId::new(self.slots.len() as u32);
        self.slots.push(node);
        id
    }

    /// Return a node. Its children are not released; callers walk the
    /// subtree themselves.
    pub fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            return;
        };
        let node = match mem::replace(slot, Slot::Vacant) {
            Slot::Live(node) => node,
            other => {
                // double release: leave the slot as it was
                *slot = other;
                return;
            }
        };
        self.live -= 1;

        if self.free.len() < self.capacity {
            let mut node = node;
            node.reset(NodeKind::default());
            *slot = Slot::Free(node);
            self.free.push(id);
        } else {
            self.vacant.push(id);
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&RadixNode<P>> {
        match self.slots.get(id.index()) {
            Some(Slot::Live(node)) => Some(node),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut RadixNode<P>> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Live(node)) => Some(node),
            _ => None,
        }
    }

    /// Nodes currently parked for reuse
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Nodes currently reachable from a tree
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<P> Index<NodeId> for NodePool<P> {
    type Output = RadixNode<P>;

    #[inline]
    fn index(&self, id: NodeId) -> &RadixNode<P> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}

impl<P> IndexMut<NodeId> for NodePool<P> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut RadixNode<P> {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("node {id:?} is not live"),
        }
    }
}

impl<P> fmt::Debug for NodePool<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodePool")
            .field("slots", &self.slots.len())
            .field("live", &self.live)
            .field("free", &self.free.len())
            .field("vacant", &self.vacant.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Shared pool of parameter buffers.
///
/// Lookups on different threads only contend for the push/pop itself.
#[derive(Debug)]
pub struct ParamPool {
    free: Mutex<Vec<Params>>,
    capacity: usize,
}

impl ParamPool {
    pub fn new(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            free: Mutex::new(Vec::with_capacity(capacity.min(DEFAULT_POOL_CAPACITY))),
            capacity,
        })
    }

    /// Borrow an empty buffer; it comes back on drop.
    pub fn acquire(self: &Arc<Self>) -> PooledParams {
        let params = self
            .free
            .lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(INLINE_PARAMS));
        PooledParams {
            params,
            pool: Some(Arc::clone(self)),
        }
    }

    fn release(&self, mut params: Params) {
        params.clear();
        let mut free = self.free.lock();
        if free.len() < self.capacity {
            free.push(params);
        }
    }

    /// Buffers currently parked for reuse
    pub fn free_count(&self) -> usize {
        self.free.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Parameter buffer on loan from a [`ParamPool`]
pub struct PooledParams {
    params: Params,
    pool: Option<Arc<ParamPool>>,
}

impl PooledParams {
    /// An empty buffer not tied to any pool. Does not allocate.
    pub fn empty() -> Self {
        Self {
            params: Vec::new(),
            pool: None,
        }
    }

    /// Wrap owned values that never go back to a pool.
    pub fn detached(params: Params) -> Self {
        Self { params, pool: None }
    }

    /// Take the values out; the pool gets nothing back.
    pub fn into_inner(mut self) -> Params {
        self.pool = None;
        mem::take(&mut self.params)
    }
}

impl Deref for PooledParams {
    type Target = Params;

    fn deref(&self) -> &Params {
        &self.params
    }
}

impl DerefMut for PooledParams {
    fn deref_mut(&mut self) -> &mut Params {
        &mut self.params
    }
}

impl Drop for PooledParams {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.release(mem::take(&mut self.params));
        }
    }
}

impl fmt::Debug for PooledParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.params.iter()).finish()
    }
}
