//! Node arena and hash-consing table.
//!
//! A `NodeCache` owns every node of every trie built in one session. Nodes are
//! appended and never mutated, and a node's children are always pushed before
//! the node itself, so every edge points to a smaller id and the arena cannot
//! hold a cycle.
//!
//! Two kinds of slot share the arena:
//! - **fresh** slots, allocated by the builder, one per inserted prefix;
//! - **canonical** slots, registered in the interning map. A canonical node
//!   only points at canonical children, so two canonical ids are equal iff
//!   the subtrees they root are structurally equal.
//!
//! Pass the cache around explicitly; there is no process-wide table.

use crate::error::{Error, Result};
use crate::node::Node;
use crate::types::{AcceptInfo, NodeId, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};

/// Size counters for a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// All slots in the arena (fresh and canonical).
    pub arena_nodes: usize,
    /// Canonical slots.
    pub interned_nodes: usize,
}

/// Arena plus interning map. See the module docs.
#[derive(Clone, Debug)]
pub struct NodeCache<I> {
    nodes: Vec<Node<I>>,
    canonical: Vec<bool>,
    interned: FxHashMap<Node<I>, NodeId>,
    empty: NodeId,
}

impl<I: AcceptInfo> Default for NodeCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: AcceptInfo> NodeCache<I> {
    /// New cache holding only the canonical empty node.
    #[must_use]
    pub fn new() -> Self {
        let empty: Node<I> = Node::empty();
        let mut interned = FxHashMap::default();
        interned.insert(empty.clone(), NodeId(0));
        Self {
            nodes: vec![empty],
            canonical: vec![true],
            interned,
            empty: NodeId(0),
        }
    }

    /// The canonical empty node: neutral element of `merge` and the stand-in
    /// for missing branches while diffing.
    #[inline]
    #[must_use]
    pub const fn empty(&self) -> NodeId {
        self.empty
    }

    /// Node behind `id`, if this cache issued it.
    #[inline]
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node<I>> {
        self.nodes.get(id.index())
    }

    /// Node behind `id`.
    ///
    /// # Panics
    /// Panics if `id` was not issued by this cache.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node<I> {
        &self.nodes[id.index()]
    }

    /// Whether `id` is a registered canonical node.
    #[inline]
    #[must_use]
    pub fn is_canonical(&self, id: NodeId) -> bool {
        self.canonical.get(id.index()).copied().unwrap_or(false)
    }

    /// Check that `id` belongs to this cache.
    pub fn check(&self, id: NodeId) -> Result<NodeId> {
        if id.index() < self.nodes.len() {
            Ok(id)
        } else {
            Err(Error::UnknownNode(id.0))
        }
    }

    /// Arena and interning sizes.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            arena_nodes: self.nodes.len(),
            interned_nodes: self.interned.len(),
        }
    }

    fn next_id(&self) -> Result<NodeId> {
        u32::try_from(self.nodes.len())
            .ok()
            .filter(|&raw| raw < u32::MAX)
            .map(NodeId)
            .ok_or(Error::ArenaFull(self.nodes.len()))
    }

    /// Append a fresh, non-canonical node.
    pub(crate) fn alloc(&mut self, node: Node<I>) -> Result<NodeId> {
        debug_assert!(node.has_valid_shape());
        let id = self.next_id()?;
        self.nodes.push(node);
        self.canonical.push(false);
        Ok(id)
    }

    /// Return the canonical id for `node`, registering it if new.
    ///
    /// All children of `node` must already be canonical.
    pub(crate) fn intern(&mut self, node: Node<I>) -> Result<NodeId> {
        debug_assert!(node.has_valid_shape());
        debug_assert!(node.transitions().iter().all(|&(_, c)| self.is_canonical(c)));
        if let Some(&id) = self.interned.get(&node) {
            return Ok(id);
        }
        let id = self.next_id()?;
        self.nodes.push(node.clone());
        self.canonical.push(true);
        self.interned.insert(node, id);
        Ok(id)
    }

    /// Number of distinct nodes reachable from `root` (root included).
    ///
    /// # Panics
    /// Panics if `root` was not issued by this cache.
    #[must_use]
    pub fn unique_nodes(&self, root: NodeId) -> usize {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            stack.extend(
                self.node(id)
                    .transitions()
                    .iter()
                    .map(|&(_, c)| c)
                    .filter(|c| !seen.contains(c)),
            );
        }
        seen.len()
    }

    /// Every accepted `(path, info)` pair below `root`, in pre-order with
    /// ascending symbols. Shared subtrees are enumerated once per path.
    ///
    /// # Panics
    /// Panics if `root` was not issued by this cache.
    #[must_use]
    pub fn accept_sequences(&self, root: NodeId) -> Vec<(Vec<Symbol>, I)> {
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, Vec<Symbol>)> = vec![(root, Vec::new())];
        while let Some((id, path)) = stack.pop() {
            let node = self.node(id);
            for &(sym, child) in node.transitions().iter().rev() {
                let mut p = path.clone();
                p.push(sym);
                stack.push((child, p));
            }
            if let Some(info) = node.accept_info() {
                out.push((path, info.clone()));
            }
        }
        out
    }

    /// Run concrete `bytes` through the automaton and return the accept info
    /// of the node reached at the end, if it accepts. A foreign `root` matches
    /// nothing.
    #[must_use]
    pub fn lookup(&self, root: NodeId, bytes: &[u8]) -> Option<&I> {
        let mut node = self.get(root)?;
        for &b in bytes {
            node = self.get(node.step(b)?)?;
        }
        node.accept_info()
    }

    /// Longest accepted prefix of `bytes`, as `(length, info)`. A foreign
    /// `root` matches nothing.
    #[must_use]
    pub fn longest_match(&self, root: NodeId, bytes: &[u8]) -> Option<(usize, &I)> {
        let mut node = self.get(root)?;
        let mut best = node.accept_info().map(|i| (0, i));
        for (n, &b) in bytes.iter().enumerate() {
            match node.step(b).and_then(|next| self.get(next)) {
                Some(next) => node = next,
                None => break,
            }
            if let Some(info) = node.accept_info() {
                best = Some((n + 1, info));
            }
        }
        best
    }
}
