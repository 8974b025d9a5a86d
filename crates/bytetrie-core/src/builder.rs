//! Uncompressed trie construction.
//!
//! Insertion is persistent: the nodes along the inserted path are copied and
//! a new root is returned, so every earlier root still denotes its own trie.
//! New nodes are fresh (not interned); one trie version is a plain tree with
//! one node per distinct prefix.
//!
//! Bulk loads go through a [`TrieBatch`], which edits a private scratch tree
//! and writes each final node to the arena once, children first.

use crate::cache::NodeCache;
use crate::error::{Error, Result};
use crate::node::{edge_fits, Node};
use crate::types::{AcceptInfo, NodeId, Symbol};
use tracing::debug;

/// Child of a scratch node: either an untouched arena node or another draft.
#[derive(Clone, Copy, Debug)]
enum Slot {
    Built(NodeId),
    Draft(usize),
}

#[derive(Debug)]
struct Draft<I> {
    accept: Option<I>,
    edges: Vec<(Symbol, Slot)>,
}

/// Mutable scratch trie layered over an existing root.
///
/// Inserts edit drafts in place; arena nodes are only copied into a draft the
/// first time a path passes through them. A draft's children always have
/// larger draft indices than the draft itself, which [`TrieBatch::finish`]
/// relies on to allocate children before parents.
#[derive(Debug)]
pub struct TrieBatch<'c, I> {
    cache: &'c mut NodeCache<I>,
    base: NodeId,
    drafts: Vec<Draft<I>>,
}

impl<I: AcceptInfo> TrieBatch<'_, I> {
    fn open(&mut self, id: NodeId) -> usize {
        let node = self.cache.node(id);
        let draft = Draft {
            accept: node.accept_info().cloned(),
            edges: node
                .transitions()
                .iter()
                .map(|&(sym, child)| (sym, Slot::Built(child)))
                .collect(),
        };
        self.drafts.push(draft);
        self.drafts.len() - 1
    }

    /// Add `sequence` with payload `info`; the last write of a sequence wins.
    ///
    /// A rejected sequence leaves the batch unchanged and usable.
    pub fn insert(&mut self, sequence: &[Symbol], info: I) -> Result<()> {
        if self.drafts.is_empty() {
            let base = self.base;
            self.open(base);
        }
        let mut cur = 0;
        for (depth, &sym) in sequence.iter().enumerate() {
            let edges = &self.drafts[cur].edges;
            cur = match edges.binary_search_by_key(&sym, |&(s, _)| s) {
                Ok(pos) => {
                    let slot = edges[pos].1;
                    match slot {
                        Slot::Draft(d) => d,
                        Slot::Built(id) => {
                            let d = self.open(id);
                            self.drafts[cur].edges[pos].1 = Slot::Draft(d);
                            d
                        }
                    }
                }
                Err(_) if !edge_fits(edges, sym) => {
                    return Err(Error::WildcardConflict {
                        path: sequence[..depth].to_vec(),
                    })
                }
                Err(pos) => {
                    let d = self.drafts.len();
                    self.drafts.push(Draft {
                        accept: None,
                        edges: Vec::new(),
                    });
                    self.drafts[cur].edges.insert(pos, (sym, Slot::Draft(d)));
                    d
                }
            };
        }
        self.drafts[cur].accept = Some(info);
        Ok(())
    }

    /// Write the scratch tree to the arena and return its root.
    ///
    /// An untouched batch returns the root it was opened on.
    pub fn finish(self) -> Result<NodeId> {
        let Self {
            cache,
            base,
            drafts,
        } = self;
        if drafts.is_empty() {
            return Ok(base);
        }
        let count = drafts.len();
        let mut ids = vec![cache.empty(); count];
        for (d, draft) in drafts.into_iter().enumerate().rev() {
            let transitions = draft
                .edges
                .into_iter()
                .map(|(sym, slot)| match slot {
                    Slot::Built(id) => (sym, id),
                    Slot::Draft(c) => (sym, ids[c]),
                })
                .collect();
            ids[d] = cache.alloc(Node::from_parts(draft.accept, transitions))?;
        }
        debug!(nodes = count, root = %ids[0], "finished trie batch");
        Ok(ids[0])
    }
}

impl<I: AcceptInfo> NodeCache<I> {
    /// Fresh empty root for a new uncompressed trie.
    pub fn new_root(&mut self) -> Result<NodeId> {
        self.alloc(Node::empty())
    }

    /// Insert `sequence` with payload `info` below `root`, returning the new root.
    ///
    /// Existing prefixes are reused; missing ones become non-accepting nodes.
    /// Re-inserting a sequence replaces its payload (last write wins).
    pub fn insert(&mut self, root: NodeId, sequence: &[Symbol], info: I) -> Result<NodeId> {
        self.check(root)?;

        // Existing node at each depth, `None` once the path leaves the trie.
        let mut spine: Vec<Option<NodeId>> = Vec::with_capacity(sequence.len() + 1);
        let mut cur = Some(root);
        spine.push(cur);
        for (depth, &sym) in sequence.iter().enumerate() {
            cur = match cur {
                Some(id) => {
                    let node = self.node(id);
                    match node.child(sym) {
                        Some(child) => Some(child),
                        None if node.accepts_edge(sym) => None,
                        None => {
                            return Err(Error::WildcardConflict {
                                path: sequence[..depth].to_vec(),
                            })
                        }
                    }
                }
                None => None,
            };
            spine.push(cur);
        }

        // Rebuild bottom-up so children precede parents in the arena.
        let terminal = match spine[sequence.len()] {
            Some(id) => self.node(id).with_accept(info),
            None => Node::leaf(info),
        };
        let mut child = self.alloc(terminal)?;
        for depth in (0..sequence.len()).rev() {
            let parent = match spine[depth] {
                Some(id) => self.node(id).with_child(sequence[depth], child),
                None => Node::empty().with_child(sequence[depth], child),
            };
            child = self.alloc(parent)?;
        }
        Ok(child)
    }

    /// Open a scratch batch on top of `root`; `root` itself stays unchanged.
    pub fn batch(&mut self, root: NodeId) -> Result<TrieBatch<'_, I>> {
        let base = self.check(root)?;
        Ok(TrieBatch {
            cache: self,
            base,
            drafts: Vec::new(),
        })
    }

    /// Insert every `(sequence, info)` pair in order, returning the final root.
    ///
    /// Equivalent to folding [`insert`](Self::insert), but each node of the
    /// result is allocated once.
    pub fn insert_all<S, T>(&mut self, root: NodeId, entries: T) -> Result<NodeId>
    where
        S: AsRef<[Symbol]>,
        T: IntoIterator<Item = (S, I)>,
    {
        let mut batch = self.batch(root)?;
        for (seq, info) in entries {
            batch.insert(seq.as_ref(), info)?;
        }
        batch.finish()
    }
}
