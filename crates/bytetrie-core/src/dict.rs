//! Content-addressed dictionary encoding of a trie.
//!
//! One entry per *unique* node, children referenced by id, so a compressed
//! DAG stays linear in size when persisted:
//!
//! ```json
//! { "version": 1,
//!   "nodes": { "0": { "accepting": true, "info": "x", "transitions": {} },
//!              "1": { "accepting": false, "info": null, "transitions": { "7": 0, "9": 0 } } },
//!   "root": 1 }
//! ```
//!
//! Decoding rebuilds bottom-up through [`NodeCache`] interning, so a reloaded
//! trie shares canonical nodes with anything else built in the same cache and
//! can be diffed against it directly.
//!
//! Do **not** add `#[serde(deny_unknown_fields)]`: newer producers may add
//! fields that older readers should ignore.

use crate::cache::NodeCache;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::types::{AcceptInfo, NodeId, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Current encoding version.
pub const DICT_VERSION: u16 = 1;

const fn default_version() -> u16 {
    DICT_VERSION
}

/// One persisted node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEntry<I> {
    /// Whether the node accepts.
    pub accepting: bool,
    /// Accept payload; `null` or absent iff not accepting.
    pub info: Option<I>,
    /// Symbol to child entry id.
    #[serde(default)]
    pub transitions: BTreeMap<Symbol, u32>,
}

/// A whole persisted trie.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieDict<I> {
    /// Encoding version.
    #[serde(default = "default_version")]
    pub version: u16,
    /// Entries keyed by id.
    pub nodes: BTreeMap<u32, NodeEntry<I>>,
    /// Id of the root entry.
    pub root: u32,
}

impl<I> TrieDict<I> {
    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether there are no entries (never true for a valid encoding).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl<I: AcceptInfo> NodeCache<I> {
    /// Encode the trie under `root`. Ids are assigned in post-order, so every
    /// child id is smaller than its parents' and the root gets the largest.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_dict(&self, root: NodeId) -> TrieDict<I> {
        let mut ids: FxHashMap<NodeId, u32> = FxHashMap::default();
        let mut nodes = BTreeMap::new();
        let mut stack = vec![(root, false)];
        while let Some((id, expanded)) = stack.pop() {
            if ids.contains_key(&id) {
                continue;
            }
            let node = self.node(id);
            if expanded {
                let entry = NodeEntry {
                    accepting: node.is_accepting(),
                    info: node.accept_info().cloned(),
                    transitions: node
                        .transitions()
                        .iter()
                        .map(|(sym, child)| (*sym, ids[child]))
                        .collect(),
                };
                // Arena ids fit in u32, so the entry count does too.
                let key = ids.len() as u32;
                ids.insert(id, key);
                nodes.insert(key, entry);
            } else {
                stack.push((id, true));
                for &(_, child) in node.transitions().iter().rev() {
                    if !ids.contains_key(&child) {
                        stack.push((child, false));
                    }
                }
            }
        }
        TrieDict {
            version: DICT_VERSION,
            root: ids[&root],
            nodes,
        }
    }

    /// Decode `dict` into this cache and return the canonical root.
    ///
    /// Only entries reachable from `root` are read. Fails with
    /// [`Error::MalformedEncoding`] on a missing root or child id, a cycle, an
    /// `accepting`/`info` mismatch, or a wildcard next to byte transitions.
    pub fn from_dict(&mut self, dict: &TrieDict<I>) -> Result<NodeId> {
        if !dict.nodes.contains_key(&dict.root) {
            return Err(Error::MalformedEncoding(format!(
                "root id {} has no entry",
                dict.root
            )));
        }

        let mut built: FxHashMap<u32, NodeId> = FxHashMap::default();
        let mut open: FxHashSet<u32> = FxHashSet::default();
        let mut stack = vec![(dict.root, false)];
        while let Some((key, expanded)) = stack.pop() {
            if built.contains_key(&key) {
                continue;
            }
            let entry = dict.nodes.get(&key).ok_or_else(|| {
                Error::MalformedEncoding(format!("reference to unknown node id {key}"))
            })?;

            if expanded {
                open.remove(&key);
                let node = Self::decode_entry(key, entry, &built)?;
                let id = self.intern(node)?;
                built.insert(key, id);
                continue;
            }

            if !open.insert(key) {
                return Err(Error::MalformedEncoding(format!(
                    "cycle through node id {key}"
                )));
            }
            stack.push((key, true));
            for &child in entry.transitions.values().rev() {
                if open.contains(&child) {
                    return Err(Error::MalformedEncoding(format!(
                        "cycle through node id {child}"
                    )));
                }
                if !built.contains_key(&child) {
                    stack.push((child, false));
                }
            }
        }

        let root = built[&dict.root];
        debug!(entries = dict.nodes.len(), decoded = built.len(), root = %root, "decoded trie");
        Ok(root)
    }

    fn decode_entry(
        key: u32,
        entry: &NodeEntry<I>,
        built: &FxHashMap<u32, NodeId>,
    ) -> Result<Node<I>> {
        if entry.accepting != entry.info.is_some() {
            return Err(Error::MalformedEncoding(format!(
                "node id {key}: accepting={} but info is {}",
                entry.accepting,
                if entry.info.is_some() { "present" } else { "absent" }
            )));
        }
        let mut transitions = Vec::with_capacity(entry.transitions.len());
        for (&sym, child) in &entry.transitions {
            let id = built.get(child).copied().ok_or_else(|| {
                Error::MalformedEncoding(format!("node id {key}: child {child} not decoded"))
            })?;
            transitions.push((sym, id));
        }
        let node = Node::from_parts(entry.info.clone(), transitions);
        if !node.has_valid_shape() {
            return Err(Error::MalformedEncoding(format!(
                "node id {key}: wildcard transition mixed with byte transitions"
            )));
        }
        Ok(node)
    }
}
