//! Structural diff between two automata living in the same cache.
//!
//! Both graphs are walked in lock-step by symbol with an explicit stack. At
//! every visited pair whose acceptance (flag and payload) differs, one
//! [`DiffEntry`] is yielded; the walk then continues below that pair, because
//! deeper branches can diverge independently. A side missing a symbol is
//! replaced by the cache's empty node.
//!
//! Pairs with the same `NodeId` root identical subtrees and are skipped
//! outright. This prunes all shared structure between two compressed tries
//! without changing the result, so the diff of two tries equals the diff of
//! their compressed forms.

use crate::cache::NodeCache;
use crate::types::{AcceptInfo, NodeId, Symbol};
use serde::{Deserialize, Serialize};

/// One path where the two automata disagree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DiffEntry<I> {
    /// Symbols from the diff roots (after the caller's prefix).
    pub path: Vec<Symbol>,
    /// Payload on the left side, `None` if it does not accept there.
    pub left: Option<I>,
    /// Payload on the right side, `None` if it does not accept there.
    pub right: Option<I>,
}

/// Lazy pre-order diff iterator. Created by [`NodeCache::diff`].
#[derive(Debug)]
pub struct TrieDiff<'a, I> {
    cache: &'a NodeCache<I>,
    stack: Vec<(NodeId, NodeId, Vec<Symbol>)>,
}

impl<I: AcceptInfo> NodeCache<I> {
    /// Diff the automata rooted at `a` and `b`; every reported path starts
    /// with `prefix`.
    #[must_use]
    pub fn diff(&self, a: NodeId, b: NodeId, prefix: &[Symbol]) -> TrieDiff<'_, I> {
        TrieDiff {
            cache: self,
            stack: vec![(a, b, prefix.to_vec())],
        }
    }
}

impl<I: AcceptInfo> Iterator for TrieDiff<'_, I> {
    type Item = DiffEntry<I>;

    fn next(&mut self) -> Option<DiffEntry<I>> {
        while let Some((a, b, path)) = self.stack.pop() {
            if a == b {
                continue;
            }
            let (na, nb) = (self.cache.node(a), self.cache.node(b));
            let empty = self.cache.empty();

            // Push in descending symbol order so ascending pops first.
            let (xs, ys) = (na.transitions(), nb.transitions());
            let (mut i, mut j) = (xs.len(), ys.len());
            while i > 0 || j > 0 {
                let x = i.checked_sub(1).map(|k| xs[k]);
                let y = j.checked_sub(1).map(|k| ys[k]);
                let (sym, ca, cb) = match (x, y) {
                    (Some((sx, cx)), Some((sy, cy))) if sx == sy => {
                        i -= 1;
                        j -= 1;
                        (sx, cx, cy)
                    }
                    (Some((sx, cx)), Some((sy, _))) if sx > sy => {
                        i -= 1;
                        (sx, cx, empty)
                    }
                    (Some((sx, cx)), None) => {
                        i -= 1;
                        (sx, cx, empty)
                    }
                    (_, Some((sy, cy))) => {
                        j -= 1;
                        (sy, empty, cy)
                    }
                    (None, None) => break,
                };
                let mut p = path.clone();
                p.push(sym);
                self.stack.push((ca, cb, p));
            }

            if na.accept_info() != nb.accept_info() {
                return Some(DiffEntry {
                    path,
                    left: na.accept_info().cloned(),
                    right: nb.accept_info().cloned(),
                });
            }
        }
        None
    }
}
