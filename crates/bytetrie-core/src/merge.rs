//! Hash-consed union of two node graphs.
//!
//! `merge(a, b)` rebuilds the structural union of `a` and `b` bottom-up and
//! interns every node it produces, so the result is the canonical DAG for that
//! shape. `compress(t)` is `merge(empty, t)`.
//!
//! Sub-merges are memoized per call on the `(a, b)` id pair: in a heavily
//! shared input the same pair is reached along many paths, and without the
//! memo the work grows with the number of paths instead of the number of
//! nodes.

use crate::cache::NodeCache;
use crate::error::{Error, Result};
use crate::node::Node;
use crate::types::{AcceptInfo, NodeId, Symbol};
use rustc_hash::FxHashMap;
use tracing::debug;

type MergeMemo = FxHashMap<(NodeId, NodeId), NodeId>;

/// Work item of the merge walk.
///
/// `Enter` visits a pair one edge below a node whose path had `depth`
/// symbols; `Exit` interns the pair once the results of its `syms` children
/// sit on top of the value stack.
enum Frame<I> {
    Enter {
        a: NodeId,
        b: NodeId,
        depth: usize,
        sym: Option<Symbol>,
    },
    Exit {
        a: NodeId,
        b: NodeId,
        accept: Option<I>,
        syms: Vec<Symbol>,
    },
}

impl<I: AcceptInfo> NodeCache<I> {
    /// Canonical structural union of the graphs rooted at `a` and `b`.
    ///
    /// Acceptance is OR-ed. Two accepting nodes on the same path must carry
    /// equal payloads, else [`Error::ConflictingAcceptInfo`]. A wildcard edge
    /// meeting byte edges fails with [`Error::WildcardConflict`]. Errors are
    /// reported for the first offending path in ascending symbol order.
    ///
    /// The walk uses an explicit stack, so input depth is bounded by memory
    /// rather than by the thread's stack.
    pub fn merge(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.check(a)?;
        self.check(b)?;
        let empty = self.empty();
        let mut memo = MergeMemo::default();
        let mut path: Vec<Symbol> = Vec::new();
        let mut values: Vec<NodeId> = Vec::new();
        let mut stack = vec![Frame::Enter {
            a,
            b,
            depth: 0,
            sym: None,
        }];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { a, b, depth, sym } => {
                    path.truncate(depth);
                    path.extend(sym);
                    if let Some(&done) = memo.get(&(a, b)) {
                        values.push(done);
                        continue;
                    }
                    if self.is_canonical(a) && (a == b || b == empty) {
                        values.push(a);
                        continue;
                    }
                    if a == empty && self.is_canonical(b) {
                        values.push(b);
                        continue;
                    }

                    let (na, nb) = (self.node(a), self.node(b));
                    let accept = match (na.accept_info(), nb.accept_info()) {
                        (None, None) => None,
                        (Some(x), None) | (None, Some(x)) => Some(x.clone()),
                        (Some(x), Some(y)) if x == y => Some(x.clone()),
                        (Some(x), Some(y)) => {
                            return Err(Error::ConflictingAcceptInfo {
                                path,
                                left: format!("{x:?}"),
                                right: format!("{y:?}"),
                            })
                        }
                    };
                    let pairs = zip_transitions(na.transitions(), nb.transitions(), empty);
                    if pairs.len() > 1 && pairs.iter().any(|(s, _, _)| s.is_wildcard()) {
                        return Err(Error::WildcardConflict { path });
                    }

                    let depth = path.len();
                    stack.push(Frame::Exit {
                        a,
                        b,
                        accept,
                        syms: pairs.iter().map(|&(s, _, _)| s).collect(),
                    });
                    // Reversed so the lowest symbol is merged first.
                    stack.extend(pairs.into_iter().rev().map(|(s, ca, cb)| Frame::Enter {
                        a: ca,
                        b: cb,
                        depth,
                        sym: Some(s),
                    }));
                }
                Frame::Exit { a, b, accept, syms } => {
                    let children = values.split_off(values.len() - syms.len());
                    let transitions = syms.into_iter().zip(children).collect();
                    let id = self.intern(Node::from_parts(accept, transitions))?;
                    memo.insert((a, b), id);
                    values.push(id);
                }
            }
        }
        debug_assert_eq!(values.len(), 1);
        Ok(values.pop().unwrap_or(empty))
    }

    /// Canonicalize a trie: `merge(empty, root)`.
    pub fn compress(&mut self, root: NodeId) -> Result<NodeId> {
        let before = self.stats();
        let out = self.merge(self.empty(), root)?;
        debug!(
            root = %root,
            compressed = %out,
            new_interned = self.stats().interned_nodes - before.interned_nodes,
            "compressed trie"
        );
        Ok(out)
    }

    /// Incremental union of two tries (compressed or not).
    pub fn union(&mut self, a: NodeId, b: NodeId) -> Result<NodeId> {
        self.merge(a, b)
    }
}

/// Union of two sorted transition lists; a side missing a symbol gets `empty`.
fn zip_transitions(
    xs: &[(Symbol, NodeId)],
    ys: &[(Symbol, NodeId)],
    empty: NodeId,
) -> Vec<(Symbol, NodeId, NodeId)> {
    let mut out = Vec::with_capacity(xs.len().max(ys.len()));
    let (mut i, mut j) = (0, 0);
    while i < xs.len() || j < ys.len() {
        match (xs.get(i), ys.get(j)) {
            (Some(&(sx, cx)), Some(&(sy, cy))) if sx == sy => {
                out.push((sx, cx, cy));
                i += 1;
                j += 1;
            }
            (Some(&(sx, cx)), Some(&(sy, _))) if sx < sy => {
                out.push((sx, cx, empty));
                i += 1;
            }
            (Some(&(sx, cx)), None) => {
                out.push((sx, cx, empty));
                i += 1;
            }
            (_, Some(&(sy, cy))) => {
                out.push((sy, empty, cy));
                j += 1;
            }
            (None, None) => break,
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(v: &[u8]) -> Vec<Symbol> {
        v.iter().copied().map(Symbol::Byte).collect()
    }

    #[test]
    fn zip_interleaves_by_symbol() {
        let e = NodeId(0);
        let xs = [(Symbol::Byte(1), NodeId(1)), (Symbol::Byte(4), NodeId(2))];
        let ys = [(Symbol::Byte(2), NodeId(3)), (Symbol::Byte(4), NodeId(5))];
        assert_eq!(
            zip_transitions(&xs, &ys, e),
            vec![
                (Symbol::Byte(1), NodeId(1), e),
                (Symbol::Byte(2), e, NodeId(3)),
                (Symbol::Byte(4), NodeId(2), NodeId(5)),
            ]
        );
    }

    #[test]
    fn identical_leaves_collapse() {
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let r = c.insert(r, &bytes(&[1]), 7).unwrap();
        let r = c.insert(r, &bytes(&[2]), 7).unwrap();
        assert_eq!(c.unique_nodes(r), 3);
        let z = c.compress(r).unwrap();
        assert_eq!(c.unique_nodes(z), 2);
        assert!(c.is_canonical(z));
    }

    #[test]
    fn union_of_compressed_tries() {
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let a = c.insert(r, &bytes(&[1, 2]), 1).unwrap();
        let b = c.insert(r, &bytes(&[1, 3]), 1).unwrap();
        let (za, zb) = (c.compress(a).unwrap(), c.compress(b).unwrap());
        let u = c.union(za, zb).unwrap();
        assert_eq!(
            c.accept_sequences(u),
            vec![(bytes(&[1, 2]), 1), (bytes(&[1, 3]), 1)]
        );
        // The union with one side is a no-op once compressed.
        assert_eq!(c.union(u, za).unwrap(), u);
        assert_eq!(c.union(u, c.empty()).unwrap(), u);
    }

    #[test]
    fn conflicting_infos_fail() {
        let mut c: NodeCache<&str> = NodeCache::new();
        let r = c.new_root().unwrap();
        let a = c.insert(r, &bytes(&[0, 1]), "x").unwrap();
        let b = c.insert(r, &bytes(&[0, 1]), "y").unwrap();
        let err = c.merge(a, b).unwrap_err();
        assert_eq!(
            err,
            Error::ConflictingAcceptInfo {
                path: bytes(&[0, 1]),
                left: "\"x\"".into(),
                right: "\"y\"".into(),
            }
        );
    }

    #[test]
    fn wildcard_against_bytes_fails() {
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let a = c.insert(r, &[Symbol::Byte(9), Symbol::Wildcard], 1).unwrap();
        let b = c.insert(r, &bytes(&[9, 9]), 1).unwrap();
        assert_eq!(
            c.merge(a, b),
            Err(Error::WildcardConflict {
                path: bytes(&[9])
            })
        );
    }

    #[test]
    fn long_sequences_compress_without_deep_recursion() {
        const LEN: usize = 50_000;
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let seq = vec![Symbol::Byte(0x66); LEN];
        let r = c.insert(r, &seq, 1).unwrap();
        let r = c.insert(r, &seq[..LEN / 2], 2).unwrap();

        let z = c.compress(r).unwrap();
        assert_eq!(c.unique_nodes(z), LEN + 1);
        assert_eq!(c.lookup(z, &[0x66; LEN]), Some(&1));
        assert_eq!(c.lookup(z, &[0x66; LEN / 2]), Some(&2));
        assert_eq!(c.lookup(z, &[0x66; LEN - 1]), None);
        assert_eq!(c.union(z, r).unwrap(), z);

        let dict = c.to_dict(z);
        let back = c.from_dict(&dict).unwrap();
        assert_eq!(back, z);
    }

    #[test]
    fn conflicts_deep_in_a_long_path_report_the_path() {
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let seq = vec![Symbol::Byte(1); 20_000];
        let a = c.insert(r, &seq, 1).unwrap();
        let b = c.insert(r, &seq, 2).unwrap();
        match c.merge(a, b) {
            Err(Error::ConflictingAcceptInfo { path, .. }) => assert_eq!(path, seq),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn compress_is_idempotent() {
        let mut c: NodeCache<u8> = NodeCache::new();
        let r = c.new_root().unwrap();
        let r = c.insert(r, &bytes(&[3, 3, 3]), 0).unwrap();
        let z1 = c.compress(r).unwrap();
        let z2 = c.compress(z1).unwrap();
        assert_eq!(z1, z2);
    }
}
