//! Number of minimal accepting suffixes below each node.
//!
//! Weights, not an exact enumeration count:
//! - accepting node: `1 + sum(children)` (counting continues past acceptance);
//! - node with a single wildcard edge: the child's count, since the wildcard
//!   is one equivalence class and not 256 branches;
//! - otherwise: `sum(children)`.
//!
//! Sums saturate at `u64::MAX`.

use bytetrie_core::{AcceptInfo, NodeCache, NodeId};
use rustc_hash::FxHashMap;

/// Suffix count for every node reachable from `state` (inclusive).
///
/// Arena nodes are acyclic by construction, so the walk always terminates.
#[must_use]
pub fn num_suffixes<I: AcceptInfo>(cache: &NodeCache<I>, state: NodeId) -> FxHashMap<NodeId, u64> {
    let mut counts: FxHashMap<NodeId, u64> = FxHashMap::default();
    let mut stack = vec![(state, false)];
    while let Some((id, expanded)) = stack.pop() {
        if counts.contains_key(&id) {
            continue;
        }
        let node = cache.node(id);
        if !expanded {
            stack.push((id, true));
            for &(_, child) in node.transitions() {
                if !counts.contains_key(&child) {
                    stack.push((child, false));
                }
            }
            continue;
        }
        let below = node
            .transitions()
            .iter()
            .map(|(_, child)| counts[child])
            .fold(0u64, u64::saturating_add);
        let n = if node.is_accepting() {
            below.saturating_add(1)
        } else if let Some(child) = node.wildcard_child() {
            counts[&child]
        } else {
            below
        };
        counts.insert(id, n);
    }
    counts
}
