//! Enumeration of minimal accepted byte sequences.
//!
//! Unlike suffix counting, the walk stops descending a branch at its first
//! accepting node: every reported sequence is accepted and none of its proper
//! prefixes is.
//!
//! Wildcard edges are realized by one representative byte instead of 256
//! branches. The first wildcard on a path uses `anyfield`, each nested one
//! advances by `0x11` (wrapping), and a running value of `0` stays `0`. This
//! keeps repeated wildcards on a path visually distinct in generated vectors.

use bytetrie_core::{AcceptInfo, NodeCache, NodeId, Symbol};

/// Representative byte for the first wildcard on a path.
pub const DEFAULT_ANYFIELD: u8 = 0x01;

/// Representative byte for the next nested wildcard.
#[inline]
#[must_use]
pub const fn next_anyfield(anyfield: u8) -> u8 {
    if anyfield == 0 {
        0
    } else {
        anyfield.wrapping_add(0x11)
    }
}

/// Call `callback` once per minimal accepted sequence below `state`, each
/// prefixed with `prefix`, in ascending byte order.
pub fn traverse_tree<I, F>(
    cache: &NodeCache<I>,
    state: NodeId,
    mut callback: F,
    prefix: &[u8],
    anyfield: u8,
) where
    I: AcceptInfo,
    F: FnMut(&[u8]),
{
    let mut stack: Vec<(NodeId, Vec<u8>, u8)> = vec![(state, prefix.to_vec(), anyfield)];
    while let Some((id, path, any)) = stack.pop() {
        let node = cache.node(id);
        if node.is_accepting() {
            callback(&path);
            continue;
        }
        for &(sym, child) in node.transitions().iter().rev() {
            let mut p = path.clone();
            match sym {
                Symbol::Byte(b) => {
                    p.push(b);
                    stack.push((child, p, any));
                }
                Symbol::Wildcard => {
                    p.push(any);
                    stack.push((child, p, next_anyfield(any)));
                }
            }
        }
    }
}
