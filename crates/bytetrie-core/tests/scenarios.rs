//! End-to-end scenarios: build, compress, persist, reload and diff.
//!
//! The accept payload here is a small immutable record, the way validator
//! tooling attaches "what this encoding means" to each accepted sequence.

use bytetrie_core::{DiffEntry, NodeCache, NodeId, Symbol};
use std::collections::HashSet;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct Verdict {
    mnemonic: &'static str,
    operands: u8,
}

const ACCEPT1: Verdict = Verdict { mnemonic: "mov", operands: 2 };
const ACCEPT2: Verdict = Verdict { mnemonic: "lea", operands: 2 };

#[track_caller]
fn seq(v: &[u8]) -> Vec<Symbol> {
    v.iter().copied().map(Symbol::Byte).collect()
}

#[track_caller]
fn build(cache: &mut NodeCache<Verdict>, entries: &[(&[u8], Verdict)]) -> NodeId {
    let root = cache.new_root().unwrap();
    cache
        .insert_all(root, entries.iter().map(|(s, v)| (seq(s), v.clone())))
        .unwrap()
}

#[test]
fn compression_collapses_shared_leaves() {
    let mut cache = NodeCache::new();
    let root = build(
        &mut cache,
        &[
            (&[0, 1, 2], ACCEPT1),
            (&[0, 1, 2, 3], ACCEPT1),
            (&[0, 1, 3], ACCEPT1),
            (&[0, 1, 4], ACCEPT1),
            (&[0, 1, 5], ACCEPT1),
        ],
    );
    assert_eq!(cache.unique_nodes(root), 8);

    let compressed = cache.compress(root).unwrap();
    assert_eq!(cache.unique_nodes(compressed), 5);

    let expected: Vec<(Vec<Symbol>, Verdict)> = [
        seq(&[0, 1, 2]),
        seq(&[0, 1, 2, 3]),
        seq(&[0, 1, 3]),
        seq(&[0, 1, 4]),
        seq(&[0, 1, 5]),
    ]
    .into_iter()
    .map(|p| (p, ACCEPT1))
    .collect();
    assert_eq!(cache.accept_sequences(root), expected);
    assert_eq!(cache.accept_sequences(compressed), expected);

    // The four childless accepting nodes are one shared node after compression.
    let n01 = cache
        .node(cache.node(compressed).child(Symbol::Byte(0)).unwrap())
        .child(Symbol::Byte(1))
        .unwrap();
    let n0123 = cache
        .node(cache.node(n01).child(Symbol::Byte(2)).unwrap())
        .child(Symbol::Byte(3))
        .unwrap();
    for b in [3, 4, 5] {
        assert_eq!(cache.node(n01).child(Symbol::Byte(b)), Some(n0123));
    }
}

#[test]
fn diff_reports_changed_and_removed_sequences() {
    let mut cache = NodeCache::new();
    let before = build(
        &mut cache,
        &[
            (&[0, 1, 2], ACCEPT1),
            (&[0, 1, 3], ACCEPT1),
            (&[0, 1, 4], ACCEPT1),
            (&[0, 1, 5], ACCEPT1),
        ],
    );
    let after = build(
        &mut cache,
        &[
            (&[0, 1, 2], ACCEPT1),
            (&[0, 1, 3], ACCEPT1),
            (&[0, 1, 4], ACCEPT2),
        ],
    );

    let expected: HashSet<DiffEntry<Verdict>> = [
        DiffEntry { path: seq(&[0, 1, 4]), left: Some(ACCEPT1), right: Some(ACCEPT2) },
        DiffEntry { path: seq(&[0, 1, 5]), left: Some(ACCEPT1), right: None },
    ]
    .into_iter()
    .collect();

    let raw: HashSet<_> = cache.diff(before, after, &[]).collect();
    assert_eq!(raw, expected);

    let (zb, za) = (cache.compress(before).unwrap(), cache.compress(after).unwrap());
    let compressed: HashSet<_> = cache.diff(zb, za, &[]).collect();
    assert_eq!(compressed, expected);

    // Mixed: one side compressed, the other not.
    let mixed: HashSet<_> = cache.diff(before, za, &[]).collect();
    assert_eq!(mixed, expected);
}

#[test]
fn reloaded_trie_diffs_clean_against_rebuilt_one() {
    let entries: &[(&[u8], Verdict)] = &[(&[0x0f, 0x05], ACCEPT1), (&[0x90], ACCEPT2)];

    let mut cache = NodeCache::new();
    let root = build(&mut cache, entries);
    let z = cache.compress(root).unwrap();
    let dict = cache.to_dict(z);

    let mut session = NodeCache::new();
    let reloaded = session.from_dict(&dict).unwrap();
    let rebuilt = build(&mut session, entries);
    let rebuilt_z = session.compress(rebuilt).unwrap();

    assert_eq!(reloaded, rebuilt_z);
    assert_eq!(session.diff(reloaded, rebuilt, &[]).count(), 0);
}

#[test]
fn incremental_union_matches_full_rebuild() {
    let mut cache = NodeCache::new();
    let first = build(&mut cache, &[(&[1, 1], ACCEPT1), (&[1, 2], ACCEPT1)]);
    let second = build(&mut cache, &[(&[2, 1], ACCEPT1), (&[1, 3], ACCEPT2)]);
    let z1 = cache.compress(first).unwrap();
    let z2 = cache.compress(second).unwrap();
    let unioned = cache.union(z1, z2).unwrap();

    let all = build(
        &mut cache,
        &[
            (&[1, 1], ACCEPT1),
            (&[1, 2], ACCEPT1),
            (&[2, 1], ACCEPT1),
            (&[1, 3], ACCEPT2),
        ],
    );
    assert_eq!(cache.compress(all).unwrap(), unioned);
}

#[test]
fn wildcard_paths_compress_and_match() {
    let mut cache = NodeCache::new();
    let root = cache.new_root().unwrap();
    let root = cache
        .insert(root, &[Symbol::Byte(0xe8), Symbol::Wildcard, Symbol::Wildcard], ACCEPT1)
        .unwrap();
    let root = cache
        .insert(root, &[Symbol::Byte(0xe9), Symbol::Wildcard], ACCEPT1)
        .unwrap();
    let z = cache.compress(root).unwrap();
    assert_eq!(cache.unique_nodes(root), 6);
    assert_eq!(cache.unique_nodes(z), 4);
    assert_eq!(cache.lookup(z, &[0xe8, 0x00, 0xff]), Some(&ACCEPT1));
    assert_eq!(cache.lookup(z, &[0xe9, 0x42]), Some(&ACCEPT1));
    assert_eq!(cache.lookup(z, &[0xe9]), None);
}
