//! Property tests for compression, persistence and diffing.
//!
//! Tries are generated from small alphabets and short sequences so that
//! prefixes collide often and compression has real sharing to find. About
//! one symbol in seven is a wildcard; a sequence that would put a wildcard
//! next to byte edges is rejected by the builder and left out of the
//! expected contents.

use bytetrie_core::{io, DiffEntry, Error, NodeCache, NodeId, Symbol, TrieDict};
use proptest::prelude::*;
use std::collections::{BTreeMap, HashSet};

type Entries = Vec<(Vec<Symbol>, u8)>;

fn arb_symbol() -> impl Strategy<Value = Symbol> {
    prop_oneof![
        6 => (0u8..4).prop_map(Symbol::Byte),
        1 => Just(Symbol::Wildcard),
    ]
}

fn arb_entries() -> impl Strategy<Value = Entries> {
    prop::collection::vec((prop::collection::vec(arb_symbol(), 0..6), 0u8..3), 0..24)
}

/// Build a trie from `entries`, returning its root and the entries that fit.
fn build(cache: &mut NodeCache<u8>, entries: &Entries) -> (NodeId, Entries) {
    let root = cache.new_root().unwrap();
    let mut batch = cache.batch(root).unwrap();
    let mut kept = Vec::new();
    for (seq, info) in entries {
        match batch.insert(seq, *info) {
            Ok(()) => kept.push((seq.clone(), *info)),
            Err(Error::WildcardConflict { .. }) => {}
            Err(e) => panic!("unexpected insert error: {e}"),
        }
    }
    (batch.finish().unwrap(), kept)
}

/// Last-write-wins view of the inserted entries.
fn logical(entries: &Entries) -> BTreeMap<Vec<Symbol>, u8> {
    entries.iter().cloned().collect()
}

/// Whether some prefix is followed by a wildcard in one key and a byte in
/// another.
fn wildcard_clash<'a>(keys: impl IntoIterator<Item = &'a Vec<Symbol>>) -> bool {
    let mut next: BTreeMap<&[Symbol], (bool, bool)> = BTreeMap::new();
    for k in keys {
        for (d, sym) in k.iter().enumerate() {
            let seen = next.entry(&k[..d]).or_default();
            if sym.is_wildcard() {
                seen.0 = true;
            } else {
                seen.1 = true;
            }
        }
    }
    next.values().any(|&(wild, byte)| wild && byte)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn compression_preserves_accept_sequences(entries in arb_entries()) {
        let mut cache = NodeCache::new();
        let (root, kept) = build(&mut cache, &entries);
        let z = cache.compress(root).unwrap();
        prop_assert_eq!(cache.accept_sequences(root), cache.accept_sequences(z));

        let want: Vec<_> = logical(&kept).into_iter().collect();
        let mut got = cache.accept_sequences(z);
        got.sort();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn batch_matches_sequential_inserts(entries in arb_entries()) {
        let mut cache = NodeCache::new();
        let (batched, _) = build(&mut cache, &entries);
        let mut root = cache.new_root().unwrap();
        for (seq, info) in &entries {
            if let Ok(next) = cache.insert(root, seq, *info) {
                root = next;
            }
        }
        prop_assert_eq!(cache.accept_sequences(batched), cache.accept_sequences(root));
        prop_assert_eq!(cache.unique_nodes(batched), cache.unique_nodes(root));
        prop_assert_eq!(cache.compress(batched).unwrap(), cache.compress(root).unwrap());
    }

    #[test]
    fn compression_never_grows(entries in arb_entries()) {
        let mut cache = NodeCache::new();
        let (root, _) = build(&mut cache, &entries);
        let z = cache.compress(root).unwrap();
        prop_assert!(cache.unique_nodes(z) <= cache.unique_nodes(root));
    }

    #[test]
    fn compression_is_idempotent(entries in arb_entries()) {
        let mut cache = NodeCache::new();
        let (root, _) = build(&mut cache, &entries);
        let z = cache.compress(root).unwrap();
        prop_assert_eq!(cache.compress(z).unwrap(), z);
    }

    #[test]
    fn dict_roundtrip_preserves_content_and_size(entries in arb_entries()) {
        let mut cache = NodeCache::new();
        let (root, _) = build(&mut cache, &entries);
        let z = cache.compress(root).unwrap();

        let json = serde_json::to_string(&cache.to_dict(z)).unwrap();
        let dict: TrieDict<u8> = serde_json::from_str(&json).unwrap();
        let mut fresh = NodeCache::new();
        let back = fresh.from_dict(&dict).unwrap();
        prop_assert_eq!(fresh.accept_sequences(back), cache.accept_sequences(z));
        prop_assert_eq!(fresh.unique_nodes(back), cache.unique_nodes(z));

        let cbor = io::to_cbor(&cache.to_dict(z)).unwrap();
        let dict: TrieDict<u8> = io::from_cbor(&cbor).unwrap();
        prop_assert_eq!(cache.from_dict(&dict).unwrap(), z);
    }

    #[test]
    fn diff_is_transparent_under_compression(a in arb_entries(), b in arb_entries()) {
        let mut cache = NodeCache::new();
        let ((ta, ka), (tb, kb)) = (build(&mut cache, &a), build(&mut cache, &b));
        let (za, zb) = (cache.compress(ta).unwrap(), cache.compress(tb).unwrap());

        let raw: HashSet<DiffEntry<u8>> = cache.diff(ta, tb, &[]).collect();
        let compressed: HashSet<DiffEntry<u8>> = cache.diff(za, zb, &[]).collect();
        prop_assert_eq!(&raw, &compressed);

        // And it is exactly the disagreement between the two logical maps.
        let (la, lb) = (logical(&ka), logical(&kb));
        let keys: HashSet<&Vec<Symbol>> = la.keys().chain(lb.keys()).collect();
        let expected: HashSet<DiffEntry<u8>> = keys
            .into_iter()
            .filter(|k| la.get(*k) != lb.get(*k))
            .map(|k| DiffEntry {
                path: k.clone(),
                left: la.get(k).copied(),
                right: lb.get(k).copied(),
            })
            .collect();
        prop_assert_eq!(raw, expected);
    }

    #[test]
    fn union_equals_merge_of_logical_contents(a in arb_entries(), b in arb_entries()) {
        let mut cache = NodeCache::new();
        let ((ta, ka), (tb, kb)) = (build(&mut cache, &a), build(&mut cache, &b));
        let (la, lb) = (logical(&ka), logical(&kb));
        let conflicting = la.iter().any(|(k, v)| lb.get(k).is_some_and(|w| w != v));
        let clash = wildcard_clash(la.keys().chain(lb.keys()));

        match cache.union(ta, tb) {
            Ok(u) => {
                prop_assert!(!conflicting && !clash);
                let mut want = la;
                want.extend(lb);
                let mut got = cache.accept_sequences(u);
                got.sort();
                prop_assert_eq!(got, want.into_iter().collect::<Vec<_>>());
            }
            Err(Error::ConflictingAcceptInfo { path, .. }) => {
                prop_assert!(la.get(&path).is_some_and(|v| lb.get(&path).is_some_and(|w| w != v)));
            }
            Err(Error::WildcardConflict { path }) => {
                prop_assert!(clash);
                let below = la.keys().chain(lb.keys()).filter(|k| k.len() > path.len() && k.starts_with(&path));
                let (wild, byte): (Vec<_>, Vec<_>) = below.partition(|k| k[path.len()].is_wildcard());
                prop_assert!(!wild.is_empty() && !byte.is_empty(), "no clash below {:?}", path);
            }
            Err(e) => prop_assert!(false, "unexpected error: {}", e),
        }
    }
}
