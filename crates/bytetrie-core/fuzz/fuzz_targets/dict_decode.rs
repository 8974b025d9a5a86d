#![no_main]
use bytetrie_core::{NodeCache, TrieDict};
use ciborium::de::from_reader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(dict) = from_reader::<TrieDict<String>, _>(data) {
        let mut cache = NodeCache::new();
        let _ = cache.from_dict(&dict);
    }
});
