//! bytetrie-core — hash-consed automata over byte sequences.
//!
//! This crate is the engine used to represent and compare the sets of byte
//! sequences (instruction encodings) a machine-code validator accepts:
//! - the immutable node model (`Node`, `Symbol`, `NodeId`),
//! - persistent trie construction (`NodeCache::insert`),
//! - hash-consed compression and union (`NodeCache::merge` / `compress`),
//! - a content-addressed dict encoding (`TrieDict`) with JSON/CBOR I/O,
//! - a lazy structural differ (`NodeCache::diff`).
//!
//! The alphabet is bytes plus a wildcard; the accept payload is any
//! `Clone + Eq + Hash + Debug` type.
//!
//! ```
//! use bytetrie_core::{NodeCache, Symbol};
//!
//! let mut cache = NodeCache::new();
//! let root = cache.new_root()?;
//! let root = cache.insert(root, &[Symbol::Byte(0x0f), Symbol::Byte(0x05)], "syscall")?;
//! let root = cache.insert(root, &[Symbol::Byte(0x90)], "nop")?;
//! let compressed = cache.compress(root)?;
//! assert_eq!(cache.diff(root, compressed, &[]).count(), 0);
//! assert_eq!(cache.lookup(compressed, &[0x90]), Some(&"nop"));
//! # Ok::<(), bytetrie_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Persistent trie construction on top of the node arena.
pub mod builder;
/// Node arena and hash-consing table.
pub mod cache;
/// Content-addressed dict encoding and decoding.
pub mod dict;
/// Lazy structural diff between two automata.
pub mod diff;
/// Crate-local error type.
pub mod error;
/// JSON/CBOR helpers and auto-detecting read/write APIs.
pub mod io;
/// JSON Lines helpers for sequence lists and reports.
pub mod io_jsonl;
/// Hash-consed merge, compression and union.
pub mod merge;
/// Immutable automaton state.
pub mod node;
/// Canonical core types shared across the workspace.
pub mod types;

// ---- Re-exports for workspace compatibility ----
pub use builder::TrieBatch;
pub use cache::*;
pub use dict::*;
pub use diff::*;
pub use error::*;
pub use node::*;
pub use types::*;

/// Commonly-used items for quick imports.
///
/// ```rust
/// use bytetrie_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        cache::NodeCache, diff::DiffEntry, dict::TrieDict, error::Error, node::Node,
        types::*,
    };
}
