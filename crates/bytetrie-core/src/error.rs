//! Crate-local error type for automaton operations.
//!
//! Every error is terminal for the single operation that raised it; nothing
//! is retried and partially built nodes simply stay unreferenced in the arena.

use crate::types::{format_path, Symbol};
use thiserror::Error;

/// Errors from building, merging, and decoding automata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A symbol outside `[0,255]` and not the wildcard.
    #[error("invalid symbol {0}: expected a byte in [0,255] or '*'")]
    InvalidSymbol(String),

    /// Two accepting nodes on the same path carry different payloads.
    #[error("conflicting accept info at {}: {left} vs {right}", format_path(.path))]
    ConflictingAcceptInfo {
        /// Path from the merge roots to the conflicting node.
        path: Vec<Symbol>,
        /// Debug rendering of the left payload.
        left: String,
        /// Debug rendering of the right payload.
        right: String,
    },

    /// A wildcard transition would sit next to byte transitions on one node.
    #[error("wildcard transition mixed with byte transitions at {}", format_path(.path))]
    WildcardConflict {
        /// Path to the offending node.
        path: Vec<Symbol>,
    },

    /// A persisted trie could not be decoded into a valid DAG.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A `NodeId` not issued by this cache.
    #[error("unknown node id {0}")]
    UnknownNode(u32),

    /// The arena ran out of 32-bit ids.
    #[error("node arena is full ({0} nodes)")]
    ArenaFull(usize),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
