// crates/bytetrie-partition/src/lib.rs

//! DFA traversal and task partitioning over `bytetrie-core` automata.
//!
//! - `suffix`: per-node count of accepting suffixes (the work-size weight).
//! - `traverse`: explicit-stack DFS that reports each minimal accepted byte
//!   sequence once, realizing wildcard edges with representative bytes.
//! - `tasks`: splits the reachable space into independent prefixes so an
//!   external executor can enumerate them in parallel.
//!
//! This crate only produces a plan; running it (threads, processes, remote
//! jobs), cancellation and timeouts belong to the caller.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Accepting-suffix counts per node.
pub mod suffix;
/// Balanced partitioning of the traversal into tasks.
pub mod tasks;
/// Depth-first enumeration of minimal accepted sequences.
pub mod traverse;

pub use suffix::num_suffixes;
pub use tasks::{create_traversal_tasks, reachable_states, run_task, TraversalTask};
pub use traverse::{next_anyfield, traverse_tree, DEFAULT_ANYFIELD};

/// Branches with fewer suffixes than this become tasks without splitting.
pub const DEFAULT_SPLIT_THRESHOLD: u64 = 10_000;

/// Longest prefix a task may carry.
pub const DEFAULT_MAX_PREFIX_DEPTH: usize = 3;

/// Knobs for [`create_traversal_tasks`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    /// Split a branch further only if its suffix count is at least this.
    pub split_threshold: u64,
    /// Maximum prefix length (≥ 1); branches at this depth are never split.
    pub max_prefix_depth: usize,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            split_threshold: DEFAULT_SPLIT_THRESHOLD,
            max_prefix_depth: DEFAULT_MAX_PREFIX_DEPTH,
        }
    }
}

/// Errors from partitioning and task execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PartitionError {
    /// `initial_state` does not index into `states`.
    #[error("initial state index {index} out of range for {len} states")]
    InitialStateOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of states supplied.
        len: usize,
    },

    /// A task's `state_index` does not index into `states`.
    #[error("task state index {index} out of range for {len} states")]
    TaskStateOutOfRange {
        /// Index carried by the task.
        index: usize,
        /// Number of states supplied.
        len: usize,
    },

    /// A task target is not listed in `states`.
    #[error("state {0} reached by the partitioner is not in the state list")]
    UnknownState(bytetrie_core::NodeId),

    /// `max_prefix_depth` must be at least 1.
    #[error("max prefix depth must be at least 1")]
    ZeroDepth,
}
