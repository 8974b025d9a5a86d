//! Split the traversal of one state into independent prefix tasks.
//!
//! Each task is a `(prefix, state_index)` pair: the edge labels that lead
//! from the initial state to `states[state_index]`. Running every task in
//! order reproduces `traverse_tree` from the initial state, so tasks can be
//! handed to any executor and their outputs concatenated.

use crate::{
    suffix::num_suffixes,
    traverse::{next_anyfield, traverse_tree},
    PartitionConfig, PartitionError,
};
use bytetrie_core::{AcceptInfo, NodeCache, NodeId, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One independent unit of traversal work.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraversalTask {
    /// Edge labels from the initial state to the task's state.
    pub prefix: Vec<Symbol>,
    /// Index into the `states` slice the plan was built from.
    pub state_index: usize,
}

/// Pending work in the partitioning walk.
enum Step {
    Split(NodeId, Vec<Symbol>),
    Emit(TraversalTask),
}

/// Every node reachable from `root`, root first, each listed once.
#[must_use]
pub fn reachable_states<I: AcceptInfo>(cache: &NodeCache<I>, root: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut seen: FxHashSet<NodeId> = FxHashSet::default();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        for &(_, child) in cache.node(id).transitions().iter().rev() {
            if !seen.contains(&child) {
                stack.push(child);
            }
        }
    }
    out
}

/// Partition the traversal of `states[initial_state]` into ordered tasks.
///
/// Starting one edge below the initial state, a branch becomes a task when
/// its target is accepting, has only a wildcard edge, has fewer than
/// `split_threshold` suffixes, or sits at `max_prefix_depth`. Anything else
/// is split one level further. An accepting initial state yields a single
/// task with an empty prefix.
///
/// # Errors
///
/// - [`PartitionError::InitialStateOutOfRange`] for a bad `initial_state`.
/// - [`PartitionError::UnknownState`] if a task target is missing from
///   `states` (use [`reachable_states`] to build a complete list).
/// - [`PartitionError::ZeroDepth`] if `max_prefix_depth` is 0.
pub fn create_traversal_tasks<I: AcceptInfo>(
    cache: &NodeCache<I>,
    states: &[NodeId],
    initial_state: usize,
    config: &PartitionConfig,
) -> Result<Vec<TraversalTask>, PartitionError> {
    if config.max_prefix_depth == 0 {
        return Err(PartitionError::ZeroDepth);
    }
    let root = *states
        .get(initial_state)
        .ok_or(PartitionError::InitialStateOutOfRange {
            index: initial_state,
            len: states.len(),
        })?;

    // First occurrence wins if a state is listed twice.
    let mut index: FxHashMap<NodeId, usize> = FxHashMap::default();
    for (i, &id) in states.iter().enumerate() {
        index.entry(id).or_insert(i);
    }
    let task = |prefix: Vec<Symbol>, target: NodeId| {
        index
            .get(&target)
            .map(|&state_index| TraversalTask { prefix, state_index })
            .ok_or(PartitionError::UnknownState(target))
    };

    if cache.node(root).is_accepting() {
        return Ok(vec![task(Vec::new(), root)?]);
    }

    let counts = num_suffixes(cache, root);
    let mut tasks = Vec::new();
    let mut stack = vec![Step::Split(root, Vec::new())];
    while let Some(step) = stack.pop() {
        let (id, prefix) = match step {
            Step::Emit(t) => {
                tasks.push(t);
                continue;
            }
            Step::Split(id, prefix) => (id, prefix),
        };
        // Reversed so the lowest symbol is popped first.
        for &(sym, child) in cache.node(id).transitions().iter().rev() {
            let mut p = prefix.clone();
            p.push(sym);
            let target = cache.node(child);
            let settled = target.is_accepting()
                || target.wildcard_child().is_some()
                || counts.get(&child).copied().unwrap_or(0) < config.split_threshold
                || p.len() >= config.max_prefix_depth;
            stack.push(if settled {
                Step::Emit(task(p, child)?)
            } else {
                Step::Split(child, p)
            });
        }
    }
    debug!(tasks = tasks.len(), root = %root, "partitioned traversal");
    Ok(tasks)
}

/// Execute one task: realize its prefix as bytes and traverse from its state.
///
/// Wildcards in the prefix consume the representative sequence starting at
/// `anyfield`, and traversal below continues that sequence, so a task's
/// output is exactly the slice of `traverse_tree(initial, .., anyfield)` it
/// covers.
///
/// # Errors
///
/// [`PartitionError::TaskStateOutOfRange`] if `task.state_index` does not
/// index into `states`.
pub fn run_task<I, F>(
    cache: &NodeCache<I>,
    states: &[NodeId],
    task: &TraversalTask,
    anyfield: u8,
    callback: F,
) -> Result<(), PartitionError>
where
    I: AcceptInfo,
    F: FnMut(&[u8]),
{
    let state = *states
        .get(task.state_index)
        .ok_or(PartitionError::TaskStateOutOfRange {
            index: task.state_index,
            len: states.len(),
        })?;
    let mut any = anyfield;
    let mut prefix = Vec::with_capacity(task.prefix.len());
    for sym in &task.prefix {
        match sym {
            Symbol::Byte(b) => prefix.push(*b),
            Symbol::Wildcard => {
                prefix.push(any);
                any = next_anyfield(any);
            }
        }
    }
    traverse_tree(cache, state, callback, &prefix, any);
    Ok(())
}
