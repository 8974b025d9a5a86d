//! Immutable automaton state.
//!
//! A node is accepting iff it carries an info payload, so "accepting without
//! info" and "info without accepting" are unrepresentable. Transitions are
//! kept sorted by [`Symbol`], which makes the derived `Eq`/`Hash` a structural
//! signature once children are canonical ids.

use crate::types::{AcceptInfo, NodeId, Symbol};

/// One automaton state: optional accept payload plus sorted transitions.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Node<I> {
    accept: Option<I>,
    transitions: Vec<(Symbol, NodeId)>,
}

impl<I> Node<I> {
    /// Non-accepting node without transitions.
    #[inline]
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            accept: None,
            transitions: Vec::new(),
        }
    }

    /// Accepting node without transitions.
    #[inline]
    #[must_use]
    pub const fn leaf(info: I) -> Self {
        Self {
            accept: Some(info),
            transitions: Vec::new(),
        }
    }

    /// Whether this node accepts.
    #[inline]
    #[must_use]
    pub const fn is_accepting(&self) -> bool {
        self.accept.is_some()
    }

    /// Accept payload, present iff accepting.
    #[inline]
    #[must_use]
    pub const fn accept_info(&self) -> Option<&I> {
        self.accept.as_ref()
    }

    /// Transitions in ascending symbol order.
    #[inline]
    #[must_use]
    pub fn transitions(&self) -> &[(Symbol, NodeId)] {
        &self.transitions
    }

    /// Whether the node has no outgoing transitions.
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Child reached by exactly `sym`.
    #[must_use]
    pub fn child(&self, sym: Symbol) -> Option<NodeId> {
        self.transitions
            .binary_search_by(|(s, _)| s.cmp(&sym))
            .ok()
            .map(|i| self.transitions[i].1)
    }

    /// Child behind the single wildcard edge, if that is what this node has.
    #[must_use]
    pub fn wildcard_child(&self) -> Option<NodeId> {
        match self.transitions.as_slice() {
            [(Symbol::Wildcard, c)] => Some(*c),
            _ => None,
        }
    }

    /// Child followed by concrete byte `b`: the exact edge, else the wildcard.
    #[must_use]
    pub fn step(&self, b: u8) -> Option<NodeId> {
        self.child(Symbol::Byte(b)).or_else(|| self.wildcard_child())
    }

    /// Whether adding an edge labelled `sym` keeps the wildcard exclusive.
    #[must_use]
    pub fn accepts_edge(&self, sym: Symbol) -> bool {
        edge_fits(&self.transitions, sym)
    }

    /// Sorted, duplicate-free, and the wildcard (if any) stands alone.
    #[must_use]
    pub fn has_valid_shape(&self) -> bool {
        let sorted = self.transitions.windows(2).all(|w| w[0].0 < w[1].0);
        let wildcard_ok = self.transitions.len() <= 1
            || !self.transitions.iter().any(|(s, _)| s.is_wildcard());
        sorted && wildcard_ok
    }

    pub(crate) fn from_parts(accept: Option<I>, transitions: Vec<(Symbol, NodeId)>) -> Self {
        Self {
            accept,
            transitions,
        }
    }
}

impl<I: AcceptInfo> Node<I> {
    /// Copy with the accept payload replaced.
    #[must_use]
    pub(crate) fn with_accept(&self, info: I) -> Self {
        Self {
            accept: Some(info),
            transitions: self.transitions.clone(),
        }
    }

    /// Copy with the edge for `sym` pointing at `child` (inserted or replaced).
    ///
    /// Callers check [`Node::accepts_edge`] first.
    #[must_use]
    pub(crate) fn with_child(&self, sym: Symbol, child: NodeId) -> Self {
        let mut transitions = self.transitions.clone();
        match transitions.binary_search_by(|(s, _)| s.cmp(&sym)) {
            Ok(i) => transitions[i].1 = child,
            Err(i) => transitions.insert(i, (sym, child)),
        }
        Self {
            accept: self.accept.clone(),
            transitions,
        }
    }
}

/// Wildcard exclusivity for a sorted edge list about to gain `sym`.
pub(crate) fn edge_fits<T>(edges: &[(Symbol, T)], sym: Symbol) -> bool {
    match edges {
        [] => true,
        [(Symbol::Wildcard, _)] => sym.is_wildcard(),
        _ => !sym.is_wildcard(),
    }
}
