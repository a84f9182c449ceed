#![forbid(unsafe_code)]

//! Per-node expansion state.
//!
//! # Invariants
//!
//! 1. A node's children are laid out only while its ID is in the set.
//! 2. The set changes only through [`ExpansionState::toggle`] (and
//!    [`ExpansionState::reset`] when a new root is loaded).
//! 3. Collapsing a node never touches its descendants' membership, so
//!    re-expanding restores their previous state.

use std::collections::HashSet;

use gtree_model::NodeId;

/// Set of expanded node IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<NodeId>,
}

impl ExpansionState {
    /// State for a freshly loaded tree: only the root is expanded.
    pub fn new(root_id: NodeId) -> Self {
        Self {
            expanded: HashSet::from([root_id]),
        }
    }

    /// Flip membership of `id`. Returns `true` if the node is now expanded.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    #[inline]
    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }

    /// Number of expanded IDs, including ones hidden under collapsed ancestors.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Forget everything and start over for a new root.
    pub fn reset(&mut self, root_id: NodeId) {
        self.expanded.clear();
        self.expanded.insert(root_id);
    }
}
