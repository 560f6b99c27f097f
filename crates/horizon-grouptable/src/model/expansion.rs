//! Expansion state: which groups are currently open.

use std::collections::HashSet;
use std::hash::Hash;

use horizon_grouptable_core::logging::targets;

use super::group_index::GroupIndex;
use super::group_key::GroupKey;

/// The set of expanded group keys.
///
/// Keys are plain values, so the set is independent of any particular
/// [`GroupIndex`]. A key that names no group in the current tree is harmless:
/// it simply never matches while the visible sequence is flattened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: HashSet<GroupKey>,
}

impl ExpansionState {
    /// Creates an empty (fully collapsed) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a group as expanded.
    ///
    /// Returns `true` if the key was not already expanded. The key does not
    /// need to exist in any tree.
    pub fn expand(&mut self, key: GroupKey) -> bool {
        self.expanded.insert(key)
    }

    /// Marks a group as collapsed. Returns `true` if it was expanded.
    pub fn collapse(&mut self, key: &GroupKey) -> bool {
        self.expanded.remove(key)
    }

    /// Expands every group of `index`, at every depth.
    ///
    /// Previously expanded keys are dropped first, so the result is exactly
    /// the group set of `index`.
    pub fn expand_all<Id: Clone + Eq + Hash>(&mut self, index: &GroupIndex<Id>) {
        self.expanded.clear();
        self.expanded.extend(index.all_groups());
        tracing::trace!(target: targets::EXPANSION, expanded = self.expanded.len(), "expanded all groups");
    }

    /// Collapses everything.
    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Returns `true` if the key is expanded.
    pub fn is_expanded(&self, key: &GroupKey) -> bool {
        self.expanded.contains(key)
    }

    /// Number of expanded keys, stale ones included.
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    /// Returns `true` if nothing is expanded.
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }

    /// Iterates over the expanded keys in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &GroupKey> {
        self.expanded.iter()
    }

    /// Replaces this state with the keys of `saved` that name a group in `index`.
    pub fn restore_from<Id: Clone + Eq + Hash>(&mut self, saved: ExpansionState, index: &GroupIndex<Id>) {
        self.expanded.clear();
        if !index.has_groups() {
            return;
        }

        let before = saved.len();
        self.expanded = saved
            .expanded
            .into_iter()
            .filter(|key| index.contains_group(key))
            .collect();
        tracing::debug!(
            target: targets::EXPANSION,
            kept = self.expanded.len(),
            dropped = before - self.expanded.len(),
            "restored expansion state"
        );
    }
}
