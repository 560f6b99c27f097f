//! The visible row sequence and its lazily rebuilt cache.
//!
//! The visible sequence is the pre-order, depth-first flattening of the group
//! tree filtered by [`ExpansionState`]: every root group is listed; a group's
//! children (or, at the deepest level, its items) follow it only while the
//! group is expanded. Without grouping, the sequence is the flat item list.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use horizon_grouptable_core::PerfSpan;
use horizon_grouptable_core::logging::{span_names, targets};

use super::expansion::ExpansionState;
use super::group_index::GroupIndex;
use super::group_key::GroupKey;

/// One row of the visible sequence: a group header or a leaf item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisibleRow<Id> {
    /// A group header row.
    Group(GroupKey),
    /// A backing-collection item row.
    Item(Id),
}

impl<Id> VisibleRow<Id> {
    /// Returns `true` for group header rows.
    pub fn is_group(&self) -> bool {
        matches!(self, VisibleRow::Group(_))
    }

    /// The group key, if this is a header row.
    pub fn as_group(&self) -> Option<&GroupKey> {
        match self {
            VisibleRow::Group(key) => Some(key),
            VisibleRow::Item(_) => None,
        }
    }

    /// The item identifier, if this is an item row.
    pub fn as_item(&self) -> Option<&Id> {
        match self {
            VisibleRow::Item(id) => Some(id),
            VisibleRow::Group(_) => None,
        }
    }
}

impl<Id> From<GroupKey> for VisibleRow<Id> {
    fn from(key: GroupKey) -> Self {
        VisibleRow::Group(key)
    }
}

/// An immutable flattening of the visible rows.
///
/// Alongside the ordered rows, a snapshot keeps a position index so that
/// successor/predecessor lookups are O(1). A snapshot is never mutated after
/// construction; the cache replaces it wholesale.
#[derive(Debug, Clone)]
pub struct VisibleSnapshot<Id> {
    rows: Vec<VisibleRow<Id>>,
    positions: HashMap<VisibleRow<Id>, usize>,
}

impl<Id: Clone + Eq + Hash> VisibleSnapshot<Id> {
    /// An empty sequence.
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            positions: HashMap::new(),
        }
    }

    fn from_rows(rows: Vec<VisibleRow<Id>>) -> Self {
        let mut positions = HashMap::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            positions.entry(row.clone()).or_insert(i);
        }
        Self { rows, positions }
    }

    /// Flattens `index` through `expansion`.
    #[tracing::instrument(skip_all, target = "horizon_grouptable::visible", level = "trace")]
    pub fn flatten(index: &GroupIndex<Id>, expansion: &ExpansionState) -> Self {
        let _perf = PerfSpan::new(span_names::FLATTEN);

        if !index.has_groups() {
            return Self::from_rows(index.items().iter().cloned().map(VisibleRow::Item).collect());
        }

        let mut rows = Vec::new();
        for root in index.root_groups() {
            rows.push(VisibleRow::Group(root.clone()));
            collect(index, expansion, root, &mut rows);
        }

        tracing::trace!(target: targets::VISIBLE, rows = rows.len(), "flattened visible rows");
        Self::from_rows(rows)
    }

    /// All rows in display order.
    pub fn rows(&self) -> &[VisibleRow<Id>] {
        &self.rows
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `position`.
    pub fn get(&self, position: usize) -> Option<&VisibleRow<Id>> {
        self.rows.get(position)
    }

    /// The first visible row.
    pub fn first(&self) -> Option<&VisibleRow<Id>> {
        self.rows.first()
    }

    /// The last visible row.
    pub fn last(&self) -> Option<&VisibleRow<Id>> {
        self.rows.last()
    }

    /// Position of a row, `None` if it is not visible.
    pub fn position(&self, row: &VisibleRow<Id>) -> Option<usize> {
        self.positions.get(row).copied()
    }

    /// The row after `row`; `None` at the end or when `row` is not visible.
    pub fn next(&self, row: &VisibleRow<Id>) -> Option<&VisibleRow<Id>> {
        self.position(row).and_then(|i| self.rows.get(i + 1))
    }

    /// The row before `row`; `None` at the start or when `row` is not visible.
    pub fn previous(&self, row: &VisibleRow<Id>) -> Option<&VisibleRow<Id>> {
        let i = self.position(row)?;
        i.checked_sub(1).and_then(|p| self.rows.get(p))
    }

    /// Returns `true` if `row` is the first visible row.
    pub fn is_first(&self, row: &VisibleRow<Id>) -> bool {
        self.first() == Some(row)
    }

    /// Returns `true` if `row` is the last visible row.
    pub fn is_last(&self, row: &VisibleRow<Id>) -> bool {
        self.last() == Some(row)
    }
}

fn collect<Id: Clone + Eq + Hash>(
    index: &GroupIndex<Id>,
    expansion: &ExpansionState,
    key: &GroupKey,
    rows: &mut Vec<VisibleRow<Id>>,
) {
    if !expansion.is_expanded(key) {
        return;
    }
    if index.has_children(key) {
        for child in index.children(key) {
            rows.push(VisibleRow::Group(child.clone()));
            collect(index, expansion, child, rows);
        }
    } else {
        rows.extend(index.own_item_ids(key).iter().cloned().map(VisibleRow::Item));
    }
}

/// Lazily materialized [`VisibleSnapshot`].
///
/// Structural changes call [`invalidate`](Self::invalidate); the next read
/// rebuilds the snapshot in full. Readers hold an `Arc` to the snapshot they
/// got, so they never observe a half-built sequence.
#[derive(Debug)]
pub struct VisibleOrderCache<Id> {
    snapshot: Option<Arc<VisibleSnapshot<Id>>>,
}

impl<Id> Default for VisibleOrderCache<Id> {
    fn default() -> Self {
        Self { snapshot: None }
    }
}

impl<Id: Clone + Eq + Hash> VisibleOrderCache<Id> {
    /// Creates an invalid (empty) cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the current snapshot.
    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            tracing::trace!(target: targets::VISIBLE, "visible order cache invalidated");
        }
    }

    /// Returns `true` if a snapshot is cached.
    pub fn is_valid(&self) -> bool {
        self.snapshot.is_some()
    }

    /// The cached snapshot, if valid.
    pub fn current(&self) -> Option<Arc<VisibleSnapshot<Id>>> {
        self.snapshot.clone()
    }

    /// Returns the cached snapshot, rebuilding it first if invalid.
    pub fn get_or_rebuild(
        &mut self,
        index: &GroupIndex<Id>,
        expansion: &ExpansionState,
    ) -> Arc<VisibleSnapshot<Id>> {
        self.snapshot
            .get_or_insert_with(|| Arc::new(VisibleSnapshot::flatten(index, expansion)))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;

    type Row = VisibleRow<u32>;

    fn index(properties: &[&str]) -> GroupIndex<u32> {
        let data: [(u32, &str, i64); 4] = [(1, "X", 1), (2, "Y", 1), (3, "X", 2), (4, "X", 1)];
        let properties: Vec<String> = properties.iter().map(|p| p.to_string()).collect();
        GroupIndex::build(data.iter().map(|d| d.0), &properties, |id, property| {
            let (_, dept, level) = data.iter().find(|d| d.0 == *id)?;
            match property {
                "dept" => Some(PropertyValue::from(*dept)),
                "level" => Some(PropertyValue::from(*level)),
                _ => None,
            }
        })
    }

    fn group(dept: &str) -> GroupKey {
        GroupKey::new("dept", dept)
    }

    #[test]
    fn test_ungrouped_is_item_sequence() {
        let snapshot = VisibleSnapshot::flatten(&index(&[]), &ExpansionState::new());
        let expected: Vec<Row> = vec![Row::Item(1), Row::Item(2), Row::Item(3), Row::Item(4)];
        assert_eq!(snapshot.rows(), expected.as_slice());
    }

    #[test]
    fn test_collapsed_roots_only() {
        let snapshot = VisibleSnapshot::flatten(&index(&["dept"]), &ExpansionState::new());
        let expected: Vec<Row> = vec![Row::Group(group("X")), Row::Group(group("Y"))];
        assert_eq!(snapshot.rows(), expected.as_slice());
    }

    #[test]
    fn test_expanded_leaf_group_lists_items() {
        let mut expansion = ExpansionState::new();
        expansion.expand(group("X"));
        let snapshot = VisibleSnapshot::flatten(&index(&["dept"]), &expansion);
        let expected: Vec<Row> = vec![
            Row::Group(group("X")),
            Row::Item(1),
            Row::Item(3),
            Row::Item(4),
            Row::Group(group("Y")),
        ];
        assert_eq!(snapshot.rows(), expected.as_slice());
    }

    #[test]
    fn test_nested_expansion_requires_each_level() {
        let index = index(&["dept", "level"]);
        let x1 = group("X").child("level", 1);
        let mut expansion = ExpansionState::new();
        expansion.expand(x1.clone());

        // Parent collapsed: the expanded child stays hidden.
        let snapshot = VisibleSnapshot::flatten(&index, &expansion);
        assert_eq!(snapshot.len(), 2);

        expansion.expand(group("X"));
        let snapshot = VisibleSnapshot::flatten(&index, &expansion);
        let expected: Vec<Row> = vec![
            Row::Group(group("X")),
            Row::Group(x1),
            Row::Item(1),
            Row::Item(4),
            Row::Group(group("X").child("level", 2)),
            Row::Group(group("Y")),
        ];
        assert_eq!(snapshot.rows(), expected.as_slice());
    }

    #[test]
    fn test_navigation() {
        let mut expansion = ExpansionState::new();
        expansion.expand(group("Y"));
        let snapshot = VisibleSnapshot::flatten(&index(&["dept"]), &expansion);

        let first = snapshot.first().cloned().unwrap();
        assert_eq!(first, Row::Group(group("X")));
        assert!(snapshot.is_first(&first));
        assert_eq!(snapshot.previous(&first), None);
        assert_eq!(snapshot.next(&first), Some(&Row::Group(group("Y"))));

        let last = snapshot.last().cloned().unwrap();
        assert_eq!(last, Row::Item(2));
        assert!(snapshot.is_last(&last));
        assert_eq!(snapshot.next(&last), None);

        // Hidden rows navigate like boundaries.
        assert_eq!(snapshot.next(&Row::Item(1)), None);
        assert_eq!(snapshot.previous(&Row::Item(1)), None);
        assert_eq!(snapshot.position(&Row::Item(2)), Some(2));
    }

    #[test]
    fn test_cache_rebuilds_after_invalidate() {
        let index = index(&["dept"]);
        let mut expansion = ExpansionState::new();
        let mut cache = VisibleOrderCache::new();
        assert!(!cache.is_valid());

        let first = cache.get_or_rebuild(&index, &expansion);
        assert_eq!(first.len(), 2);
        assert!(cache.is_valid());

        expansion.expand(group("X"));
        // Still the old snapshot until invalidated.
        assert_eq!(cache.get_or_rebuild(&index, &expansion).len(), 2);

        cache.invalidate();
        assert_eq!(cache.get_or_rebuild(&index, &expansion).len(), 5);
        // The reader's snapshot is untouched by the rebuild.
        assert_eq!(first.len(), 2);
    }
}
