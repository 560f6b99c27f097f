//! The grouping tree built from a flat item sequence.
//!
//! [`GroupIndex`] partitions items by an ordered list of grouping properties.
//! Nodes live in an arena keyed by [`GroupKey`]; a node refers to its parent
//! and children by key, never by pointer, so a rebuild simply drops the old
//! arena.

use std::collections::HashMap;
use std::hash::Hash;

use horizon_grouptable_core::PerfSpan;
use horizon_grouptable_core::logging::{span_names, targets};

use super::group_key::GroupKey;
use super::value::PropertyValue;

/// A node in the grouping tree.
///
/// A node below the deepest grouping level owns child groups; a node at the
/// deepest level owns the identifiers of the items matching its full key.
#[derive(Debug, Clone)]
pub struct GroupNode<Id> {
    key: GroupKey,
    parent: Option<GroupKey>,
    children: Vec<GroupKey>,
    own_items: Vec<Id>,
    item_count: usize,
}

impl<Id> GroupNode<Id> {
    fn new(key: GroupKey, parent: Option<GroupKey>) -> Self {
        Self {
            key,
            parent,
            children: Vec::new(),
            own_items: Vec::new(),
            item_count: 0,
        }
    }

    /// The key identifying this node.
    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    /// The parent group's key, `None` for root groups.
    pub fn parent(&self) -> Option<&GroupKey> {
        self.parent.as_ref()
    }

    /// Depth of this node (1 for root groups).
    pub fn depth(&self) -> usize {
        self.key.depth()
    }

    /// Child group keys in first-occurrence order.
    pub fn children(&self) -> &[GroupKey] {
        &self.children
    }

    /// Item identifiers held directly by this node, in source order.
    pub fn own_items(&self) -> &[Id] {
        &self.own_items
    }

    /// Number of items in the whole subtree.
    pub fn item_count(&self) -> usize {
        self.item_count
    }
}

/// A grouping tree over a flat sequence of item identifiers.
///
/// Grouping partitions, it never sorts: sibling groups appear in the order in
/// which their value first occurs among the items under the parent, and items
/// keep their source order inside each deepest-level group.
///
/// With an empty property list there are no groups at all; the index then
/// only remembers the flat item sequence.
///
/// # Example
///
/// ```
/// use horizon_grouptable::model::{GroupIndex, GroupKey, PropertyValue};
///
/// let depts = [(1, "X"), (2, "Y"), (3, "X")];
/// let index = GroupIndex::build(
///     depts.iter().map(|(id, _)| *id),
///     &["dept".to_string()],
///     |id, _property| {
///         depts
///             .iter()
///             .find(|(item, _)| item == id)
///             .map(|(_, dept)| PropertyValue::from(*dept))
///     },
/// );
///
/// let x = GroupKey::new("dept", "X");
/// assert_eq!(index.root_groups(), &[x.clone(), GroupKey::new("dept", "Y")]);
/// assert_eq!(index.own_item_ids(&x), &[1, 3]);
/// assert_eq!(index.item_count(&x), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GroupIndex<Id> {
    properties: Vec<String>,
    items: Vec<Id>,
    roots: Vec<GroupKey>,
    nodes: HashMap<GroupKey, GroupNode<Id>>,
    item_groups: HashMap<Id, GroupKey>,
}

impl<Id> Default for GroupIndex<Id> {
    fn default() -> Self {
        Self {
            properties: Vec::new(),
            items: Vec::new(),
            roots: Vec::new(),
            nodes: HashMap::new(),
            item_groups: HashMap::new(),
        }
    }
}

impl<Id: Clone + Eq + Hash> GroupIndex<Id> {
    /// Creates an index with no items and no grouping.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds the grouping tree.
    ///
    /// `lookup` returns the value of a property for an item, or `None` when
    /// the item does not carry that property; missing values group under
    /// [`PropertyValue::Absent`]. Building never fails.
    pub fn build<I, F>(item_ids: I, properties: &[String], mut lookup: F) -> Self
    where
        I: IntoIterator<Item = Id>,
        F: FnMut(&Id, &str) -> Option<PropertyValue>,
    {
        let _perf = PerfSpan::new(span_names::INDEX_BUILD);
        let mut index = Self {
            properties: properties.to_vec(),
            ..Self::default()
        };

        for id in item_ids {
            if let Some(leaf) = index.place(&id, &mut lookup) {
                index.item_groups.insert(id.clone(), leaf);
            }
            index.items.push(id);
        }

        tracing::debug!(
            target: targets::INDEX,
            items = index.items.len(),
            groups = index.nodes.len(),
            depth = index.properties.len(),
            "built group index"
        );
        index
    }

    /// Walks (creating as needed) the path of groups for one item and
    /// returns the deepest key, or `None` when ungrouped.
    fn place<F>(&mut self, id: &Id, lookup: &mut F) -> Option<GroupKey>
    where
        F: FnMut(&Id, &str) -> Option<PropertyValue>,
    {
        let mut parent: Option<GroupKey> = None;

        for property in &self.properties {
            let value = lookup(id, property).unwrap_or(PropertyValue::Absent);
            let key = match &parent {
                Some(p) => p.child(property.as_str(), value),
                None => GroupKey::new(property.as_str(), value),
            };

            if !self.nodes.contains_key(&key) {
                self.nodes
                    .insert(key.clone(), GroupNode::new(key.clone(), parent.clone()));
                match &parent {
                    Some(p) => {
                        if let Some(parent_node) = self.nodes.get_mut(p) {
                            parent_node.children.push(key.clone());
                        }
                    }
                    None => self.roots.push(key.clone()),
                }
            }
            if let Some(node) = self.nodes.get_mut(&key) {
                node.item_count += 1;
            }
            parent = Some(key);
        }

        let leaf = parent?;
        if let Some(node) = self.nodes.get_mut(&leaf) {
            node.own_items.push(id.clone());
        }
        Some(leaf)
    }

    /// Returns `true` if at least one grouping property is active.
    pub fn has_groups(&self) -> bool {
        !self.properties.is_empty()
    }

    /// The active grouping properties, outermost first.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// The flat item sequence the index was built from, in source order.
    pub fn items(&self) -> &[Id] {
        &self.items
    }

    /// Depth-1 group keys in first-occurrence order.
    pub fn root_groups(&self) -> &[GroupKey] {
        &self.roots
    }

    /// Looks up a node.
    pub fn node(&self, key: &GroupKey) -> Option<&GroupNode<Id>> {
        self.nodes.get(key)
    }

    /// Returns `true` if `key` names a group in this tree.
    pub fn contains_group(&self, key: &GroupKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Child group keys, empty for deepest-level or unknown groups.
    pub fn children(&self, key: &GroupKey) -> &[GroupKey] {
        self.nodes.get(key).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Returns `true` if the group has nested groups.
    pub fn has_children(&self, key: &GroupKey) -> bool {
        !self.children(key).is_empty()
    }

    /// Items held directly by the group; empty above the deepest level.
    pub fn own_item_ids(&self, key: &GroupKey) -> &[Id] {
        self.nodes.get(key).map(|n| n.own_items.as_slice()).unwrap_or(&[])
    }

    /// All items in the group's subtree, in depth-first sibling order.
    pub fn all_item_ids(&self, key: &GroupKey) -> Vec<Id> {
        let mut result = Vec::with_capacity(self.item_count(key));
        self.collect_items(key, &mut result);
        result
    }

    fn collect_items(&self, key: &GroupKey, out: &mut Vec<Id>) {
        let Some(node) = self.nodes.get(key) else {
            return;
        };
        out.extend(node.own_items.iter().cloned());
        for child in &node.children {
            self.collect_items(child, out);
        }
    }

    /// Number of items in the group's subtree; 0 for unknown groups.
    pub fn item_count(&self, key: &GroupKey) -> usize {
        self.nodes.get(key).map_or(0, |n| n.item_count)
    }

    /// Total number of group nodes at all depths.
    pub fn group_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every group key, pre-order depth first.
    pub fn all_groups(&self) -> Vec<GroupKey> {
        let mut result = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_groups(root, &mut result);
        }
        result
    }

    fn collect_groups(&self, key: &GroupKey, out: &mut Vec<GroupKey>) {
        out.push(key.clone());
        for child in self.children(key) {
            self.collect_groups(child, out);
        }
    }

    /// The deepest group containing an item.
    pub fn parent_group(&self, id: &Id) -> Option<&GroupKey> {
        self.item_groups.get(id)
    }

    /// The chain of groups containing an item, root first.
    pub fn group_path(&self, id: &Id) -> Vec<GroupKey> {
        let mut path = Vec::new();
        let mut current = self.item_groups.get(id).cloned();
        while let Some(key) = current {
            current = self.nodes.get(&key).and_then(|n| n.parent.clone());
            path.push(key);
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: u32,
        dept: &'static str,
        level: Option<i64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, dept: "X", level: Some(1) },
            Row { id: 2, dept: "Y", level: Some(2) },
            Row { id: 3, dept: "X", level: Some(2) },
            Row { id: 4, dept: "X", level: Some(1) },
            Row { id: 5, dept: "Y", level: None },
        ]
    }

    fn build(rows: &[Row], properties: &[&str]) -> GroupIndex<u32> {
        let properties: Vec<String> = properties.iter().map(|p| p.to_string()).collect();
        GroupIndex::build(rows.iter().map(|r| r.id), &properties, |id, property| {
            let row = rows.iter().find(|r| r.id == *id)?;
            match property {
                "dept" => Some(PropertyValue::from(row.dept)),
                "level" => row.level.map(PropertyValue::from),
                _ => None,
            }
        })
    }

    #[test]
    fn test_ungrouped_index_is_flat() {
        let rows = rows();
        let index = build(&rows, &[]);
        assert!(!index.has_groups());
        assert!(index.root_groups().is_empty());
        assert_eq!(index.items(), &[1, 2, 3, 4, 5]);
        assert_eq!(index.parent_group(&1), None);
    }

    #[test]
    fn test_single_level_first_occurrence_order() {
        let rows = rows();
        let index = build(&rows, &["dept"]);
        let x = GroupKey::new("dept", "X");
        let y = GroupKey::new("dept", "Y");

        assert_eq!(index.root_groups(), &[x.clone(), y.clone()]);
        assert_eq!(index.own_item_ids(&x), &[1, 3, 4]);
        assert_eq!(index.own_item_ids(&y), &[2, 5]);
        assert!(!index.has_children(&x));
        assert_eq!(index.item_count(&y), 2);
    }

    #[test]
    fn test_two_levels() {
        let rows = rows();
        let index = build(&rows, &["dept", "level"]);
        let x = GroupKey::new("dept", "X");
        let x1 = x.child("level", 1);
        let x2 = x.child("level", 2);

        assert_eq!(index.children(&x), &[x1.clone(), x2.clone()]);
        assert!(index.own_item_ids(&x).is_empty());
        assert_eq!(index.own_item_ids(&x1), &[1, 4]);
        assert_eq!(index.all_item_ids(&x), vec![1, 4, 3]);
        assert_eq!(index.item_count(&x), 3);
        assert_eq!(index.node(&x2).and_then(|n| n.parent()), Some(&x));
        assert_eq!(index.node(&x2).map(|n| n.depth()), Some(2));
    }

    #[test]
    fn test_missing_property_forms_absent_group() {
        let rows = rows();
        let index = build(&rows, &["dept", "level"]);
        let absent = GroupKey::new("dept", "Y").child("level", PropertyValue::Absent);

        assert!(index.contains_group(&absent));
        assert_eq!(index.own_item_ids(&absent), &[5]);
    }

    #[test]
    fn test_every_item_lands_in_exactly_one_leaf() {
        let rows = rows();
        let index = build(&rows, &["level", "dept"]);

        let mut all: Vec<u32> = index
            .root_groups()
            .iter()
            .flat_map(|root| index.all_item_ids(root))
            .collect();
        assert_eq!(all.len(), rows.len());
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_group_path_and_parent_group() {
        let rows = rows();
        let index = build(&rows, &["dept", "level"]);
        let x = GroupKey::new("dept", "X");
        let x2 = x.child("level", 2);

        assert_eq!(index.parent_group(&3), Some(&x2));
        assert_eq!(index.group_path(&3), vec![x, x2]);
        assert!(index.group_path(&99).is_empty());
    }

    #[test]
    fn test_unknown_key_queries_are_empty() {
        let rows = rows();
        let index = build(&rows, &["dept"]);
        let unknown = GroupKey::new("dept", "Z");

        assert!(!index.contains_group(&unknown));
        assert!(index.children(&unknown).is_empty());
        assert!(index.own_item_ids(&unknown).is_empty());
        assert!(index.all_item_ids(&unknown).is_empty());
        assert_eq!(index.item_count(&unknown), 0);
    }

    #[test]
    fn test_all_groups_pre_order() {
        let rows = rows();
        let index = build(&rows, &["dept", "level"]);
        let all = index.all_groups();

        assert_eq!(all.len(), index.group_count());
        assert_eq!(all[0], GroupKey::new("dept", "X"));
        assert_eq!(all[1], GroupKey::new("dept", "X").child("level", 1));
    }
}
