//! The grouped table container.
//!
//! `GroupedTableContainer` ties an [`ItemSource`] to a [`GroupIndex`], an
//! [`ExpansionState`] and a [`VisibleOrderCache`], and exposes one navigation
//! contract whether or not grouping is active.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_grouptable_core::logging::{span_names, targets};
use horizon_grouptable_core::{ConnectionId, PerfSpan, Signal, TreeFormatOptions, grouptable_warn};
use parking_lot::RwLock;

use super::debug::GroupTreeDebug;
use super::expansion::ExpansionState;
use super::group_index::GroupIndex;
use super::group_key::GroupKey;
use super::source::{BindingState, ItemSource};
use super::value::PropertyValue;
use super::visible::{VisibleOrderCache, VisibleRow, VisibleSnapshot};
use crate::config::ContainerConfig;
use crate::error::{GroupingError, Result};

/// Signals emitted by a [`GroupedTableContainer`] after its own structural
/// changes.
pub struct ContainerSignals {
    /// Emitted after `group_by`, with the new property list.
    pub grouped: Signal<Vec<String>>,
    /// Emitted after a group is expanded.
    pub expanded: Signal<GroupKey>,
    /// Emitted after a group is collapsed.
    pub collapsed: Signal<GroupKey>,
    /// Emitted after any change that rearranges the visible rows.
    pub layout_changed: Signal<()>,
}

static_assertions::assert_impl_all!(ContainerSignals: Send, Sync);

impl Default for ContainerSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerSignals {
    /// Creates a new set of container signals.
    pub fn new() -> Self {
        Self {
            grouped: Signal::new(),
            expanded: Signal::new(),
            collapsed: Signal::new(),
            layout_changed: Signal::new(),
        }
    }
}

struct ContainerState<Id> {
    index: GroupIndex<Id>,
    expansion: ExpansionState,
    cache: VisibleOrderCache<Id>,
}

/// A grouped, partially expandable projection of an item source.
///
/// The container subscribes to its source's change signals. A notification
/// only marks the container stale; the grouping pass is re-run with the
/// active properties on the next read, and expansion of groups that still
/// exist is carried over.
///
/// All methods take `&self`. The container is meant to be driven from one
/// thread; it holds no lock across calls into the source or across signal
/// emission.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use horizon_grouptable::model::{
///     GroupItem, GroupKey, GroupedTableContainer, ListSource, PropertyValue, VisibleRow,
/// };
///
/// #[derive(Clone)]
/// struct Employee {
///     id: u32,
///     dept: &'static str,
/// }
///
/// impl GroupItem for Employee {
///     type Id = u32;
///     fn id(&self) -> u32 {
///         self.id
///     }
///     fn property(&self, name: &str) -> Option<PropertyValue> {
///         (name == "dept").then(|| PropertyValue::from(self.dept))
///     }
/// }
///
/// let source = Arc::new(ListSource::with_items(vec![
///     Employee { id: 1, dept: "X" },
///     Employee { id: 2, dept: "Y" },
///     Employee { id: 3, dept: "X" },
/// ]));
/// let container = GroupedTableContainer::new(source);
/// container.group_by(["dept"]);
///
/// let x = GroupKey::new("dept", "X");
/// container.expand(&x);
/// assert_eq!(
///     container.item_ids(),
///     vec![
///         VisibleRow::Group(x),
///         VisibleRow::Item(1),
///         VisibleRow::Item(3),
///         VisibleRow::Group(GroupKey::new("dept", "Y")),
///     ]
/// );
/// ```
pub struct GroupedTableContainer<S: ItemSource> {
    source: Arc<S>,
    config: ContainerConfig,
    state: RwLock<ContainerState<S::Id>>,
    source_dirty: Arc<AtomicBool>,
    connections: [ConnectionId; 2],
    empty: Arc<VisibleSnapshot<S::Id>>,
    signals: ContainerSignals,
}

impl<S: ItemSource> GroupedTableContainer<S> {
    /// Creates an ungrouped container over `source`.
    pub fn new(source: Arc<S>) -> Self {
        Self::with_config(source, ContainerConfig::default())
    }

    /// Creates a container, grouped by `config.group_properties`.
    pub fn with_config(source: Arc<S>, config: ContainerConfig) -> Self {
        let source_dirty = Arc::new(AtomicBool::new(false));

        let dirty = source_dirty.clone();
        let item_set_connection = source.signals().item_set_changed.connect(move |change| {
            tracing::trace!(target: targets::CONTAINER, ?change, "source item set changed");
            dirty.store(true, Ordering::SeqCst);
        });
        let dirty = source_dirty.clone();
        let state_connection = source.signals().state_changed.connect(move |state| {
            tracing::trace!(target: targets::CONTAINER, ?state, "source state changed");
            dirty.store(true, Ordering::SeqCst);
        });

        let index = build_index(&*source, &config.group_properties);
        let mut expansion = ExpansionState::new();
        if config.expand_all_on_group && index.has_groups() {
            expansion.expand_all(&index);
        }

        Self {
            source,
            config,
            state: RwLock::new(ContainerState {
                index,
                expansion,
                cache: VisibleOrderCache::new(),
            }),
            source_dirty,
            connections: [item_set_connection, state_connection],
            empty: Arc::new(VisibleSnapshot::empty()),
            signals: ContainerSignals::new(),
        }
    }

    /// The backing source.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// The configuration the container was created with.
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns the signals for this container.
    pub fn signals(&self) -> &ContainerSignals {
        &self.signals
    }

    // =========================================================================
    // Grouping
    // =========================================================================

    /// Groups the items by `properties`, outermost first.
    ///
    /// The current expansion is saved, the tree rebuilt, and every saved key
    /// that still names a group is re-expanded; keys from an unrelated
    /// grouping are dropped. An empty list removes grouping altogether.
    pub fn group_by<I, P>(&self, properties: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let properties: Vec<String> = properties.into_iter().map(Into::into).collect();
        if properties
            .iter()
            .enumerate()
            .any(|(i, p)| properties[..i].contains(p))
        {
            grouptable_warn!(?properties, "grouping property listed more than once");
        }
        self.source_dirty.store(false, Ordering::SeqCst);
        self.regroup(&properties, self.config.expand_all_on_group);
        self.signals.grouped.emit(properties);
        self.signals.layout_changed.emit(());
    }

    /// Re-runs the grouping pass with the active properties.
    pub fn refresh(&self) {
        self.source_dirty.store(false, Ordering::SeqCst);
        let properties = self.state.read().index.properties().to_vec();
        self.regroup(&properties, false);
        self.signals.layout_changed.emit(());
    }

    /// Rebuilds the index from the source, then swaps it in under the lock.
    fn regroup(&self, properties: &[String], expand_all: bool) {
        let _perf = PerfSpan::new(span_names::REGROUP);
        let index = build_index(&*self.source, properties);

        let mut state = self.state.write();
        let saved = std::mem::take(&mut state.expansion);
        state.index = index;
        let ContainerState {
            index,
            expansion,
            cache,
        } = &mut *state;
        if self.config.restore_expansion {
            expansion.restore_from(saved, index);
        }
        if expand_all && index.has_groups() {
            expansion.expand_all(index);
        }
        cache.invalidate();
        tracing::debug!(
            target: targets::CONTAINER,
            ?properties,
            groups = index.group_count(),
            expanded = expansion.len(),
            "regrouped"
        );
    }

    /// Applies a pending source change, if any.
    fn sync(&self) {
        if !self.source_dirty.swap(false, Ordering::SeqCst) {
            return;
        }
        let properties = self.state.read().index.properties().to_vec();
        self.regroup(&properties, false);
        self.signals.layout_changed.emit(());
    }

    fn with_index<R>(&self, f: impl FnOnce(&GroupIndex<S::Id>) -> R) -> R {
        self.sync();
        f(&self.state.read().index)
    }

    /// Returns `true` if grouping is active.
    pub fn has_groups(&self) -> bool {
        self.with_index(|index| index.has_groups())
    }

    /// The active grouping properties, empty when ungrouped.
    pub fn group_properties(&self) -> Vec<String> {
        self.with_index(|index| index.properties().to_vec())
    }

    /// Root group keys in first-occurrence order.
    pub fn root_groups(&self) -> Vec<GroupKey> {
        self.with_index(|index| index.root_groups().to_vec())
    }

    /// Returns `true` if `key` names a group in the current tree.
    pub fn contains_group(&self, key: &GroupKey) -> bool {
        self.with_index(|index| index.contains_group(key))
    }

    /// Returns `true` if `row` is a group header of the current tree.
    pub fn is_group(&self, row: &VisibleRow<S::Id>) -> bool {
        row.as_group().is_some_and(|key| self.contains_group(key))
    }

    /// Resolves a row to its group key.
    ///
    /// Fails for item rows and for keys not in the current tree.
    pub fn group_key_of(&self, row: &VisibleRow<S::Id>) -> Result<GroupKey> {
        match row {
            VisibleRow::Item(_) => Err(GroupingError::not_a_group(row)),
            VisibleRow::Group(key) if self.contains_group(key) => Ok(key.clone()),
            VisibleRow::Group(key) => Err(GroupingError::unknown_group(key)),
        }
    }

    /// Returns `true` if the group has nested groups.
    pub fn has_children(&self, key: &GroupKey) -> bool {
        self.with_index(|index| index.has_children(key))
    }

    /// Nested group keys; empty at the deepest level or for unknown keys.
    pub fn children(&self, key: &GroupKey) -> Vec<GroupKey> {
        self.with_index(|index| index.children(key).to_vec())
    }

    /// Items held directly by the group (deepest level only).
    pub fn own_child_items(&self, key: &GroupKey) -> Vec<S::Item> {
        let ids = self.with_index(|index| index.own_item_ids(key).to_vec());
        ids.iter().filter_map(|id| self.source.item(id)).collect()
    }

    /// Items from every nested level of the group.
    pub fn child_items(&self, key: &GroupKey) -> Vec<S::Item> {
        self.group_item_ids(key)
            .iter()
            .filter_map(|id| self.source.item(id))
            .collect()
    }

    /// The grouping property of the group's level.
    pub fn group_property(&self, key: &GroupKey) -> Result<String> {
        self.require_group(key)?;
        Ok(key.property().to_string())
    }

    /// The value shared by the group's items.
    pub fn group_property_value(&self, key: &GroupKey) -> Result<PropertyValue> {
        self.require_group(key)?;
        Ok(key.value().clone())
    }

    fn require_group(&self, key: &GroupKey) -> Result<()> {
        if self.contains_group(key) {
            Ok(())
        } else {
            Err(GroupingError::unknown_group(key))
        }
    }

    /// Identifiers of every item in the group's subtree.
    pub fn group_item_ids(&self, key: &GroupKey) -> Vec<S::Id> {
        self.with_index(|index| index.all_item_ids(key))
    }

    /// Number of items in the group's subtree; 0 for unknown keys.
    pub fn group_items_count(&self, key: &GroupKey) -> usize {
        self.with_index(|index| index.item_count(key))
    }

    /// The deepest group containing an item.
    pub fn parent_group(&self, id: &S::Id) -> Option<GroupKey> {
        self.with_index(|index| index.parent_group(id).cloned())
    }

    /// The groups containing an item, root first.
    pub fn group_path(&self, id: &S::Id) -> Vec<GroupKey> {
        self.with_index(|index| index.group_path(id))
    }

    // =========================================================================
    // Expand/Collapse
    // =========================================================================

    /// Expands a group. Returns `true` if the visible rows changed.
    ///
    /// Keys that name no group in the current tree are ignored.
    pub fn expand(&self, key: &GroupKey) -> bool {
        self.sync();
        let changed = {
            let mut state = self.state.write();
            let changed = state.index.contains_group(key) && state.expansion.expand(key.clone());
            if changed {
                state.cache.invalidate();
            }
            changed
        };
        if changed {
            self.signals.expanded.emit(key.clone());
            self.signals.layout_changed.emit(());
        }
        changed
    }

    /// Collapses a group. Returns `true` if it was expanded.
    pub fn collapse(&self, key: &GroupKey) -> bool {
        self.sync();
        let changed = {
            let mut state = self.state.write();
            let changed = state.index.contains_group(key) && state.expansion.collapse(key);
            if changed {
                state.cache.invalidate();
            }
            changed
        };
        if changed {
            self.signals.collapsed.emit(key.clone());
            self.signals.layout_changed.emit(());
        }
        changed
    }

    /// Expands every group at every depth.
    pub fn expand_all(&self) {
        self.sync();
        {
            let mut state = self.state.write();
            if !state.index.has_groups() {
                return;
            }
            let ContainerState {
                index,
                expansion,
                cache,
            } = &mut *state;
            expansion.expand_all(index);
            cache.invalidate();
        }
        self.signals.layout_changed.emit(());
    }

    /// Collapses every group.
    pub fn collapse_all(&self) {
        self.sync();
        {
            let mut state = self.state.write();
            if !state.index.has_groups() {
                return;
            }
            state.expansion.collapse_all();
            state.cache.invalidate();
        }
        self.signals.layout_changed.emit(());
    }

    /// Returns `true` if `key` names an expanded group of the current tree.
    pub fn is_expanded(&self, key: &GroupKey) -> bool {
        self.sync();
        let state = self.state.read();
        state.index.contains_group(key) && state.expansion.is_expanded(key)
    }

    /// Expands every group on an item's path so that the item is visible.
    ///
    /// Returns `true` if anything was expanded.
    pub fn expand_to_item(&self, id: &S::Id) -> bool {
        let path = self.group_path(id);
        let mut changed = false;
        for key in &path {
            changed |= self.expand(key);
        }
        changed
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// The current visible sequence.
    ///
    /// An inactive source yields an empty snapshot without touching the
    /// group tree.
    pub fn visible_rows(&self) -> Arc<VisibleSnapshot<S::Id>> {
        if self.source.state() == BindingState::Inactive {
            return self.empty.clone();
        }
        self.sync();

        if let Some(snapshot) = self.state.read().cache.current() {
            return snapshot;
        }
        let mut state = self.state.write();
        let ContainerState {
            index,
            expansion,
            cache,
        } = &mut *state;
        let snapshot = cache.get_or_rebuild(index, expansion);
        tracing::debug!(target: targets::CONTAINER, rows = snapshot.len(), "visible rows rebuilt");
        snapshot
    }

    /// Visible rows: group headers interleaved with the items of expanded
    /// deepest-level groups, or the plain item sequence when ungrouped.
    pub fn item_ids(&self) -> Vec<VisibleRow<S::Id>> {
        self.visible_rows().rows().to_vec()
    }

    /// Number of visible rows.
    pub fn size(&self) -> usize {
        self.visible_rows().len()
    }

    /// The first visible row.
    pub fn first_item_id(&self) -> Option<VisibleRow<S::Id>> {
        self.visible_rows().first().cloned()
    }

    /// The last visible row.
    pub fn last_item_id(&self) -> Option<VisibleRow<S::Id>> {
        self.visible_rows().last().cloned()
    }

    /// The row after `row`; `None` at the end or if `row` is not visible.
    pub fn next_item_id(&self, row: &VisibleRow<S::Id>) -> Option<VisibleRow<S::Id>> {
        self.visible_rows().next(row).cloned()
    }

    /// The row before `row`; `None` at the start or if `row` is not visible.
    pub fn prev_item_id(&self, row: &VisibleRow<S::Id>) -> Option<VisibleRow<S::Id>> {
        self.visible_rows().previous(row).cloned()
    }

    /// Returns `true` if `row` is the first visible row.
    pub fn is_first_id(&self, row: &VisibleRow<S::Id>) -> bool {
        self.visible_rows().is_first(row)
    }

    /// Returns `true` if `row` is the last visible row.
    pub fn is_last_id(&self, row: &VisibleRow<S::Id>) -> bool {
        self.visible_rows().is_last(row)
    }

    /// Position of a visible row.
    pub fn position_of(&self, row: &VisibleRow<S::Id>) -> Option<usize> {
        self.visible_rows().position(row)
    }

    /// The row at `position`.
    pub fn row_at(&self, position: usize) -> Result<VisibleRow<S::Id>> {
        let snapshot = self.visible_rows();
        snapshot
            .get(position)
            .cloned()
            .ok_or_else(|| GroupingError::out_of_range(position, snapshot.len()))
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Renders the current group tree as text.
    pub fn format_tree(&self, options: TreeFormatOptions) -> String {
        self.sync();
        let state = self.state.read();
        GroupTreeDebug::with_options(options).format(&state.index, &state.expansion)
    }
}

impl<S: ItemSource> Drop for GroupedTableContainer<S> {
    fn drop(&mut self) {
        let [item_set_connection, state_connection] = self.connections;
        self.source.signals().item_set_changed.disconnect(item_set_connection);
        self.source.signals().state_changed.disconnect(state_connection);
    }
}

fn build_index<S: ItemSource>(source: &S, properties: &[String]) -> GroupIndex<S::Id> {
    GroupIndex::build(source.item_ids(), properties, |id, property| {
        source.property_value(id, property)
    })
}
