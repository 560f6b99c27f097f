//! Item sources: the backing collections a grouped container projects.
//!
//! A container only reads from its source. It needs an ordered list of item
//! identifiers, a property lookup per item, the source's binding state and a
//! change notification channel. [`ListSource`] is an in-memory implementation
//! backed by a `Vec`.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use horizon_grouptable_core::logging::targets;
use horizon_grouptable_core::{Property, Signal, grouptable_debug};
use parking_lot::RwLock;

use super::value::PropertyValue;

/// Lifecycle state of an item source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BindingState {
    /// The source is bound and its items are meaningful.
    #[default]
    Active,
    /// The source is detached; containers report no rows.
    Inactive,
}

/// Describes a change to a source's item set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemSetChange {
    /// Items were inserted starting at `position`.
    Added { position: usize, count: usize },
    /// Items were removed starting at `position`.
    Removed { position: usize, count: usize },
    /// Items were replaced or modified in place.
    Refreshed,
    /// All items were removed.
    Cleared,
}

/// Signals emitted by item sources, always after the change is applied.
pub struct SourceSignals {
    /// Emitted when items are inserted, removed, modified or reloaded.
    pub item_set_changed: Signal<ItemSetChange>,
    /// Emitted when the binding state changes.
    pub state_changed: Signal<BindingState>,
}

impl Default for SourceSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceSignals {
    /// Creates a new set of source signals.
    pub fn new() -> Self {
        Self {
            item_set_changed: Signal::new(),
            state_changed: Signal::new(),
        }
    }
}

/// The read interface a grouped container needs from its data source.
///
/// Identifiers must be unique within the source and stable for as long as
/// the item they name is present.
pub trait ItemSource: Send + Sync {
    /// Stable item identifier.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;
    /// The item type handed back by [`item`](Self::item).
    type Item: Clone;

    /// Current item identifiers in source order.
    fn item_ids(&self) -> Vec<Self::Id>;

    /// Returns the item with the given identifier.
    fn item(&self, id: &Self::Id) -> Option<Self::Item>;

    /// Returns the value of `property` for an item.
    ///
    /// Return `None` when the item does not carry the property at all.
    fn property_value(&self, id: &Self::Id, property: &str) -> Option<PropertyValue>;

    /// Returns the binding state.
    fn state(&self) -> BindingState;

    /// Returns the change signals for this source.
    fn signals(&self) -> &SourceSignals;

    /// Number of items. The default counts [`item_ids`](Self::item_ids).
    fn len(&self) -> usize {
        self.item_ids().len()
    }

    /// Returns `true` if the source holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Trait for items stored in a [`ListSource`].
///
/// # Example
///
/// ```
/// use horizon_grouptable::model::{GroupItem, PropertyValue};
///
/// #[derive(Clone)]
/// struct Employee {
///     id: u32,
///     dept: String,
/// }
///
/// impl GroupItem for Employee {
///     type Id = u32;
///
///     fn id(&self) -> u32 {
///         self.id
///     }
///
///     fn property(&self, name: &str) -> Option<PropertyValue> {
///         match name {
///             "dept" => Some(PropertyValue::from(&self.dept)),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait GroupItem: Clone + Send + Sync + 'static {
    /// Identifier type.
    type Id: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    /// Returns this item's identifier.
    fn id(&self) -> Self::Id;

    /// Returns the value of a property, `None` when the item lacks it.
    fn property(&self, name: &str) -> Option<PropertyValue>;
}

struct ListStorage<T: GroupItem> {
    items: Vec<T>,
    positions: HashMap<T::Id, usize>,
}

impl<T: GroupItem> ListStorage<T> {
    /// Builds storage from `items`, keeping the first item for each id.
    fn new(items: Vec<T>) -> Self {
        let total = items.len();
        let mut positions = HashMap::with_capacity(total);
        let mut kept = Vec::with_capacity(total);
        for item in items {
            let id = item.id();
            if !positions.contains_key(&id) {
                positions.insert(id, kept.len());
                kept.push(item);
            }
        }
        if kept.len() < total {
            grouptable_debug!(dropped = total - kept.len(), "duplicate item ids dropped");
        }
        Self {
            items: kept,
            positions,
        }
    }

    fn reindex(&mut self) {
        self.positions.clear();
        for (i, item) in self.items.iter().enumerate() {
            self.positions.insert(item.id(), i);
        }
    }

    fn get(&self, id: &T::Id) -> Option<&T> {
        self.positions.get(id).and_then(|&i| self.items.get(i))
    }
}

/// An in-memory, ordered item source.
///
/// Every mutation emits [`SourceSignals::item_set_changed`] after the write
/// lock is released. Identifiers are kept unique: an item whose id is already
/// present is never added.
///
/// # Example
///
/// ```
/// use horizon_grouptable::model::{GroupItem, ItemSource, ListSource, PropertyValue};
///
/// #[derive(Clone)]
/// struct Task {
///     id: u32,
///     done: bool,
/// }
///
/// impl GroupItem for Task {
///     type Id = u32;
///     fn id(&self) -> u32 {
///         self.id
///     }
///     fn property(&self, name: &str) -> Option<PropertyValue> {
///         (name == "done").then(|| PropertyValue::from(self.done))
///     }
/// }
///
/// let source = ListSource::with_items(vec![Task { id: 1, done: false }]);
/// assert!(source.push(Task { id: 2, done: true }));
/// assert!(!source.push(Task { id: 2, done: false }));
/// assert_eq!(source.item_ids(), vec![1, 2]);
/// ```
pub struct ListSource<T: GroupItem> {
    storage: RwLock<ListStorage<T>>,
    state: Property<BindingState>,
    signals: SourceSignals,
}

impl<T: GroupItem> Default for ListSource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GroupItem> ListSource<T> {
    /// Creates an empty, active source.
    pub fn new() -> Self {
        Self::with_items(Vec::new())
    }

    /// Creates an active source holding `items`.
    pub fn with_items(items: Vec<T>) -> Self {
        Self {
            storage: RwLock::new(ListStorage::new(items)),
            state: Property::new(BindingState::Active),
            signals: SourceSignals::new(),
        }
    }

    /// Appends an item.
    ///
    /// Returns `false`, leaving the source untouched, if an item with the
    /// same identifier is already present.
    pub fn push(&self, item: T) -> bool {
        let position = {
            let mut storage = self.storage.write();
            let id = item.id();
            if storage.positions.contains_key(&id) {
                tracing::debug!(target: targets::SOURCE, ?id, "push rejected: duplicate id");
                return false;
            }
            let position = storage.items.len();
            storage.positions.insert(id, position);
            storage.items.push(item);
            position
        };
        self.emit(ItemSetChange::Added { position, count: 1 });
        true
    }

    /// Inserts an item at `position`, clamped to the current length.
    ///
    /// Returns `false`, leaving the source untouched, if an item with the
    /// same identifier is already present.
    pub fn insert(&self, position: usize, item: T) -> bool {
        let position = {
            let mut storage = self.storage.write();
            let id = item.id();
            if storage.positions.contains_key(&id) {
                tracing::debug!(target: targets::SOURCE, ?id, "insert rejected: duplicate id");
                return false;
            }
            let position = position.min(storage.items.len());
            storage.items.insert(position, item);
            storage.reindex();
            position
        };
        self.emit(ItemSetChange::Added { position, count: 1 });
        true
    }

    /// Removes the item with the given identifier.
    pub fn remove(&self, id: &T::Id) -> Option<T> {
        let (position, item) = {
            let mut storage = self.storage.write();
            let position = *storage.positions.get(id)?;
            let item = storage.items.remove(position);
            storage.reindex();
            (position, item)
        };
        self.emit(ItemSetChange::Removed { position, count: 1 });
        Some(item)
    }

    /// Modifies an item in place.
    ///
    /// The closure must not change the item's identifier.
    pub fn modify<F, R>(&self, id: &T::Id, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = {
            let mut storage = self.storage.write();
            let position = *storage.positions.get(id)?;
            f(&mut storage.items[position])
        };
        self.emit(ItemSetChange::Refreshed);
        Some(result)
    }

    /// Replaces the whole collection. Later duplicates of an id are dropped.
    pub fn replace_all(&self, items: Vec<T>) {
        *self.storage.write() = ListStorage::new(items);
        self.emit(ItemSetChange::Refreshed);
    }

    /// Removes every item.
    pub fn clear(&self) {
        *self.storage.write() = ListStorage::new(Vec::new());
        self.emit(ItemSetChange::Cleared);
    }

    /// Changes the binding state, notifying listeners if it changed.
    pub fn set_state(&self, state: BindingState) {
        if self.state.set(state) {
            tracing::debug!(target: targets::SOURCE, ?state, "source binding state changed");
            self.signals.state_changed.emit(state);
        }
    }

    /// Provides read access to an item without cloning it.
    pub fn with_item<F, R>(&self, id: &T::Id, f: F) -> Option<R>
    where
        F: FnOnce(&T) -> R,
    {
        let storage = self.storage.read();
        storage.get(id).map(f)
    }

    fn emit(&self, change: ItemSetChange) {
        tracing::trace!(target: targets::SOURCE, ?change, "item set changed");
        self.signals.item_set_changed.emit(change);
    }
}

impl<T: GroupItem> ItemSource for ListSource<T> {
    type Id = T::Id;
    type Item = T;

    fn item_ids(&self) -> Vec<T::Id> {
        self.storage.read().items.iter().map(GroupItem::id).collect()
    }

    fn item(&self, id: &T::Id) -> Option<T> {
        self.storage.read().get(id).cloned()
    }

    fn property_value(&self, id: &T::Id, property: &str) -> Option<PropertyValue> {
        self.storage.read().get(id).and_then(|item| item.property(property))
    }

    fn state(&self) -> BindingState {
        self.state.get()
    }

    fn signals(&self) -> &SourceSignals {
        &self.signals
    }

    fn len(&self) -> usize {
        self.storage.read().items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Entry {
        id: u32,
        tag: &'static str,
    }

    impl GroupItem for Entry {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }

        fn property(&self, name: &str) -> Option<PropertyValue> {
            (name == "tag").then(|| PropertyValue::from(self.tag))
        }
    }

    fn entry(id: u32, tag: &'static str) -> Entry {
        Entry { id, tag }
    }

    fn record(source: &ListSource<Entry>) -> Arc<Mutex<Vec<ItemSetChange>>> {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        source.signals().item_set_changed.connect(move |change| {
            changes_clone.lock().push(change.clone());
        });
        changes
    }

    #[test]
    fn test_mutations_keep_order_and_emit() {
        let source = ListSource::with_items(vec![entry(1, "a"), entry(2, "b")]);
        let changes = record(&source);

        source.push(entry(3, "a"));
        source.insert(0, entry(0, "c"));
        assert_eq!(source.item_ids(), vec![0, 1, 2, 3]);

        assert_eq!(source.remove(&2), Some(entry(2, "b")));
        assert_eq!(source.remove(&2), None);
        assert_eq!(source.item_ids(), vec![0, 1, 3]);

        assert_eq!(
            *changes.lock(),
            vec![
                ItemSetChange::Added { position: 2, count: 1 },
                ItemSetChange::Added { position: 0, count: 1 },
                ItemSetChange::Removed { position: 2, count: 1 },
            ]
        );
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let source = ListSource::with_items(vec![entry(1, "x"), entry(2, "y"), entry(1, "dup")]);
        assert_eq!(source.item_ids(), vec![1, 2]);
        assert_eq!(source.item(&1), Some(entry(1, "x")));

        let changes = record(&source);
        assert!(!source.push(entry(1, "z")));
        assert!(!source.insert(0, entry(2, "z")));
        assert_eq!(source.item_ids(), vec![1, 2]);
        assert!(changes.lock().is_empty());

        // The original row is still the one reached by id.
        assert_eq!(source.remove(&1), Some(entry(1, "x")));
        assert!(source.push(entry(1, "z")));
        assert_eq!(source.item_ids(), vec![2, 1]);

        source.replace_all(vec![entry(3, "a"), entry(3, "b")]);
        assert_eq!(source.item_ids(), vec![3]);
        assert_eq!(source.item(&3), Some(entry(3, "a")));
    }

    #[test]
    fn test_property_lookup_by_id() {
        let source = ListSource::with_items(vec![entry(7, "x")]);
        assert_eq!(source.property_value(&7, "tag"), Some(PropertyValue::from("x")));
        assert_eq!(source.property_value(&7, "other"), None);
        assert_eq!(source.property_value(&8, "tag"), None);
        assert_eq!(source.with_item(&7, |e| e.tag), Some("x"));
    }

    #[test]
    fn test_modify_emits_refresh() {
        let source = ListSource::with_items(vec![entry(1, "a")]);
        let changes = record(&source);

        assert_eq!(source.modify(&1, |e| e.tag = "b"), Some(()));
        assert_eq!(source.modify(&9, |e| e.tag = "b"), None);
        assert_eq!(source.item(&1).map(|e| e.tag), Some("b"));
        assert_eq!(*changes.lock(), vec![ItemSetChange::Refreshed]);
    }

    #[test]
    fn test_state_change_emits_once() {
        let source: ListSource<Entry> = ListSource::new();
        let states = Arc::new(Mutex::new(Vec::new()));
        let states_clone = states.clone();
        source.signals().state_changed.connect(move |state| {
            states_clone.lock().push(*state);
        });

        source.set_state(BindingState::Inactive);
        source.set_state(BindingState::Inactive);
        source.set_state(BindingState::Active);

        assert_eq!(*states.lock(), vec![BindingState::Inactive, BindingState::Active]);
        assert_eq!(source.state(), BindingState::Active);
    }

    #[test]
    fn test_clear() {
        let source = ListSource::with_items(vec![entry(1, "a")]);
        let changes = record(&source);
        source.clear();
        assert!(source.is_empty());
        assert_eq!(*changes.lock(), vec![ItemSetChange::Cleared]);
    }
}
