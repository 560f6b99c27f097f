//! Grouped table model.
//!
//! This module turns a flat, ordered item collection into a multi-level
//! group tree and exposes the rows a table view should display:
//!
//! - Group headers for every visible group
//! - Items of expanded deepest-level groups, in backing-collection order
//! - The plain item sequence when no grouping is active
//!
//! # Core Types
//!
//! - `PropertyValue`: A grouping value, with distinct absent and null markers
//! - `GroupKey`: The path of (property, value) pairs naming one group
//! - `GroupIndex`: The group tree built from an item sequence
//! - `ExpansionState`: Which groups are expanded
//! - `VisibleOrderCache`: Lazily flattened visible rows
//! - `GroupedTableContainer`: The facade tying them to an `ItemSource`
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────┐ signals ┌──────────────────────┐
//! │ ItemSource  │────────>│ GroupedTableContainer│
//! └─────────────┘         └──────────────────────┘
//!                            │       │        │
//!                  ┌─────────┘       │        └──────────┐
//!                  v                 v                   v
//!           ┌────────────┐   ┌──────────────┐   ┌─────────────────┐
//!           │ GroupIndex │   │ExpansionState│   │VisibleOrderCache│
//!           └────────────┘   └──────────────┘   └─────────────────┘
//! ```
//!
//! A source change marks the container stale. The next read rebuilds the
//! index with the active properties, re-applies the saved expansion and
//! drops the cached visible rows.

mod container;
mod debug;
mod expansion;
mod group_index;
mod group_key;
mod source;
mod value;
mod visible;

pub use container::{ContainerSignals, GroupedTableContainer};
pub use debug::GroupTreeDebug;
pub use expansion::ExpansionState;
pub use group_index::{GroupIndex, GroupNode};
pub use group_key::{GroupKey, KeyComponent};
pub use source::{BindingState, GroupItem, ItemSetChange, ItemSource, ListSource, SourceSignals};
pub use value::PropertyValue;
pub use visible::{VisibleOrderCache, VisibleRow, VisibleSnapshot};
