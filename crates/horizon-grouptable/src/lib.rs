//! Horizon Grouptable - A hierarchical grouped table model.
//!
//! Groups the items of an ordered collection by one or more properties,
//! tracks which groups are expanded, and exposes the resulting visible rows
//! through a navigation contract (first, last, next, previous, position).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_grouptable::ContainerConfig;
//! use horizon_grouptable::model::{GroupItem, GroupedTableContainer, ListSource, PropertyValue};
//!
//! #[derive(Clone)]
//! struct Task {
//!     id: u64,
//!     status: &'static str,
//! }
//!
//! impl GroupItem for Task {
//!     type Id = u64;
//!     fn id(&self) -> u64 {
//!         self.id
//!     }
//!     fn property(&self, name: &str) -> Option<PropertyValue> {
//!         (name == "status").then(|| PropertyValue::from(self.status))
//!     }
//! }
//!
//! let source = Arc::new(ListSource::with_items(vec![
//!     Task { id: 1, status: "open" },
//!     Task { id: 2, status: "done" },
//! ]));
//!
//! let config = ContainerConfig::new()
//!     .with_group_properties(["status"])
//!     .with_expand_all_on_group(true);
//! let container = GroupedTableContainer::with_config(source.clone(), config);
//! assert_eq!(container.size(), 4);
//!
//! // Source changes are picked up on the next read.
//! source.push(Task { id: 3, status: "open" });
//! assert_eq!(container.size(), 5);
//! ```

mod config;
mod error;
pub mod model;

pub use config::ContainerConfig;
pub use error::{GroupingError, Result};
pub use horizon_grouptable_core::{TreeFormatOptions, TreeStyle};
