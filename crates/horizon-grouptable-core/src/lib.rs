//! Core systems for Horizon Grouptable.
//!
//! This crate provides the foundational components shared by the grouped
//! table model:
//!
//! - **Signal/Slot System**: Type-safe change notification between an item
//!   source and the containers projecting it
//! - **Property System**: Change-detecting value cells
//! - **Logging**: Tracing targets, performance spans and tree formatting options
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grouptable_core::Signal;
//!
//! // Create a signal that notifies when a value changes
//! let value_changed = Signal::<i32>::new();
//!
//! // Connect a slot to handle the signal
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! // Emit the signal
//! value_changed.emit(42);
//!
//! // Disconnect when done
//! value_changed.disconnect(conn_id);
//! ```

pub mod logging;
pub mod property;
pub mod signal;

pub use logging::{PerfSpan, TreeFormatOptions, TreeStyle};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
