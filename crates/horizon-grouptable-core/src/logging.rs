//! Logging and debugging facilities for Horizon Grouptable.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Formatting options shared by the tree debug renderers
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! Horizon Grouptable uses the `tracing` crate for instrumentation. To see logs,
//! you need to install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every subsystem logs under its own target (see [`targets`]), so a filter
//! such as `horizon_grouptable::visible=trace` isolates the flattening pass.

/// Span names used throughout Horizon Grouptable for tracing.
pub mod span_names {
    /// Group index construction.
    pub const INDEX_BUILD: &str = "horizon_grouptable::index_build";
    /// Visible sequence flattening.
    pub const FLATTEN: &str = "horizon_grouptable::flatten";
    /// Regroup with expansion restore.
    pub const REGROUP: &str = "horizon_grouptable::regroup";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grouptable_core::signal";
    /// Group index target.
    pub const INDEX: &str = "horizon_grouptable::index";
    /// Expansion state target.
    pub const EXPANSION: &str = "horizon_grouptable::expansion";
    /// Visible order cache target.
    pub const VISIBLE: &str = "horizon_grouptable::visible";
    /// Container facade target.
    pub const CONTAINER: &str = "horizon_grouptable::container";
    /// Item source target.
    pub const SOURCE: &str = "horizon_grouptable::source";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show item counts next to each node.
    pub show_counts: bool,
    /// Whether to list leaf item identifiers under each node.
    pub show_items: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_counts: true,
            show_items: false,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_items: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output.
    pub fn minimal() -> Self {
        Self {
            show_counts: false,
            show_items: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a tree node.
    ///
    /// `ancestors` holds, outermost first, whether each enclosing node was the
    /// last of its siblings. Levels under a last node are padded with spaces
    /// instead of a branch line.
    pub fn node_prefix(&self, ancestors: &[bool], is_last: bool) -> String {
        let (corner, last) = match self.style {
            TreeStyle::Ascii => ("+--", "`--"),
            TreeStyle::Unicode => ("\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("-", "-"),
        };

        let mut prefix = self.detail_prefix(ancestors);
        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }

    /// Build the prefix for detail lines listed under a node.
    ///
    /// `levels` holds the last-sibling flags of every node on the path down
    /// to and including that node.
    pub fn detail_prefix(&self, levels: &[bool]) -> String {
        let branch = match self.style {
            TreeStyle::Ascii => "|",
            TreeStyle::Unicode => "\u{2502}",
            TreeStyle::Compact => "",
        };

        let mut prefix = String::new();
        for &is_last in levels {
            if is_last {
                prefix.extend(branch.chars().map(|_| ' '));
            } else {
                prefix.push_str(branch);
            }
            for _ in 0..self.indent_size {
                prefix.push(' ');
            }
        }
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grouptable::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` crate macros with consistent
/// target naming.
#[macro_export]
macro_rules! grouptable_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "horizon_grouptable", $($arg)*)
    };
}

#[macro_export]
macro_rules! grouptable_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "horizon_grouptable", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_prefix_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.node_prefix(&[], false), "+-- ");
        assert_eq!(options.node_prefix(&[], true), "`-- ");
        assert_eq!(options.node_prefix(&[false], true), "|  `-- ");
    }

    #[test]
    fn test_node_prefix_under_last_sibling() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.node_prefix(&[true], false), "   +-- ");
        assert_eq!(options.node_prefix(&[false, true], true), "|     `-- ");
    }

    #[test]
    fn test_detail_prefix() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            indent_size: 1,
            ..Default::default()
        };
        assert_eq!(options.detail_prefix(&[false, false]), "| | ");
        assert_eq!(options.detail_prefix(&[true, false]), "  | ");
    }

    #[test]
    fn test_minimal_options() {
        let options = TreeFormatOptions::minimal();
        assert!(!options.show_counts);
        assert!(!options.show_items);
    }

    #[test]
    fn test_perf_span() {
        let _subscriber = tracing_subscriber::fmt().with_test_writer().try_init();
        let _span = PerfSpan::new("test_operation");
    }
}
