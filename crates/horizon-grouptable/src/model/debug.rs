//! Text rendering of a group tree for debugging.

use std::fmt::{Debug, Write};
use std::hash::Hash;

use horizon_grouptable_core::TreeFormatOptions;

use super::expansion::ExpansionState;
use super::group_index::GroupIndex;
use super::group_key::GroupKey;

/// Debug utility for visualizing a group tree.
///
/// Each group is printed as `[-] property=value` when expanded and
/// `[+] property=value` when collapsed, optionally followed by its subtree
/// item count and its leaf item identifiers.
///
/// ```
/// use horizon_grouptable::model::{ExpansionState, GroupIndex, GroupTreeDebug, PropertyValue};
/// use horizon_grouptable_core::{TreeFormatOptions, TreeStyle};
///
/// let depts = ["X", "Y", "X"];
/// let index = GroupIndex::build(0..3u32, &["dept".to_string()], |id, _| {
///     Some(PropertyValue::from(depts[*id as usize]))
/// });
///
/// let options = TreeFormatOptions { style: TreeStyle::Ascii, ..Default::default() };
/// let text = GroupTreeDebug::with_options(options).format(&index, &ExpansionState::new());
/// assert!(text.contains("[+] dept=X (2)"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GroupTreeDebug {
    options: TreeFormatOptions,
}

impl GroupTreeDebug {
    /// Create a visualizer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a visualizer with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the whole tree.
    pub fn format<Id: Clone + Eq + Hash + Debug>(
        &self,
        index: &GroupIndex<Id>,
        expansion: &ExpansionState,
    ) -> String {
        let mut output = String::new();

        if !index.has_groups() {
            let _ = writeln!(output, "Group Tree (ungrouped, {} items)", index.items().len());
            return output;
        }

        let _ = writeln!(
            output,
            "Group Tree ({} groups, {} items) by {}:",
            index.group_count(),
            index.items().len(),
            index.properties().join(", ")
        );
        let roots = index.root_groups();
        let mut ancestors = Vec::new();
        for (i, root) in roots.iter().enumerate() {
            let is_last = i + 1 == roots.len();
            self.format_node(index, expansion, root, &mut ancestors, is_last, &mut output);
        }
        output
    }

    fn format_node<Id: Clone + Eq + Hash + Debug>(
        &self,
        index: &GroupIndex<Id>,
        expansion: &ExpansionState,
        key: &GroupKey,
        ancestors: &mut Vec<bool>,
        is_last: bool,
        output: &mut String,
    ) {
        let depth = ancestors.len() + 1;
        if self.options.max_depth.is_some_and(|max| depth > max) {
            return;
        }

        let marker = if expansion.is_expanded(key) { "[-]" } else { "[+]" };
        let _ = write!(
            output,
            "{}{} {}={}",
            self.options.node_prefix(ancestors, is_last),
            marker,
            key.property(),
            key.value()
        );
        if self.options.show_counts {
            let _ = write!(output, " ({})", index.item_count(key));
        }
        output.push('\n');

        ancestors.push(is_last);
        if self.options.show_items {
            let prefix = self.options.detail_prefix(ancestors);
            for id in index.own_item_ids(key) {
                let _ = writeln!(output, "{prefix}.{id:?}");
            }
        }

        let children = index.children(key);
        for (i, child) in children.iter().enumerate() {
            let child_is_last = i + 1 == children.len();
            self.format_node(index, expansion, child, ancestors, child_is_last, output);
        }
        ancestors.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PropertyValue;
    use horizon_grouptable_core::TreeStyle;

    fn index(properties: &[&str]) -> GroupIndex<u32> {
        let data: [(u32, &str, &str); 3] = [(1, "X", "a"), (2, "Y", "a"), (3, "X", "b")];
        let properties: Vec<String> = properties.iter().map(|p| p.to_string()).collect();
        GroupIndex::build(data.iter().map(|d| d.0), &properties, |id, property| {
            let (_, dept, team) = data.iter().find(|d| d.0 == *id)?;
            match property {
                "dept" => Some(PropertyValue::from(*dept)),
                "team" => Some(PropertyValue::from(*team)),
                _ => None,
            }
        })
    }

    fn ascii() -> TreeFormatOptions {
        TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        }
    }

    #[test]
    fn test_format_ungrouped() {
        let text = GroupTreeDebug::new().format(&index(&[]), &ExpansionState::new());
        assert_eq!(text, "Group Tree (ungrouped, 3 items)\n");
    }

    #[test]
    fn test_format_nested() {
        let index = index(&["dept", "team"]);
        let mut expansion = ExpansionState::new();
        expansion.expand(GroupKey::new("dept", "X"));

        let text = GroupTreeDebug::with_options(ascii()).format(&index, &expansion);
        let expected = "\
Group Tree (5 groups, 3 items) by dept, team:
+-- [-] dept=X (2)
|  +-- [+] team=a (1)
|  `-- [+] team=b (1)
`-- [+] dept=Y (1)
   `-- [+] team=a (1)
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_max_depth_and_items() {
        let index = index(&["dept", "team"]);
        let options = TreeFormatOptions {
            max_depth: Some(1),
            show_counts: false,
            ..ascii()
        };
        let text = GroupTreeDebug::with_options(options).format(&index, &ExpansionState::new());
        assert!(!text.contains("team="));
        assert!(text.contains("[+] dept=Y\n"));

        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::detailed()
        };
        let text = GroupTreeDebug::with_options(options).format(&index, &ExpansionState::new());
        assert!(text.contains("|  `-- [+] team=b (1)\n|     .3\n"));
        assert!(text.contains("   `-- [+] team=a (1)\n      .2\n"));
    }
}
