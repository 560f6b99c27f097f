//! Container configuration.
//!
//! A [`ContainerConfig`] can be built in code with the `with_*` setters or
//! loaded from TOML:
//!
//! ```
//! use horizon_grouptable::ContainerConfig;
//!
//! let config = ContainerConfig::from_toml_str(
//!     r#"
//!     group_properties = ["dept", "team"]
//!     expand_all_on_group = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.group_properties, vec!["dept", "team"]);
//! assert!(config.restore_expansion);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Behaviour switches for a grouped table container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Grouping properties applied when the container is created.
    pub group_properties: Vec<String>,
    /// Expand the whole tree after every explicit `group_by`.
    pub expand_all_on_group: bool,
    /// Carry expansion of still-existing groups across a regroup.
    ///
    /// When `false`, every regroup starts fully collapsed.
    pub restore_expansion: bool,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            group_properties: Vec::new(),
            expand_all_on_group: false,
            restore_expansion: true,
        }
    }
}

impl ContainerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Sets the initial grouping properties.
    pub fn with_group_properties<I, S>(mut self, properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_properties = properties.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether `group_by` expands the whole tree.
    pub fn with_expand_all_on_group(mut self, expand: bool) -> Self {
        self.expand_all_on_group = expand;
        self
    }

    /// Sets whether expansion survives a regroup.
    pub fn with_restore_expansion(mut self, restore: bool) -> Self {
        self.restore_expansion = restore;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GroupingError;

    #[test]
    fn test_defaults() {
        let config = ContainerConfig::default();
        assert!(config.group_properties.is_empty());
        assert!(!config.expand_all_on_group);
        assert!(config.restore_expansion);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ContainerConfig::from_toml_str("").unwrap(), ContainerConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = ContainerConfig::new()
            .with_group_properties(["a", "b"])
            .with_restore_expansion(false);
        assert_eq!(config.group_properties, vec!["a".to_string(), "b".to_string()]);
        assert!(!config.restore_expansion);
    }

    #[test]
    fn test_invalid_toml() {
        let err = ContainerConfig::from_toml_str("group_properties = 5").unwrap_err();
        assert!(matches!(err, GroupingError::Config(_)));
    }
}
