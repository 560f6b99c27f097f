//! Group keys: the identity of a node in the grouping tree.

use std::fmt;
use std::sync::Arc;

use super::value::PropertyValue;

/// One `(property, value)` pair of a [`GroupKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyComponent {
    property: Arc<str>,
    value: PropertyValue,
}

impl KeyComponent {
    /// Creates a component for `property = value`.
    pub fn new(property: impl Into<Arc<str>>, value: impl Into<PropertyValue>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }

    /// The grouping property name.
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The value shared by every item under the group.
    pub fn value(&self) -> &PropertyValue {
        &self.value
    }
}

/// An immutable, ordered path of `(property, value)` pairs identifying a group.
///
/// A key of length `n` names a group at depth `n`: its first component is the
/// value of the first grouping property, and so on. Keys are plain values;
/// two keys are equal iff they have the same length and pairwise equal
/// components, regardless of which grouping pass produced them. This is what
/// lets expansion state outlive a regroup.
///
/// Cloning is cheap (the components are shared).
///
/// # Example
///
/// ```
/// use horizon_grouptable::model::GroupKey;
///
/// let dept = GroupKey::new("dept", "X");
/// let team = dept.child("team", "core");
///
/// assert_eq!(team.depth(), 2);
/// assert_eq!(team.property(), "team");
/// assert_eq!(team.parent(), Some(dept.clone()));
/// assert!(dept.is_ancestor_of(&team));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    components: Arc<[KeyComponent]>,
}

impl GroupKey {
    /// Creates a depth-1 key.
    pub fn new(property: impl Into<Arc<str>>, value: impl Into<PropertyValue>) -> Self {
        Self {
            components: Arc::from(vec![KeyComponent::new(property, value)]),
        }
    }

    /// Builds a key from an ordered component path.
    ///
    /// Returns `None` for an empty path: there is no depth-0 group.
    pub fn from_components<I>(components: I) -> Option<Self>
    where
        I: IntoIterator<Item = KeyComponent>,
    {
        let components: Vec<KeyComponent> = components.into_iter().collect();
        if components.is_empty() {
            None
        } else {
            Some(Self {
                components: Arc::from(components),
            })
        }
    }

    /// Returns the key of the child group `property = value` beneath this one.
    pub fn child(&self, property: impl Into<Arc<str>>, value: impl Into<PropertyValue>) -> Self {
        let mut components = Vec::with_capacity(self.components.len() + 1);
        components.extend(self.components.iter().cloned());
        components.push(KeyComponent::new(property, value));
        Self {
            components: Arc::from(components),
        }
    }

    /// Returns the key one level up, or `None` for a root group.
    pub fn parent(&self) -> Option<Self> {
        let len = self.components.len();
        if len <= 1 {
            return None;
        }
        Some(Self {
            components: Arc::from(&self.components[..len - 1]),
        })
    }

    /// The depth of the group (1 for root groups).
    pub fn depth(&self) -> usize {
        self.components.len()
    }

    /// All components, root first.
    pub fn components(&self) -> &[KeyComponent] {
        &self.components
    }

    /// The grouping property of this group's own level.
    pub fn property(&self) -> &str {
        self.last().property()
    }

    /// The value shared by this group's items for [`property`](Self::property).
    pub fn value(&self) -> &PropertyValue {
        self.last().value()
    }

    /// Returns `true` if this key is a strict prefix of `other`.
    pub fn is_ancestor_of(&self, other: &GroupKey) -> bool {
        self.depth() < other.depth() && other.components.starts_with(&self.components)
    }

    fn last(&self) -> &KeyComponent {
        // Non-empty by construction.
        &self.components[self.components.len() - 1]
    }
}

impl fmt::Debug for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupKey({self})")
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{}={}", component.property, component.value)?;
        }
        Ok(())
    }
}
