//! Property values used as grouping keys.

use std::fmt;
use std::hash::{Hash, Hasher};

/// The value of one item property, as seen by the grouping pass.
///
/// Values compare with their natural equality. `Float` compares and hashes by
/// bit pattern so every value, NaN included, lands in exactly one group.
///
/// `Absent` is produced when an item has no such property at all; it is a
/// distinct group from an explicit `Null`.
#[derive(Debug, Clone, Default)]
pub enum PropertyValue {
    /// The item does not carry the property.
    #[default]
    Absent,
    /// The property is present but has no value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl PropertyValue {
    /// Returns `true` for `Absent` and `Null`.
    pub fn is_empty(&self) -> bool {
        matches!(self, PropertyValue::Absent | PropertyValue::Null)
    }

    /// Returns the text content, if this is a `Text` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer content, if this is an `Int` value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for PropertyValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropertyValue::Absent, PropertyValue::Absent) => true,
            (PropertyValue::Null, PropertyValue::Null) => true,
            (PropertyValue::Bool(a), PropertyValue::Bool(b)) => a == b,
            (PropertyValue::Int(a), PropertyValue::Int(b)) => a == b,
            (PropertyValue::Float(a), PropertyValue::Float(b)) => a.to_bits() == b.to_bits(),
            (PropertyValue::Text(a), PropertyValue::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for PropertyValue {}

impl Hash for PropertyValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            PropertyValue::Absent | PropertyValue::Null => {}
            PropertyValue::Bool(b) => b.hash(state),
            PropertyValue::Int(n) => n.hash(state),
            PropertyValue::Float(f) => f.to_bits().hash(state),
            PropertyValue::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Absent => write!(f, "<absent>"),
            PropertyValue::Null => write!(f, "<null>"),
            PropertyValue::Bool(b) => write!(f, "{b}"),
            PropertyValue::Int(n) => write!(f, "{n}"),
            PropertyValue::Float(x) => write!(f, "{x}"),
            PropertyValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(i64::from(value))
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<&String> for PropertyValue {
    fn from(value: &String) -> Self {
        PropertyValue::Text(value.clone())
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(PropertyValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_absent_and_null_are_distinct() {
        assert_ne!(PropertyValue::Absent, PropertyValue::Null);
        assert!(PropertyValue::Absent.is_empty());
        assert!(PropertyValue::Null.is_empty());
    }

    #[test]
    fn test_nan_groups_with_itself() {
        let mut set = HashSet::new();
        set.insert(PropertyValue::Float(f64::NAN));
        set.insert(PropertyValue::Float(f64::NAN));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PropertyValue::from("x"), PropertyValue::Text("x".into()));
        assert_eq!(PropertyValue::from(3), PropertyValue::Int(3));
        assert_eq!(PropertyValue::from(None::<i64>), PropertyValue::Null);
        assert_eq!(PropertyValue::from(Some(true)).as_bool(), Some(true));
    }

    #[test]
    fn test_display() {
        assert_eq!(PropertyValue::Text("X".into()).to_string(), "X");
        assert_eq!(PropertyValue::Absent.to_string(), "<absent>");
    }
}
