//! Error types for grouped table operations.
//!
//! Navigation never fails: a missing successor, predecessor or boundary is a
//! normal `None`. Errors are reserved for misuse of group-only queries,
//! positional access past the end, and configuration parsing.

/// Result type alias for grouped table operations.
pub type Result<T> = std::result::Result<T, GroupingError>;

/// Errors that can occur when querying a grouped table.
#[derive(Debug, thiserror::Error)]
pub enum GroupingError {
    /// A group-only query named a key that is not in the current tree.
    #[error("Unknown group '{key}'")]
    UnknownGroup { key: String },

    /// A group-only query was given an item row.
    #[error("Row '{row}' is not a group")]
    NotAGroup { row: String },

    /// Positional access past the end of the visible sequence.
    #[error("Row position {index} out of range (visible rows: {len})")]
    OutOfRange { index: usize, len: usize },

    /// Configuration text could not be parsed.
    #[error("Invalid container configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl GroupingError {
    /// Create an unknown-group error.
    pub fn unknown_group(key: impl ToString) -> Self {
        Self::UnknownGroup {
            key: key.to_string(),
        }
    }

    /// Create a not-a-group error.
    pub fn not_a_group(row: impl std::fmt::Debug) -> Self {
        Self::NotAGroup {
            row: format!("{row:?}"),
        }
    }

    /// Create an out-of-range error.
    pub fn out_of_range(index: usize, len: usize) -> Self {
        Self::OutOfRange { index, len }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = GroupingError::out_of_range(5, 3);
        assert_eq!(err.to_string(), "Row position 5 out of range (visible rows: 3)");

        let err = GroupingError::unknown_group("dept=Z");
        assert_eq!(err.to_string(), "Unknown group 'dept=Z'");

        let err = GroupingError::not_a_group(42);
        assert_eq!(err.to_string(), "Row '42' is not a group");
    }
}
