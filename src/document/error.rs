//! Error types for malformed document snapshots

use thiserror::Error;

/// Structural or geometric defects that make a snapshot unusable
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    /// An item's bounds contain NaN or infinity
    #[error("item #{index} ('{name}') has non-finite bounds")]
    NonFiniteBounds { index: usize, name: String },

    #[error("artboard #{index} has a non-finite rect")]
    NonFiniteArtboard { index: usize },

    /// Parent index points outside the arena
    #[error("item #{index} refers to missing parent #{parent}")]
    DanglingParent { index: usize, parent: usize },

    #[error("item #{index} has parent #{parent}, which is not a group")]
    ParentNotGroup { index: usize, parent: usize },

    #[error("item #{index} is part of a parent cycle")]
    ParentCycle { index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_finite_display() {
        let err = DocumentError::NonFiniteBounds {
            index: 3,
            name: "ICON_x".to_string(),
        };
        assert_eq!(err.to_string(), "item #3 ('ICON_x') has non-finite bounds");
    }

    #[test]
    fn test_dangling_parent_display() {
        let err = DocumentError::DanglingParent { index: 1, parent: 9 };
        assert!(err.to_string().contains("missing parent #9"));
    }
}
