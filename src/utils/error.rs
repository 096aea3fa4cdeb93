//! Error types for hudkit

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for hudkit operations
#[derive(Debug, Error)]
pub enum HudError {
    /// A stylesheet or other resource could not be read
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Panel tree mutation errors
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),
    /// Inline style text that produced no usable declaration
    #[error("invalid style: {0}")]
    InvalidStyle(String),
}

/// Panel-tree specific errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// Handle does not refer to a live panel
    #[error("unknown or destroyed panel handle")]
    UnknownPanel,
    /// Attaching would make a panel its own ancestor
    #[error("attach would create a cycle")]
    Cycle,
    /// The root panel cannot be attached under another panel
    #[error("the root panel cannot be attached to a parent")]
    RootAttach,
    /// The root panel cannot be detached or destroyed
    #[error("the root panel cannot be detached")]
    RootDetach,
}

impl HudError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience Result type for hudkit operations
pub type Result<T> = std::result::Result<T, HudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_error_converts() {
        let err: HudError = TreeError::Cycle.into();
        assert!(matches!(err, HudError::Tree(TreeError::Cycle)));
        assert_eq!(err.to_string(), "tree error: attach would create a cycle");
    }

    #[test]
    fn test_io_error_mentions_path() {
        let err = HudError::io(
            "menus/main.css",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert!(err.to_string().contains("menus/main.css"));
    }
}
