use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for inventory store operations
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Blank required field, negative number, or otherwise unusable input
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// An item or category with the same key already exists
    #[error("Duplicate key: {0}")]
    DuplicateKey(String),
    /// The item or category does not exist
    #[error("Not found: {0}")]
    NotFound(String),
    /// Category removal refused because items still reference it
    #[error("Category {category} is still referenced by {items} item(s)")]
    CategoryInUse { category: String, items: usize },
    /// Reading or writing a file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Item exchange CSV could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Coarse failure category, for callers that only need to branch on the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    DuplicateKey,
    NotFound,
    InUse,
    Io,
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            InventoryError::DuplicateKey(_) => ErrorKind::DuplicateKey,
            InventoryError::NotFound(_) => ErrorKind::NotFound,
            InventoryError::CategoryInUse { .. } => ErrorKind::InUse,
            InventoryError::Io { .. } | InventoryError::Csv(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        InventoryError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
