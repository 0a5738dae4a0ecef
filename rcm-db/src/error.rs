/// Error types for store access
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Path does not name a database file; no connection was attempted
    #[error("Entered path does not contain a database: {0}")]
    InvalidPath(PathBuf),

    /// SQLite could not open the database file
    #[error("Failed to connect to database {path}: {source}")]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Database opened but holds none of the expected tables
    #[error("Database {0} contains none of the expected tables")]
    InvalidStore(PathBuf),

    /// A single-valued main filter has no value
    #[error("No value selected for main filter '{0}'")]
    MissingSelection(&'static str),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(#[from] rusqlite::Error),
}

impl StoreError {
    /// True for failures that mean the store itself is unusable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidPath(_) | StoreError::Connection { .. } | StoreError::InvalidStore(_)
        )
    }
}

/// Type alias for Results using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;
