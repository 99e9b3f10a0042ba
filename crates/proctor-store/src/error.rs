use thiserror::Error;

/// Errors produced by the store layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// SQLite error.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Failed to determine a platform data directory.
    #[error("Could not determine application data directory")]
    NoDataDir,

    /// Generic I/O error (e.g. creating the database directory).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A query expected exactly one row but found none.
    #[error("Record not found")]
    NotFound,

    /// A write collided with a UNIQUE or PRIMARY KEY constraint.
    #[error("{0}")]
    Conflict(String),

    /// Migration failure.
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Remap a uniqueness violation to [`StoreError::Conflict`] carrying a
/// readable message; any other error passes through untouched.
pub(crate) fn unique_violation(err: rusqlite::Error, message: &str) -> StoreError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            tracing::debug!(error = %err, "uniqueness violation");
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Sqlite(err),
    }
}

/// Map `QueryReturnedNoRows` to [`StoreError::NotFound`].
pub(crate) fn not_found(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound,
        other => StoreError::Sqlite(other),
    }
}
