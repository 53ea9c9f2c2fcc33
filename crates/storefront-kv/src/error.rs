//! Key-Value store error types.

use thiserror::Error;

/// Result type for store operations.
pub type KvResult<T> = Result<T, KvError>;

/// Errors that can occur when using a Key-Value store.
#[derive(Error, Debug)]
pub enum KvError {
    /// Failed to open the store.
    #[error("Failed to open store: {0}")]
    Open(String),

    /// The backend rejected the operation.
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Key is not usable by this backend.
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
