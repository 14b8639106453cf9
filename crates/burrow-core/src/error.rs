use thiserror::Error;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The original URL is already mapped to a short URL.
    #[error("original url already shortened: {0}")]
    Duplicate(String),
    #[error("short url already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage operation cancelled")]
    Cancelled,
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage i/o failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// Carries the short URL that already maps to the submitted original URL.
    #[error("url already shortened as {0}")]
    Duplicate(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        ShortenerError::Storage(value)
    }
}
