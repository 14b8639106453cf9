use crate::context::CallContext;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A stored mapping from a short URL to the URL it redirects to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortenerRecord {
    /// Advisory sequence number. Only the file backend assigns it, as write order.
    pub id: u64,
    /// Opaque owner of the record. Empty means unowned.
    pub user_id: String,
    /// The short URL, used as an opaque key.
    pub short_url: String,
    /// The original URL that was shortened.
    pub original_url: String,
}

impl ShortenerRecord {
    pub fn new(
        short_url: impl Into<String>,
        original_url: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            user_id: user_id.into(),
            short_url: short_url.into(),
            original_url: original_url.into(),
        }
    }
}

/// A read-only view of a storage backend.
///
/// Split from [`UrlStorage`] so that callers that only resolve short URLs
/// do not need write access.
#[async_trait]
pub trait ReadStorage: Send + Sync + 'static {
    /// Looks up a record by its short URL.
    /// Returns `None` if no live record exists for the key.
    async fn read_url(&self, ctx: &CallContext, short_url: &str)
        -> Result<Option<ShortenerRecord>>;

    /// Returns the short URL already stored for `original_url`, if any.
    ///
    /// Backends that do not track original URLs always return `None`.
    async fn check_duplicate_url(
        &self,
        ctx: &CallContext,
        original_url: &str,
    ) -> Result<Option<String>>;

    /// Returns every non-deleted record owned by `user_id`.
    ///
    /// Backends without user tracking return an empty list.
    async fn get_user_urls(&self, ctx: &CallContext, user_id: &str)
        -> Result<Vec<ShortenerRecord>>;

    /// Checks that the backing medium is reachable.
    async fn ping(&self, _ctx: &CallContext) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
pub trait UrlStorage: ReadStorage {
    /// Persists one record.
    ///
    /// Returns `Err(StorageError::Duplicate)` when the backend enforces
    /// original URL uniqueness and the URL is already stored.
    async fn write_url(&self, ctx: &CallContext, record: &ShortenerRecord) -> Result<()>;

    /// Persists several records. The first failure aborts the rest and is
    /// returned; transactional backends roll back the whole batch.
    async fn write_batch(&self, ctx: &CallContext, records: &[ShortenerRecord]) -> Result<()>;

    /// Marks the given records as deleted. Only rows where both the short URL
    /// and the user id match are affected.
    async fn delete_user_urls(&self, ctx: &CallContext, records: &[ShortenerRecord])
        -> Result<()>;
}
