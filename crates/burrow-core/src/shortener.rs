use crate::context::CallContext;
use crate::shortcode::ShortCode;
use crate::storage::ShortenerRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct ShortenParams {
    /// The original URL to be shortened.
    pub original_url: String,
    /// Opaque id of the submitting client, empty for anonymous callers.
    pub user_id: String,
}

/// One entry of a batch shorten request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchItem {
    pub correlation_id: String,
    pub original_url: String,
}

/// The short URL produced for one [`BatchItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShortened {
    pub correlation_id: String,
    pub short_url: String,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a shortened URL and returns the full short URL.
    ///
    /// Returns `Err(ShortenerError::Duplicate(existing))` when the storage
    /// already maps the original URL; `existing` is the stored short URL.
    async fn shorten(&self, ctx: &CallContext, params: ShortenParams) -> Result<String>;

    /// Shortens every item in one storage batch. Either all items are
    /// stored or none are.
    async fn shorten_batch(
        &self,
        ctx: &CallContext,
        user_id: &str,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchShortened>>;

    /// Resolves a short code to its stored record.
    /// Returns `None` if the code does not exist or was deleted.
    async fn expand(&self, ctx: &CallContext, code: &ShortCode)
        -> Result<Option<ShortenerRecord>>;

    /// Lists the live records owned by `user_id`.
    async fn user_urls(&self, ctx: &CallContext, user_id: &str) -> Result<Vec<ShortenerRecord>>;

    /// Soft-deletes the given codes, but only those owned by `user_id`.
    async fn delete_user_urls(
        &self,
        ctx: &CallContext,
        user_id: &str,
        codes: Vec<ShortCode>,
    ) -> Result<()>;

    /// Checks that the storage backend is reachable.
    async fn ping(&self, ctx: &CallContext) -> Result<()>;
}
