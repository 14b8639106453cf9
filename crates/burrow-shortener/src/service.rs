use async_trait::async_trait;
use burrow_core::{
    BatchItem, BatchShortened, CallContext, ShortCode, ShortenParams, Shortener, ShortenerError,
    ShortenerRecord, StorageError, UrlStorage,
};
use burrow_generator::Generator;
use std::sync::Arc;
use url::Url;

type Result<T> = std::result::Result<T, ShortenerError>;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `UrlStorage` and a `Generator` to handle:
/// - URL validation before anything reaches storage
/// - Short code generation and short URL construction
/// - Recovery of the existing short URL when storage reports a duplicate
///
/// Note: generated codes are not checked for collisions. A collision in the
/// database backend surfaces as a storage conflict.
#[derive(Clone)]
pub struct ShortenerService<G> {
    storage: Arc<dyn UrlStorage>,
    generator: Arc<G>,
    base_url: String,
}

impl<G: Generator> ShortenerService<G> {
    /// Creates a new `ShortenerService`.
    ///
    /// Short URLs are built as `{base_url}/{code}`; a trailing slash on
    /// `base_url` is ignored.
    pub fn new(storage: Arc<dyn UrlStorage>, generator: G, base_url: impl Into<String>) -> Self {
        Self {
            storage,
            generator: Arc::new(generator),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Validates that the URL is absolute with an http(s) scheme and a host.
    fn validate_url(raw: &str) -> Result<()> {
        let parsed =
            Url::parse(raw).map_err(|e| ShortenerError::InvalidUrl(format!("{raw}: {e}")))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                parsed.scheme()
            )));
        }

        if parsed.host_str().is_none_or(str::is_empty) {
            return Err(ShortenerError::InvalidUrl(format!(
                "URL must have a host: {raw}"
            )));
        }

        Ok(())
    }

    fn next_short_url(&self) -> String {
        let code: ShortCode = self.generator.generate().into();
        code.to_url(&self.base_url)
    }

    /// Turns a storage duplicate signal into a `Duplicate` outcome carrying
    /// the short URL already stored for `original_url`.
    ///
    /// If the lookup finds nothing (the conflicting row belonged to the same
    /// rolled-back batch), the storage error is returned unchanged.
    async fn resolve_duplicate(
        &self,
        ctx: &CallContext,
        original_url: &str,
        err: StorageError,
    ) -> ShortenerError {
        match self.storage.check_duplicate_url(ctx, original_url).await {
            Ok(Some(existing)) => {
                tracing::debug!(original_url, short_url = %existing, "url already shortened");
                ShortenerError::Duplicate(existing)
            }
            Ok(None) => ShortenerError::Storage(err),
            Err(lookup) => ShortenerError::Storage(lookup),
        }
    }
}

#[async_trait]
impl<G: Generator> Shortener for ShortenerService<G> {
    async fn shorten(&self, ctx: &CallContext, params: ShortenParams) -> Result<String> {
        Self::validate_url(&params.original_url)?;

        let record = ShortenerRecord::new(
            self.next_short_url(),
            params.original_url,
            params.user_id,
        );

        match self.storage.write_url(ctx, &record).await {
            Ok(()) => Ok(record.short_url),
            Err(err @ StorageError::Duplicate(_)) => {
                Err(self.resolve_duplicate(ctx, &record.original_url, err).await)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn shorten_batch(
        &self,
        ctx: &CallContext,
        user_id: &str,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchShortened>> {
        // All or nothing: reject the whole batch before any write.
        for item in &items {
            Self::validate_url(&item.original_url)?;
        }

        let mut records = Vec::with_capacity(items.len());
        let mut shortened = Vec::with_capacity(items.len());
        for item in items {
            let short_url = self.next_short_url();
            records.push(ShortenerRecord::new(
                short_url.clone(),
                item.original_url,
                user_id,
            ));
            shortened.push(BatchShortened {
                correlation_id: item.correlation_id,
                short_url,
            });
        }

        match self.storage.write_batch(ctx, &records).await {
            Ok(()) => Ok(shortened),
            Err(StorageError::Duplicate(original_url)) => {
                let err = StorageError::Duplicate(original_url.clone());
                Err(self.resolve_duplicate(ctx, &original_url, err).await)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn expand(
        &self,
        ctx: &CallContext,
        code: &ShortCode,
    ) -> Result<Option<ShortenerRecord>> {
        Ok(self
            .storage
            .read_url(ctx, &code.to_url(&self.base_url))
            .await?)
    }

    async fn user_urls(&self, ctx: &CallContext, user_id: &str) -> Result<Vec<ShortenerRecord>> {
        Ok(self.storage.get_user_urls(ctx, user_id).await?)
    }

    async fn delete_user_urls(
        &self,
        ctx: &CallContext,
        user_id: &str,
        codes: Vec<ShortCode>,
    ) -> Result<()> {
        let records: Vec<_> = codes
            .iter()
            .map(|code| ShortenerRecord::new(code.to_url(&self.base_url), "", user_id))
            .collect();

        Ok(self.storage.delete_user_urls(ctx, &records).await?)
    }

    async fn ping(&self, ctx: &CallContext) -> Result<()> {
        Ok(self.storage.ping(ctx).await?)
    }
}
