use async_trait::async_trait;
use burrow_core::error::Result;
use burrow_core::{CallContext, ReadStorage, ShortenerRecord, UrlStorage};
use dashmap::DashMap;

/// In-memory storage keyed by short URL, using DashMap.
///
/// DashMap provides better concurrency than RwLock<HashMap> because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking.
///
/// Only the short URL to original URL mapping is kept. Writes are
/// unconditional upserts, so the last write for a short URL wins, and the
/// same original URL may be stored under any number of short URLs. There is
/// no user tracking and no deletion.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    urls: DashMap<String, String>,
}

impl MemoryStorage {
    /// Creates a new in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory storage with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            urls: DashMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    fn upsert(&self, record: &ShortenerRecord) {
        self.urls
            .insert(record.short_url.clone(), record.original_url.clone());
    }
}

#[async_trait]
impl ReadStorage for MemoryStorage {
    async fn read_url(
        &self,
        ctx: &CallContext,
        short_url: &str,
    ) -> Result<Option<ShortenerRecord>> {
        ctx.run(async {
            Ok(self.urls.get(short_url).map(|entry| ShortenerRecord {
                short_url: short_url.to_string(),
                original_url: entry.value().clone(),
                ..Default::default()
            }))
        })
        .await
    }

    async fn check_duplicate_url(
        &self,
        _ctx: &CallContext,
        _original_url: &str,
    ) -> Result<Option<String>> {
        Ok(None)
    }

    async fn get_user_urls(
        &self,
        _ctx: &CallContext,
        _user_id: &str,
    ) -> Result<Vec<ShortenerRecord>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl UrlStorage for MemoryStorage {
    async fn write_url(&self, ctx: &CallContext, record: &ShortenerRecord) -> Result<()> {
        ctx.run(async {
            self.upsert(record);
            Ok(())
        })
        .await
    }

    async fn write_batch(&self, ctx: &CallContext, records: &[ShortenerRecord]) -> Result<()> {
        ctx.run(async {
            records.iter().for_each(|record| self.upsert(record));
            Ok(())
        })
        .await
    }

    async fn delete_user_urls(
        &self,
        _ctx: &CallContext,
        _records: &[ShortenerRecord],
    ) -> Result<()> {
        Ok(())
    }
}
