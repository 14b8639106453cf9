use async_trait::async_trait;
use burrow_core::error::{Result, StorageError};
use burrow_core::{CallContext, ReadStorage, ShortenerRecord, UrlStorage};
use sqlx::postgres::{PgExecutor, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

const CREATE_SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS url_storage (
        short_url    VARCHAR(255)  PRIMARY KEY,
        original_url VARCHAR(2048) NOT NULL UNIQUE,
        user_id      VARCHAR(255),
        deleted_flag BOOLEAN       NOT NULL DEFAULT FALSE
    )
"#;

/// Name Postgres gives the `UNIQUE` constraint on `original_url`.
const ORIGINAL_URL_CONSTRAINT: &str = "url_storage_original_url_key";

/// Inserts a record, or takes over a soft-deleted row with the same
/// original URL. A live row with that URL is left untouched and no row is
/// affected.
const INSERT_RECORD: &str = r#"
    INSERT INTO url_storage (short_url, original_url, user_id)
    VALUES ($1, $2, $3)
    ON CONFLICT (original_url) DO UPDATE
    SET short_url = EXCLUDED.short_url,
        user_id = EXCLUDED.user_id,
        deleted_flag = FALSE
    WHERE url_storage.deleted_flag
"#;

/// Postgres implementation of the storage contract, backed by the
/// `url_storage` table.
///
/// Original URLs are unique: writing a known original URL returns
/// [`StorageError::Duplicate`] and [`ReadStorage::check_duplicate_url`]
/// yields the short URL stored first. The check runs before the insert and
/// is not atomic with it; a concurrent insert of the same URL is still
/// caught by the insert itself and reported the same way.
///
/// Deletion sets `deleted_flag`. Flagged rows are invisible to every read,
/// including the duplicate lookup. Shortening a deleted URL again reuses its
/// row under the new short URL and owner.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Opens a connection pool to `dsn` and makes sure the schema exists.
    pub async fn connect(ctx: &CallContext, dsn: &str) -> Result<Self> {
        let pool = ctx
            .run(async {
                PgPoolOptions::new()
                    .connect(dsn)
                    .await
                    .map_err(map_sqlx_error)
            })
            .await?;
        Self::from_pool(ctx, pool).await
    }

    /// Wraps an existing pool and makes sure the schema exists.
    pub async fn from_pool(ctx: &CallContext, pool: PgPool) -> Result<Self> {
        let storage = Self { pool };
        storage.create_schema(ctx).await?;
        Ok(storage)
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn create_schema(&self, ctx: &CallContext) -> Result<()> {
        ctx.run(async {
            sqlx::query(CREATE_SCHEMA)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            Ok(())
        })
        .await
    }

    async fn find_short_url(&self, original_url: &str) -> Result<Option<String>> {
        let row = sqlx::query(
            r#"
            SELECT short_url
            FROM url_storage
            WHERE original_url = $1
              AND NOT deleted_flag
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| row.try_get("short_url").map_err(map_sqlx_error))
            .transpose()
    }
}

fn owner(record: &ShortenerRecord) -> Option<&str> {
    Some(record.user_id.as_str()).filter(|id| !id.is_empty())
}

async fn insert_record<'e, E>(executor: E, record: &ShortenerRecord) -> Result<()>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(INSERT_RECORD)
        .bind(&record.short_url)
        .bind(&record.original_url)
        .bind(owner(record))
        .execute(executor)
        .await
        .map_err(|err| map_insert_error(err, record))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::Duplicate(record.original_url.clone()));
    }
    Ok(())
}

fn record_from_row(row: &PgRow) -> Result<ShortenerRecord> {
    let user_id: Option<String> = row.try_get("user_id").map_err(map_sqlx_error)?;
    Ok(ShortenerRecord {
        id: 0,
        user_id: user_id.unwrap_or_default(),
        short_url: row.try_get("short_url").map_err(map_sqlx_error)?,
        original_url: row.try_get("original_url").map_err(map_sqlx_error)?,
    })
}

fn map_insert_error(err: sqlx::Error, record: &ShortenerRecord) -> StorageError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return match db_err.constraint() {
                Some(ORIGINAL_URL_CONSTRAINT) => {
                    StorageError::Duplicate(record.original_url.clone())
                }
                _ => StorageError::Conflict(record.short_url.clone()),
            };
        }
    }
    map_sqlx_error(err)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadStorage for PostgresStorage {
    async fn read_url(
        &self,
        ctx: &CallContext,
        short_url: &str,
    ) -> Result<Option<ShortenerRecord>> {
        ctx.run(async {
            let row = sqlx::query(
                r#"
                SELECT short_url, original_url, user_id
                FROM url_storage
                WHERE short_url = $1
                  AND NOT deleted_flag
                "#,
            )
            .bind(short_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            row.as_ref().map(record_from_row).transpose()
        })
        .await
    }

    async fn check_duplicate_url(
        &self,
        ctx: &CallContext,
        original_url: &str,
    ) -> Result<Option<String>> {
        ctx.run(self.find_short_url(original_url)).await
    }

    async fn get_user_urls(
        &self,
        ctx: &CallContext,
        user_id: &str,
    ) -> Result<Vec<ShortenerRecord>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }

        ctx.run(async {
            let rows = sqlx::query(
                r#"
                SELECT short_url, original_url, user_id
                FROM url_storage
                WHERE user_id = $1
                  AND NOT deleted_flag
                ORDER BY short_url
                "#,
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            rows.iter().map(record_from_row).collect::<Result<Vec<_>>>()
        })
        .await
    }

    async fn ping(&self, ctx: &CallContext) -> Result<()> {
        ctx.run(async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl UrlStorage for PostgresStorage {
    async fn write_url(&self, ctx: &CallContext, record: &ShortenerRecord) -> Result<()> {
        ctx.run(async {
            if self.find_short_url(&record.original_url).await?.is_some() {
                return Err(StorageError::Duplicate(record.original_url.clone()));
            }
            insert_record(&self.pool, record).await
        })
        .await
    }

    async fn write_batch(&self, ctx: &CallContext, records: &[ShortenerRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        ctx.run(async {
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            for record in records {
                if let Err(err) = insert_record(&mut *tx, record).await {
                    tx.rollback().await.map_err(map_sqlx_error)?;
                    return Err(err);
                }
            }

            tx.commit().await.map_err(map_sqlx_error)
        })
        .await
    }

    async fn delete_user_urls(
        &self,
        ctx: &CallContext,
        records: &[ShortenerRecord],
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        ctx.run(async {
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            for record in records {
                let result = sqlx::query(
                    r#"
                    UPDATE url_storage
                    SET deleted_flag = TRUE
                    WHERE short_url = $1
                      AND user_id = $2
                    "#,
                )
                .bind(&record.short_url)
                .bind(&record.user_id)
                .execute(&mut *tx)
                .await;

                if let Err(err) = result {
                    tx.rollback().await.map_err(map_sqlx_error)?;
                    return Err(map_sqlx_error(err));
                }
            }

            tx.commit().await.map_err(map_sqlx_error)
        })
        .await
    }
}
