//! Runs against a throwaway Postgres container; needs a Docker daemon.

use std::time::Duration;

use burrow_storage::{
    CallContext, PostgresStorage, ReadStorage, ShortenerRecord, StorageError, UrlStorage,
};
use burrow_test_infra::postgres::{PostgresConfig, PostgresServer};
use sqlx::postgres::PgPoolOptions;

struct Fixture {
    _postgres: PostgresServer,
    storage: PostgresStorage,
}

impl Fixture {
    async fn start() -> Self {
        let postgres = PostgresServer::new(PostgresConfig::builder().build())
            .await
            .expect("start postgres");
        let url = postgres.database_url().await.expect("postgres url");
        let pool = connect_with_retry(&url).await;

        let storage = PostgresStorage::from_pool(&CallContext::background(), pool)
            .await
            .expect("create schema");

        Self {
            _postgres: postgres,
            storage,
        }
    }
}

async fn connect_with_retry(url: &str) -> sqlx::PgPool {
    let mut last_error = None;

    for _ in 0..20 {
        match PgPoolOptions::new().max_connections(5).connect(url).await {
            Ok(pool) => return pool,
            Err(err) => {
                last_error = Some(err);
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }
    }

    panic!("failed to connect postgres: {last_error:?}");
}

fn record(short_url: &str, original_url: &str, user_id: &str) -> ShortenerRecord {
    ShortenerRecord::new(short_url, original_url, user_id)
}

async fn row_count(storage: &PostgresStorage) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM url_storage")
        .fetch_one(storage.pool())
        .await
        .unwrap()
}

#[tokio::test]
async fn write_and_read_record() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_url(&ctx, &record("http://s/abc", "https://example.com/page", "u1"))
        .await
        .unwrap();

    let got = fixture
        .storage
        .read_url(&ctx, "http://s/abc")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(got.original_url, "https://example.com/page");
    assert_eq!(got.user_id, "u1");
    let found = fixture
        .storage
        .read_url(&ctx, "http://s/nope")
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn schema_creation_is_idempotent() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    let again = PostgresStorage::from_pool(&ctx, fixture.storage.pool().clone()).await;
    assert!(again.is_ok());
}

#[tokio::test]
async fn second_write_of_same_original_url_is_duplicate() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_url(&ctx, &record("http://s/first", "https://example.com", ""))
        .await
        .unwrap();

    let err = fixture
        .storage
        .write_url(&ctx, &record("http://s/second", "https://example.com", ""))
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::Duplicate("https://example.com".to_string()));

    let existing = fixture
        .storage
        .check_duplicate_url(&ctx, "https://example.com")
        .await
        .unwrap();
    assert_eq!(existing.as_deref(), Some("http://s/first"));
    let found = fixture
        .storage
        .read_url(&ctx, "http://s/second")
        .await
        .unwrap();
    assert!(found.is_none());
    assert_eq!(row_count(&fixture.storage).await, 1);
}

#[tokio::test]
async fn short_url_collision_is_conflict() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_url(&ctx, &record("http://s/abc", "https://one.example", ""))
        .await
        .unwrap();

    let err = fixture
        .storage
        .write_url(&ctx, &record("http://s/abc", "https://two.example", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict(_)));
}

#[tokio::test]
async fn failed_batch_leaves_nothing_behind() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    let batch = vec![
        record("http://s/a", "https://a.example", ""),
        record("http://s/b", "https://b.example", ""),
        // Same original URL as the first entry: violates the unique constraint.
        record("http://s/c", "https://a.example", ""),
        record("http://s/d", "https://d.example", ""),
    ];

    let err = fixture.storage.write_batch(&ctx, &batch).await.unwrap_err();
    assert!(matches!(err, StorageError::Duplicate(_)));

    assert_eq!(row_count(&fixture.storage).await, 0);
    for r in &batch {
        let found = fixture.storage.read_url(&ctx, &r.short_url).await.unwrap();
        assert!(found.is_none());
    }
}

#[tokio::test]
async fn batch_commits_every_record() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    let batch = vec![
        record("http://s/a", "https://a.example", "u1"),
        record("http://s/b", "https://b.example", "u1"),
    ];
    fixture.storage.write_batch(&ctx, &batch).await.unwrap();

    let urls = fixture.storage.get_user_urls(&ctx, "u1").await.unwrap();
    assert_eq!(urls, batch);
}

#[tokio::test]
async fn delete_only_touches_rows_owned_by_the_user() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_batch(
            &ctx,
            &[
                record("http://s/mine", "https://mine.example", "alice"),
                record("http://s/theirs", "https://theirs.example", "bob"),
            ],
        )
        .await
        .unwrap();

    fixture
        .storage
        .delete_user_urls(
            &ctx,
            &[
                record("http://s/mine", "", "alice"),
                // Right short URL, wrong owner.
                record("http://s/theirs", "", "alice"),
            ],
        )
        .await
        .unwrap();

    let found = fixture
        .storage
        .read_url(&ctx, "http://s/mine")
        .await
        .unwrap();
    assert!(found.is_none());
    let urls = fixture.storage.get_user_urls(&ctx, "alice").await.unwrap();
    assert!(urls.is_empty());

    let theirs = fixture
        .storage
        .read_url(&ctx, "http://s/theirs")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(theirs.user_id, "bob");
    let urls = fixture.storage.get_user_urls(&ctx, "bob").await.unwrap();
    assert_eq!(urls.len(), 1);
}

#[tokio::test]
async fn deleted_url_can_be_shortened_again() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_url(&ctx, &record("http://s/gone", "https://gone.example", "alice"))
        .await
        .unwrap();
    fixture
        .storage
        .delete_user_urls(&ctx, &[record("http://s/gone", "", "alice")])
        .await
        .unwrap();

    let existing = fixture
        .storage
        .check_duplicate_url(&ctx, "https://gone.example")
        .await
        .unwrap();
    assert_eq!(existing, None);

    fixture
        .storage
        .write_url(&ctx, &record("http://s/back", "https://gone.example", "bob"))
        .await
        .unwrap();

    let revived = fixture
        .storage
        .read_url(&ctx, "http://s/back")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(revived.original_url, "https://gone.example");
    assert_eq!(revived.user_id, "bob");
    let found = fixture
        .storage
        .read_url(&ctx, "http://s/gone")
        .await
        .unwrap();
    assert!(found.is_none());

    let existing = fixture
        .storage
        .check_duplicate_url(&ctx, "https://gone.example")
        .await
        .unwrap();
    assert_eq!(existing.as_deref(), Some("http://s/back"));

    // The revived row is live again, so a third write is a duplicate.
    let err = fixture
        .storage
        .write_url(&ctx, &record("http://s/third", "https://gone.example", ""))
        .await
        .unwrap_err();
    assert_eq!(err, StorageError::Duplicate("https://gone.example".to_string()));
}

#[tokio::test]
async fn batch_revives_deleted_url() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();

    fixture
        .storage
        .write_url(&ctx, &record("http://s/old", "https://a.example", "alice"))
        .await
        .unwrap();
    fixture
        .storage
        .delete_user_urls(&ctx, &[record("http://s/old", "", "alice")])
        .await
        .unwrap();

    let batch = vec![
        record("http://s/a", "https://a.example", "alice"),
        record("http://s/b", "https://b.example", "alice"),
    ];
    fixture.storage.write_batch(&ctx, &batch).await.unwrap();

    let urls = fixture.storage.get_user_urls(&ctx, "alice").await.unwrap();
    assert_eq!(urls, batch);
    assert_eq!(row_count(&fixture.storage).await, 2);
}

#[tokio::test]
async fn ping_and_cancelled_context() {
    let fixture = Fixture::start().await;
    let ctx = CallContext::background();
    fixture.storage.ping(&ctx).await.unwrap();

    let cancelled = CallContext::background();
    cancelled.cancellation_token().cancel();
    let err = fixture.storage.ping(&cancelled).await.unwrap_err();
    assert_eq!(err, StorageError::Cancelled);
}
