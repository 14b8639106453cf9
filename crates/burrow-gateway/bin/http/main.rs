mod cli;

use crate::cli::{StorageBackend, CLI};
use burrow_core::{CallContext, UrlStorage};
use burrow_gateway::{App, AppState};
use burrow_generator::RandomGenerator;
use burrow_shortener::ShortenerService;
use burrow_storage::{FileStorage, MemoryStorage, PostgresStorage};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = CLI::parse();
    let backend = config.storage_backend();

    info!(
        listen_addr = %config.server_address,
        base_url = %config.base_url,
        storage_backend = %backend,
        "starting gateway server"
    );

    let connect_ctx = CallContext::with_timeout(config.request_timeout());
    let storage = open_storage(&backend, &connect_ctx).await?;
    let service = ShortenerService::new(
        storage,
        RandomGenerator::new(config.short_code_length()),
        config.base_url.clone(),
    );

    let shutdown = CancellationToken::new();
    let state = AppState::new(Arc::new(service), config.request_timeout(), shutdown.clone());

    let listener = TcpListener::bind(&config.server_address).await?;
    info!(listen_addr = %listener.local_addr()?, "gateway listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Stops background deletions still waiting on storage.
    shutdown.cancel();
    info!("gateway stopped");

    Ok(())
}

async fn open_storage(
    backend: &StorageBackend,
    ctx: &CallContext,
) -> Result<Arc<dyn UrlStorage>, Box<dyn std::error::Error>> {
    let storage: Arc<dyn UrlStorage> = match backend {
        StorageBackend::Postgres(dsn) => Arc::new(PostgresStorage::connect(ctx, dsn).await?),
        StorageBackend::File(path) => Arc::new(FileStorage::open(path).await?),
        StorageBackend::InMemory => Arc::new(MemoryStorage::new()),
    };
    Ok(storage)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
