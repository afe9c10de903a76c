// AppReg API Server
// OAuth client registration REST API

mod config;
mod handlers;
mod middleware;
mod routes;

use anyhow::Context;
use appreg_auth::ClientService;
use appreg_cache::SessionStore;
use appreg_database::{ClientStore, MemoryClientStore, PgClientRepository};
use appreg_storage::FsAssetStore;
use axum::extract::DefaultBodyLimit;
use crate::config::{Config, StoreBackend};
use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub struct AppState {
    pub client_service: ClientService,
    pub sessions: Arc<dyn SessionStore>,
    pub session_cookie: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,appreg_api=debug,tower_http=debug".to_string()),
        )
        .init();

    tracing::info!("Starting AppReg API Server");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load().context("Invalid configuration")?;
    tracing::info!("Server: {}:{}", config.server_host, config.server_port);

    // Initialize client store
    let store: Arc<dyn ClientStore> = match config.store {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let database = appreg_database::Database::new(config.database.clone())
                .await
                .context("Failed to connect to database")?;
            database.ping().await.context("Database ping failed")?;
            database
                .ensure_schema()
                .await
                .context("Failed to create database schema")?;
            tracing::info!("Database connected");
            Arc::new(PgClientRepository::new(database.pool().clone()))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory client store, registrations are lost on restart");
            Arc::new(MemoryClientStore::new())
        }
    };

    // Initialize session lookup
    tracing::info!("Connecting to Redis...");
    let cache = appreg_cache::Cache::new(config.cache.clone())
        .await
        .context("Failed to connect to Redis")?;
    cache.ping().await.context("Redis ping failed")?;
    tracing::info!("Redis connected");

    // Initialize logo storage
    tokio::fs::create_dir_all(&config.storage.media_root)
        .await
        .with_context(|| {
            format!(
                "Failed to create media root {}",
                config.storage.media_root.display()
            )
        })?;
    let assets = Arc::new(FsAssetStore::new(config.storage.clone()));
    tracing::info!("Logos stored in {}", config.storage.media_root.display());

    // Create app state
    let state = Arc::new(AppState {
        client_service: ClientService::new(store, assets),
        sessions: Arc::new(cache),
        session_cookie: config.session_cookie.clone(),
    });

    // Create router
    let app = routes::serve_media(routes::create_router(state), &config.storage)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    tracing::info!("Routes configured:");
    tracing::info!("   GET    /health");
    tracing::info!("   GET    /app");
    tracing::info!("   POST   /app");
    tracing::info!("   GET    /app/:client_id");
    tracing::info!("   PUT    /app/:client_id");
    tracing::info!("   DELETE /app/:client_id");
    tracing::info!("   PATCH  /app/:client_id/secret");
    tracing::info!("   PATCH  /app/:client_id/scope");

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server ready at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
