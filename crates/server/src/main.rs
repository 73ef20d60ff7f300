use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use popcorn_core::{
    load_config, validate_config, FileStorage, ShowApi, StorageBackend, TvMazeClient,
};
use popcorn_server::api::{create_router, spawn_catalog_forwarder, spawn_heartbeat, WsBroadcaster};
use popcorn_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Interval between WebSocket heartbeats
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Popcorn v{}", VERSION);

    // Determine config path
    let config_path = std::env::var("POPCORN_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("TVMaze base URL: {}", config.tvmaze.base_url);
    info!("Storage directory: {:?}", config.storage.dir);

    // Remote catalog client
    let api: Arc<dyn ShowApi> = Arc::new(
        TvMazeClient::new(config.tvmaze.clone()).context("Failed to create TVMaze client")?,
    );

    // Persisted lists
    tokio::fs::create_dir_all(&config.storage.dir)
        .await
        .with_context(|| format!("Failed to create storage directory {:?}", config.storage.dir))?;
    let storage: Arc<dyn StorageBackend> = Arc::new(FileStorage::new(config.storage.dir.clone()));

    let ws_broadcaster = WsBroadcaster::default();
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let preload = config.catalog.preload;

    let state = Arc::new(AppState::build(config, api, storage, ws_broadcaster.clone()).await);

    // Push catalog changes and heartbeats to WebSocket clients
    let forwarder = spawn_catalog_forwarder(state.catalog(), ws_broadcaster.clone());
    let heartbeat = spawn_heartbeat(ws_broadcaster, HEARTBEAT_INTERVAL);

    if preload {
        let catalog = state.catalog().clone();
        tokio::spawn(async move {
            info!("Preloading default catalog pages");
            catalog.load_default_pages().await;
            match catalog.error() {
                Some(e) => error!("Catalog preload failed: {}", e),
                None => info!("Catalog preloaded with {} shows", catalog.index_len()),
            }
        });
    }

    // Create router
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutting down...");
    heartbeat.abort();
    forwarder.abort();

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
