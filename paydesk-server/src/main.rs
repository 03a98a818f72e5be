//! Paydesk Server
//!
//! Receives encrypted mobile-payment alerts from admin devices, fans them
//! out to sellers, and pushes live notifications over WebSockets.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use paydesk_core::decrypt::{AlertDecryptor, HttpAlertDecryptor};
use paydesk_core::directory::DbSellerDirectory;
use paydesk_core::processors::{FanoutDispatcher, NotificationIngest};
use paydesk_core::push::{ConnectionRegistry, ConnectionSweeper, NotificationQueue};
use server::{build_router, run_server};
use shutdown::spawn_config_reload_handler;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Paydesk - payment notification dispatch and confirmation server
#[derive(Parser, Debug)]
#[command(name = "paydesk-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./paydesk-config.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    init_tracing();

    // Parse command line arguments
    let args = Args::parse();

    tracing::info!("Starting paydesk-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_loader = Arc::new(ConfigLoader::new(&args.config, args.listen));
    let loaded_config = config_loader.load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        e
    })?;

    let listen_addr = loaded_config.server.listen;
    let push_config = loaded_config.push;
    let decrypt_config = loaded_config.decrypt.clone();
    tracing::info!("Configuration loaded from {:?}", args.config);

    // Convert to shared config with separate locks for each section
    let shared_config = loaded_config.into_shared();

    // Get database URL from environment
    let database_url = get_database_url().map_err(|e| {
        tracing::error!("DATABASE_URL environment variable not set");
        e
    })?;

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if args.migrate {
        tracing::info!("Running database migrations...");
        paydesk_core::MIGRATOR.run(&db_pool).await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;
        tracing::info!("Migrations completed successfully");
    }

    // Build the push subsystem: registry, outbound queue, sweeper
    let registry = Arc::new(ConnectionRegistry::new(push_config.idle_timeout));
    let queue = Arc::new(NotificationQueue::new(
        Arc::clone(&registry),
        push_config.debounce,
    ));
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let sweeper = ConnectionSweeper::new(
        Arc::clone(&registry),
        push_config.sweep_interval,
        shutdown_rx,
    );
    let sweeper_handle = tokio::spawn(sweeper.run());

    // Build the ingest pipeline: decryptor sidecar client + fan-out
    let decryptor: Arc<dyn AlertDecryptor> = Arc::new(
        HttpAlertDecryptor::new(decrypt_config.endpoint, decrypt_config.timeout).map_err(|e| {
            tracing::error!("Failed to build decryptor HTTP client: {}", e);
            e
        })?,
    );
    let directory = Arc::new(DbSellerDirectory::new(db_pool.clone()));
    let dispatcher = FanoutDispatcher::new(db_pool.clone(), directory, Arc::clone(&queue));
    let ingest = Arc::new(NotificationIngest::new(
        db_pool.clone(),
        decryptor,
        dispatcher,
    ));

    // Create application state
    let state = AppState::new(db_pool.clone(), shared_config, registry, ingest);

    // Spawn config reload handler (listens for SIGHUP)
    let shutdown_notify = spawn_config_reload_handler(state.clone(), config_loader);

    // Build the router
    let router = build_router(state);

    // Run the server
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop the sweeper and wait for it to drain
    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_handle.await {
        tracing::warn!("Connection sweeper task failed: {}", e);
    }

    // Signal the config reload handler to stop
    shutdown_notify.notify_one();

    // Close database connections gracefully
    tracing::info!("Closing database connections...");
    db_pool.close().await;
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
