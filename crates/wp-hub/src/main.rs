use anyhow::Context;
use axum::{routing::get, Router};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod service;
mod store;

use config::{Config, Overrides};
use service::QueryService;

// =============================================================================
// CLI
// =============================================================================

#[derive(Parser)]
#[command(
    name = "wp-hub",
    version,
    about = "Waypoint hotel, city and country lookup service"
)]
struct Args {
    /// Path to config file
    #[arg(long, default_value = "wp-hub.toml")]
    config: PathBuf,

    /// Server bind address (overrides the config file)
    #[arg(long, env = "WAYPOINT_BIND")]
    bind: Option<String>,

    /// MongoDB connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JSON seed file to bulk-load at startup
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Refuse to fall back to the in-memory store
    #[arg(long)]
    production: bool,
}

// =============================================================================
// Application State
// =============================================================================

pub struct AppState {
    pub service: QueryService,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(api::search))
        .route("/hotels/:id", get(api::get_hotel))
        .route("/cities/:name", get(api::get_city))
        .route("/countries/:name", get(api::get_country))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "wp_hub=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = Config::load(&args.config)?;
    config.apply(&Overrides {
        bind: args.bind,
        database_url: args.database_url,
        seed: args.seed,
        production: args.production,
    });

    let store = store::open(&config).await?;

    if let Some(path) = &config.store.seed {
        let data = store::load_seed_file(path)?;
        match store::seed_if_empty(store.as_ref(), data)
            .await
            .context("seeding store")?
        {
            Some(summary) => tracing::info!(
                "Seeded {} hotels, {} cities, {} countries from {}",
                summary.hotels,
                summary.cities,
                summary.countries,
                path.display()
            ),
            None => tracing::info!(
                "Store already holds data, skipping seed file {}",
                path.display()
            ),
        }
    }

    let state = Arc::new(AppState {
        service: QueryService::new(store.clone(), config.query_timeout()),
    });
    let app = router(state);

    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {}", config.server.bind))?;
    tracing::info!("  Waypoint lookup service");
    tracing::info!("  API:     http://{}/search?q=", addr);
    tracing::info!("  Store:   {}", store.kind());
    tracing::info!("  Timeout: {:?}", config.query_timeout());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

// =============================================================================
// Shutdown
// =============================================================================

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {}", e);
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
    tracing::info!("Shutdown signal received, draining connections...");
}
