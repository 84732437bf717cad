//! Lenaclav - content/events API server

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use lenaclav_api::{AppState, MetricsHandle, create_router};
use lenaclav_auth::{IdentityProvider, KeySetCache, LocalProvider, SessionGate, TokenVerifier};
use lenaclav_db::Database;

/// Lenaclav - content and events API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "LENACLAV_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "LENACLAV_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting lenaclav v{}", env!("CARGO_PKG_VERSION"));

    // Create the directory holding the SQLite file
    if let Some(parent) = Path::new(&config.database.path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Initialize the token verifier; the key-set cache is constructed here
    // and handed in, so its TTL and invalidation stay with the owner
    let verifier = Arc::new(match &config.auth.issuer {
        Some(issuer) => {
            let ttl = Duration::from_secs(config.auth.jwks_ttl_secs);
            let keys = Arc::new(KeySetCache::from_issuer(issuer, ttl)?);
            info!("Verifying issuer-signed tokens via {}", keys.url());
            TokenVerifier::with_issuer(config.auth.test_tokens, issuer.clone(), keys)
        }
        None => {
            warn!("No token issuer configured; accepting self-signed credentials only");
            TokenVerifier::new(config.auth.test_tokens)
        }
    });

    // Initialize the identity provider
    let identity: Arc<dyn IdentityProvider> = match config.auth.provider.as_str() {
        "local" => Arc::new(LocalProvider::new()),
        other => anyhow::bail!("unknown identity provider: {}", other),
    };

    // Create application state and the session gate
    let state = AppState::new(db.clone(), verifier.clone(), identity);
    let gate = SessionGate::new(config.auth.bypass, verifier, db);
    if config.auth.bypass {
        warn!("Session gate bypass is enabled; requests are not authenticated");
    }

    // Install the Prometheus recorder
    let metrics_handle = Arc::new(MetricsHandle::new(
        PrometheusBuilder::new().install_recorder()?,
    ));

    // Create router
    let app = create_router(state, gate, Some(metrics_handle)).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}
