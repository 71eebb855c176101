//! Loadboard API Server
//!
//! Run with: cargo run --bin loadboard -- --config config.toml
//!
//! Without `--config` the default locations are searched (see
//! [`loadboard::config::Config::load_default`]); `LOADBOARD_*` environment
//! variables override either. `RUST_LOG` overrides the configured log level.

use clap::Parser;
use loadboard::api::{serve, AppState};
use loadboard::backend::{MemoryStore, PocketBaseClient, PocketBaseConfig, RecordStore};
use loadboard::config::{BackendKind, Config, LoggingConfig};
use loadboard::notify::{HttpNotifier, HttpNotifierConfig, NoopNotifier, Notifier};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "loadboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Freight marketplace API server")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(port) = args.port {
        config.api.port = port;
    }

    init_tracing(&config.logging)?;

    tracing::info!("Starting Loadboard API server v{}", env!("CARGO_PKG_VERSION"));

    let store = build_store(&config).await?;
    let notifier = build_notifier(&config)?;
    tracing::info!(
        backend = store.name(),
        notifier = notifier.name(),
        strict_transitions = config.api.strict_transitions,
        "Services initialized"
    );

    let state = AppState::new(store, notifier, config);
    serve(state).await?;

    tracing::info!("Loadboard API server stopped");
    Ok(())
}

/// Install the global subscriber: `pretty` or `json`, to stdout or a file
fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("loadboard={},tower_http=info", logging.level))
    });
    let json = logging.format.eq_ignore_ascii_case("json");

    let file = match &logging.file {
        Some(path) => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        ),
        None => None,
    };

    let registry = tracing_subscriber::registry().with(filter);
    match (json, file) {
        (true, Some(file)) => registry
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .init(),
        (true, None) => registry.with(fmt::layer().json()).init(),
        (false, Some(file)) => registry
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .init(),
        (false, None) => registry.with(fmt::layer().pretty()).init(),
    }

    Ok(())
}

async fn build_store(config: &Config) -> Result<Arc<dyn RecordStore>, Box<dyn std::error::Error>> {
    match config.backend.kind {
        BackendKind::Pocketbase => {
            tracing::info!("Record backend: PocketBase at {}", config.backend.url);
            let client = PocketBaseClient::new(PocketBaseConfig {
                base_url: config.backend.url.clone(),
                token: config.backend.token.clone(),
                request_timeout_ms: config.backend.request_timeout_ms,
            })?;

            // Start anyway; readiness reports the backend until it answers
            match client.health().await {
                Ok(()) => tracing::info!("Backend connection verified"),
                Err(e) => tracing::warn!("Backend not available: {} (requests will fail)", e),
            }

            Ok(Arc::new(client))
        }
        BackendKind::Memory => {
            tracing::warn!("Using the in-memory record store; data is lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

fn build_notifier(config: &Config) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    let notifications = &config.notifications;
    if !notifications.enabled {
        tracing::info!("Email notifications disabled");
        return Ok(Arc::new(NoopNotifier));
    }

    let notifier = HttpNotifier::new(HttpNotifierConfig {
        load_endpoint: notifications.load_endpoint.clone(),
        welcome_endpoint: notifications.welcome_endpoint.clone(),
        request_timeout_ms: notifications.request_timeout_ms,
    })?;
    Ok(Arc::new(notifier))
}
