//! Loadboard REST API
//!
//! HTTP API layer for the load lifecycle, built with Axum.
//!
//! # Endpoints
//!
//! ## Loads
//! - `GET /api/v1/loads?view&search&status&equipment` - List a view
//! - `GET /api/v1/loads/stats` - Dashboard counts
//! - `GET /api/v1/loads/:id` - Get a load
//! - `POST /api/v1/loads` - Create a load (JSON)
//! - `POST /api/v1/loads/upload` - Create a load with documents (multipart)
//! - `PATCH /api/v1/loads/:id` - Update status, location or driver
//! - `POST /api/v1/loads/:id/claim` - Claim a posted load
//!
//! ## Forms
//! - `POST /api/v1/forms/load/validate` - Validate wizard values
//!
//! ## Users
//! - `POST /api/v1/signup` - Register and send the welcome email
//! - `GET /api/v1/session` - Caller's auth state
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! Every request passes the auth gate first; see [`crate::auth`].
//!
//! # Example
//!
//! ```rust,ignore
//! use loadboard::api::{serve, AppState};
//! use loadboard::backend::{PocketBaseClient, PocketBaseConfig};
//! use loadboard::config::Config;
//! use loadboard::notify::NoopNotifier;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = Arc::new(PocketBaseClient::new(PocketBaseConfig::default())?);
//!
//!     let state = AppState::new(store, Arc::new(NoopNotifier), config);
//!     serve(state).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::auth::{auth_middleware, AuthGate};
use crate::config::ApiConfig;

/// Largest accepted upload body
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true)
}

/// GET anything unrouted
async fn not_found() -> ApiError {
    ApiError::NotFound("No such route".to_string())
}

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let gate = Arc::new(AuthGate::new(
        state.config.auth.clone(),
        state.users.clone(),
    ));
    let api_config = state.config.api.clone();

    let api_routes = Router::new()
        // Load routes
        .route("/loads", get(routes::loads::list_loads).post(routes::loads::create_load))
        .route("/loads/stats", get(routes::loads::load_stats))
        .route(
            "/loads/upload",
            post(routes::loads::upload_load).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/loads/:id",
            get(routes::loads::get_load).patch(routes::loads::update_load),
        )
        .route("/loads/:id/claim", post(routes::loads::claim_load))
        // Form routes
        .route("/forms/load/validate", post(routes::forms::validate_load_form))
        // User routes
        .route("/signup", post(routes::users::signup))
        .route("/session", get(routes::users::session));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(gate, auth_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(
            api_config.request_timeout_secs,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&api_config))
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Loadboard API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Loadboard API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
