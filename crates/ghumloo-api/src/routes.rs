//! Router setup and server startup.

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ghumloo_core::config::GeneralConfig;
use ghumloo_core::error::GhumlooError;

use crate::error::panic_response;
use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/health", get(handlers::health))
        .route("/sessions/{id}", delete(handlers::delete_session))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind to `host:port` from the config and serve until the process exits.
pub async fn start_server(config: &GeneralConfig, state: AppState) -> Result<(), GhumlooError> {
    let addr = format!("{}:{}", config.host, config.port);
    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GhumlooError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, router)
        .await
        .map_err(|e| GhumlooError::Api(format!("Server error: {}", e)))?;

    Ok(())
}
