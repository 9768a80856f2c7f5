//! HTTP server setup and routing
//!
//! Sets up the Axum server for the transport adapter and observability routes.

use crate::error::{Error, Result};
use crate::playback::engine::EngineHandle;
use crate::playback::spatial::SharedEntityDirectory;
use crate::state::SharedState;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub engine: EngineHandle,
    pub directory: SharedEntityDirectory,
    pub port: u16,
}

/// Build the router with all routes
pub fn build_router(ctx: AppContext) -> Router {
    Router::new()
        .route("/health", get(super::handlers::health))
        // Transport adapter: commands and session lifecycle
        .route("/commands", post(super::handlers::submit_command))
        .route("/session/disconnect", post(super::handlers::disconnect))
        // Entity directory feed
        .route(
            "/entities/:kind/:id",
            put(super::handlers::upsert_entity).delete(super::handlers::remove_entity),
        )
        .route("/listener", put(super::handlers::set_listener))
        // Observability
        .route("/session", get(super::handlers::session_snapshot))
        .route("/events", get(super::sse::event_stream))
        .with_state(ctx)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Run the HTTP server until `shutdown` resolves
pub async fn run<F>(ctx: AppContext, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = SocketAddr::from(([0, 0, 0, 0], ctx.port));
    let app = build_router(ctx);

    info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Http(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| Error::Http(format!("Server error: {}", e)))?;

    Ok(())
}
