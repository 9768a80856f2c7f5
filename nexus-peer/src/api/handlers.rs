//! HTTP request handlers
//!
//! Command submission is fire-and-forget: `POST /commands` answers 202 whether
//! the command was accepted, unauthorized, or unreadable, so a remote caller
//! learns nothing about session state from the response.

use crate::api::sender::CommandSender;
use crate::api::server::AppContext;
use crate::playback::session::SessionSnapshot;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use nexus_common::spatial::{EntityKind, EntityRef, Transform};
use nexus_common::{AudioCommand, CommandEnvelope};
use serde::Serialize;
use tracing::{debug, error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
    ticks: u64,
    dropped_commands: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

type ApiError = (StatusCode, Json<StatusResponse>);

fn api_error(code: StatusCode, status: impl Into<String>) -> ApiError {
    (code, Json(StatusResponse { status: status.into() }))
}

fn engine_unavailable(e: crate::error::Error) -> ApiError {
    error!("Engine request failed: {}", e);
    api_error(StatusCode::SERVICE_UNAVAILABLE, format!("error: {}", e))
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health(State(ctx): State<AppContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "nexus-peer".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ticks: ctx.state.ticks(),
        dropped_commands: ctx.state.dropped_commands(),
    })
}

// ============================================================================
// Transport Adapter
// ============================================================================

/// POST /commands - Deliver one command from the transport
pub async fn submit_command(
    State(ctx): State<AppContext>,
    CommandSender(sender): CommandSender,
    body: Bytes,
) -> StatusCode {
    let Some(sender) = sender else {
        debug!("Command without sender identity dropped");
        return StatusCode::ACCEPTED;
    };

    match serde_json::from_slice::<AudioCommand>(&body) {
        Ok(command) => {
            ctx.engine.submit(CommandEnvelope::new(sender, command));
        }
        Err(e) => debug!("Unreadable command from {} dropped: {}", sender, e),
    }
    StatusCode::ACCEPTED
}

/// POST /session/disconnect - The authority's connection ended
pub async fn disconnect(State(ctx): State<AppContext>) -> Result<StatusCode, ApiError> {
    info!("Authority disconnected");
    ctx.engine.disconnect().await.map_err(engine_unavailable)?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /session - Snapshot of the current session
pub async fn session_snapshot(
    State(ctx): State<AppContext>,
) -> Result<Json<SessionSnapshot>, ApiError> {
    let snapshot = ctx.engine.snapshot().await.map_err(engine_unavailable)?;
    Ok(Json(snapshot))
}

// ============================================================================
// Entity Directory Feed
// ============================================================================

fn entity_ref(kind: &str, id: u64) -> Result<EntityRef, ApiError> {
    let kind = kind
        .parse::<EntityKind>()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("error: {}", e)))?;
    Ok(EntityRef { kind, id })
}

/// PUT /entities/:kind/:id - Create or move an entity
pub async fn upsert_entity(
    State(ctx): State<AppContext>,
    Path((kind, id)): Path<(String, u64)>,
    Json(transform): Json<Transform>,
) -> Result<StatusCode, ApiError> {
    let target = entity_ref(&kind, id)?;
    ctx.directory.upsert(target, transform);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /entities/:kind/:id - Entity left the world
pub async fn remove_entity(
    State(ctx): State<AppContext>,
    Path((kind, id)): Path<(String, u64)>,
) -> Result<StatusCode, ApiError> {
    let target = entity_ref(&kind, id)?;
    if ctx.directory.remove(target) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("error: {} not found", target)))
    }
}

/// PUT /listener - Local listener transform
pub async fn set_listener(
    State(ctx): State<AppContext>,
    Json(transform): Json<Transform>,
) -> StatusCode {
    ctx.directory.set_listener(transform);
    StatusCode::NO_CONTENT
}
