//! Integration tests for the nexus-peer HTTP adapter
//!
//! Tests the complete API surface including:
//! - Health checks
//! - Command submission, authorized and not
//! - Session disconnect and replacement
//! - Entity directory feed
//! - Session snapshots

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use helpers::{RecordingSink, Script, ScriptedFetcher};
use nexus_peer::api::build_router;
use nexus_peer::config::PeerConfig;
use nexus_peer::{PeerComponents, RunningPeer};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const AUTHORITY: &str = "42";

/// Test helper to start a peer with scripted collaborators
fn setup_test_peer() -> (axum::Router, RunningPeer) {
    let config = PeerConfig::from_toml_str(
        "authority_id = 42\n\n[scheduler]\ntick_rate_hz = 200\n",
    )
    .unwrap();

    let components = PeerComponents::from_config(&config)
        .unwrap()
        .with_fetcher(Box::new(ScriptedFetcher::new(Script::Pending)))
        .with_sink(Box::new(RecordingSink::new()));
    let peer = components.start(&config);
    let router = build_router(peer.app_context());
    (router, peer)
}

/// Helper function to make HTTP requests to the test router
async fn make_request(
    app: &axum::Router,
    method: Method,
    path: &str,
    sender: Option<&str>,
    body: Option<String>,
) -> (StatusCode, Option<Value>) {
    let mut request = Request::builder().method(method).uri(path);
    if let Some(sender) = sender {
        request = request.header("x-nexus-sender", sender);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let json_body = if body.is_empty() {
        None
    } else {
        serde_json::from_slice(&body).ok()
    };
    (status, json_body)
}

async fn send_command(app: &axum::Router, sender: Option<&str>, command: Value) -> StatusCode {
    make_request(app, Method::POST, "/commands", sender, Some(command.to_string())).await.0
}

async fn session(app: &axum::Router) -> Value {
    let (status, body) = make_request(app, Method::GET, "/session", None, None).await;
    assert_eq!(status, StatusCode::OK);
    body.expect("Expected snapshot body")
}

/// Poll the snapshot until `pred` holds
async fn wait_for(app: &axum::Router, pred: impl Fn(&Value) -> bool) -> Value {
    for _ in 0..100 {
        let snapshot = session(app).await;
        if pred(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("Condition not reached; last snapshot: {}", session(app).await);
}

/// Let the engine run a few ticks
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _peer) = setup_test_peer();

    let (status, body) = make_request(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let body = body.expect("Expected response body");
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["module"], "nexus-peer");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_authorized_play_materializes() {
    let (app, _peer) = setup_test_peer();

    let status = send_command(
        &app,
        Some(AUTHORITY),
        json!({ "command": "play", "url": "http://cdn.example/a.mp3", "handle": 1, "is_stream": false }),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let snapshot = wait_for(&app, |s| s["resources"].as_array().map_or(false, |r| r.len() == 1)).await;
    assert_eq!(snapshot["resources"][0]["handle"], 1);
    assert_eq!(snapshot["resources"][0]["url"], "http://cdn.example/a.mp3");
    assert_eq!(snapshot["resources"][0]["state"], "playing");
}

#[tokio::test]
async fn test_rejected_requests_still_accepted() {
    let (app, _peer) = setup_test_peer();
    let play = json!({ "command": "play", "url": "http://cdn.example/a.mp3", "handle": 1, "is_stream": false });

    // Wrong sender, missing sender, unparseable sender, unreadable body
    assert_eq!(send_command(&app, Some("7"), play.clone()).await, StatusCode::ACCEPTED);
    assert_eq!(send_command(&app, None, play.clone()).await, StatusCode::ACCEPTED);
    assert_eq!(send_command(&app, Some("server"), play.clone()).await, StatusCode::ACCEPTED);
    let (status, _) = make_request(
        &app,
        Method::POST,
        "/commands",
        Some(AUTHORITY),
        Some("{ not json".to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);

    settle().await;
    let snapshot = session(&app).await;
    assert_eq!(snapshot["resources"].as_array().unwrap().len(), 0);
    assert_eq!(snapshot["queued"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_disconnect_replaces_session() {
    let (app, _peer) = setup_test_peer();
    let before = session(&app).await;

    for handle in 1..=3 {
        send_command(
            &app,
            Some(AUTHORITY),
            json!({ "command": "play", "url": "http://cdn.example/a.mp3", "handle": handle, "is_stream": false }),
        )
        .await;
    }
    wait_for(&app, |s| s["resources"].as_array().map_or(false, |r| r.len() == 3)).await;

    let (status, _) =
        make_request(&app, Method::POST, "/session/disconnect", None, None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let after = session(&app).await;
    assert_ne!(after["session_id"], before["session_id"]);
    assert_eq!(after["resources"].as_array().unwrap().len(), 0);
    assert_eq!(after["queued"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_entity_feed_and_attachment() {
    let (app, _peer) = setup_test_peer();

    let (status, _) = make_request(
        &app,
        Method::PUT,
        "/entities/vehicle/12",
        None,
        Some(json!({ "position": { "x": 10.0, "y": 0.0, "z": 0.0 } }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    send_command(
        &app,
        Some(AUTHORITY),
        json!({ "command": "play", "url": "http://cdn.example/engine.ogg", "handle": 1, "is_stream": false }),
    )
    .await;
    wait_for(&app, |s| s["resources"].as_array().map_or(false, |r| r.len() == 1)).await;

    send_command(&app, Some(AUTHORITY), json!({ "command": "attach_to_vehicle", "handle": 1, "vehicle_id": 12 })).await;
    send_command(
        &app,
        Some(AUTHORITY),
        json!({ "command": "set_position", "handle": 1, "position": { "x": 1.0, "y": 0.0, "z": 0.0 } }),
    )
    .await;

    let snapshot = wait_for(&app, |s| s["resources"][0]["position_mode"] == "local").await;
    assert_eq!(snapshot["resources"][0]["world_position"]["x"], 11.0);
    assert_eq!(snapshot["resources"][0]["attachment"]["kind"], "vehicle");
    assert_eq!(snapshot["resources"][0]["attachment"]["id"], 12);
}

#[tokio::test]
async fn test_entity_routes_validate() {
    let (app, _peer) = setup_test_peer();
    let body = json!({ "position": { "x": 0.0, "y": 0.0, "z": 0.0 } }).to_string();

    let (status, _) =
        make_request(&app, Method::PUT, "/entities/boat/1", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = make_request(&app, Method::DELETE, "/entities/player/5", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
        make_request(&app, Method::PUT, "/entities/player/5", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = make_request(&app, Method::DELETE, "/entities/player/5", None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = make_request(&app, Method::PUT, "/listener", None, Some(body)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_shutdown_stops_engine() {
    let (app, peer) = setup_test_peer();
    send_command(
        &app,
        Some(AUTHORITY),
        json!({ "command": "play", "url": "http://cdn.example/a.mp3", "handle": 1, "is_stream": false }),
    )
    .await;

    peer.engine.shutdown().await.unwrap();
    peer.task.await.unwrap();

    let (status, _) = make_request(&app, Method::GET, "/session", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
