//! Playback engine inbox tests
//!
//! Covers:
//! - Foreign senders being dropped before they take an inbox slot
//! - A full inbox dropping (and counting) authoritative commands
//! - Queued commands reaching the session once the engine runs

mod helpers;

use helpers::{envelope, foreign, play, TestSession};
use nexus_common::events::EventBus;
use nexus_common::CommandEnvelope;
use nexus_peer::playback::{EngineHandle, PlaybackEngine};
use nexus_peer::SharedState;
use std::sync::Arc;
use std::time::Duration;

/// Engine around a fresh test session, not yet spawned
fn engine_with_inbox(capacity: usize) -> (PlaybackEngine, EngineHandle, Arc<SharedState>) {
    let TestSession { session, router, .. } = TestSession::new();
    let state = Arc::new(SharedState::new(EventBus::new(16)));
    let (engine, handle) =
        PlaybackEngine::new(session, router, Duration::from_millis(5), capacity, Arc::clone(&state));
    (engine, handle, state)
}

async fn wait_for_resources(handle: &EngineHandle, expected: usize) -> usize {
    let mut count = 0;
    for _ in 0..100 {
        count = handle.snapshot().await.unwrap().resources.len();
        if count == expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    count
}

#[tokio::test]
async fn test_foreign_sender_cannot_fill_inbox() {
    let (engine, handle, state) = engine_with_inbox(1);

    let foreign_play = CommandEnvelope::new(foreign(), play(9, "http://evil.example/x.mp3", false, true));
    assert!(!handle.submit(foreign_play));
    assert!(handle.submit(envelope(play(1, "http://cdn.example/a.mp3", false, true))));
    assert_eq!(state.dropped_commands(), 0);

    let task = engine.spawn();
    assert_eq!(wait_for_resources(&handle, 1).await, 1);
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.resources[0].handle, nexus_common::PlaybackHandle::new(1));

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}

#[tokio::test]
async fn test_full_inbox_drops_and_counts() {
    let (engine, handle, state) = engine_with_inbox(1);

    assert!(handle.submit(envelope(play(1, "http://cdn.example/a.mp3", false, true))));
    assert!(!handle.submit(envelope(play(2, "http://cdn.example/b.mp3", false, true))));
    assert_eq!(state.dropped_commands(), 1);

    let task = engine.spawn();
    assert_eq!(wait_for_resources(&handle, 1).await, 1);

    handle.shutdown().await.unwrap();
    task.await.unwrap();
}
