//! Periodic stream refresh tests
//!
//! Covers:
//! - Refresh after the interval's worth of elapsed time
//! - Playing/Paused preserved across refresh
//! - Abandoning unfinished fetches
//! - Re-delivery per fetch generation
//! - One-shot resources never refresh

mod helpers;

use helpers::{play, Script, TestSession};
use nexus_common::events::{NexusEvent, PlaybackState};
use nexus_common::{AudioCommand, PlaybackHandle};
use nexus_peer::playback::SessionSettings;
use std::time::Duration;

const STEP: Duration = Duration::from_millis(400);

fn h(n: i32) -> PlaybackHandle {
    PlaybackHandle::new(n)
}

fn one_second_refresh(script: Script) -> TestSession {
    TestSession::build(
        SessionSettings {
            default_refresh_interval: Duration::from_secs(1),
            ..SessionSettings::default()
        },
        script,
    )
}

#[test]
fn test_refresh_resets_cursor_and_preserves_state() {
    let mut t = one_second_refresh(Script::Pending);
    t.send(play(1, "http://radio.example/live", true, false));

    t.session.tick(STEP);
    t.session.tick(STEP);
    let r = t.session.resource(h(1)).unwrap();
    assert_eq!(r.fetch_generation(), 1);
    assert_eq!(r.elapsed(), Duration::from_millis(800));

    t.session.tick(STEP);
    let r = t.session.resource(h(1)).unwrap();
    assert_eq!(r.fetch_generation(), 2);
    assert_eq!(r.elapsed(), Duration::ZERO);
    assert_eq!(r.state(), PlaybackState::Paused);

    assert_eq!(t.fetcher.begin_count(), 2);
    assert_eq!(t.fetcher.abandoned(), 1);
    assert_eq!(t.sink.closed(h(1)), 0);
}

#[test]
fn test_refresh_emits_event_with_generation() {
    let mut t = one_second_refresh(Script::Pending);
    t.send(play(1, "http://radio.example/live", true, true));
    for _ in 0..5 {
        t.session.tick(STEP);
    }

    let generations: Vec<u64> = t
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            NexusEvent::StreamRefreshed { generation, .. } => Some(generation),
            _ => None,
        })
        .collect();
    // 1.2s after three ticks, then 0.8s after two more
    assert_eq!(generations, vec![2]);
    assert_eq!(t.session.resource(h(1)).unwrap().state(), PlaybackState::Playing);
}

#[test]
fn test_each_generation_is_delivered_once() {
    let mut t = one_second_refresh(Script::ReadyAfter(1));
    t.send(play(1, "http://radio.example/live", true, true));

    t.session.tick(STEP);
    assert_eq!(t.sink.submitted(h(1)), 1);
    t.session.tick(STEP);
    assert_eq!(t.sink.submitted(h(1)), 1);

    // Refresh on the third tick starts generation 2, which completes at once
    t.session.tick(STEP);
    assert_eq!(t.sink.submitted(h(1)), 2);
    assert_eq!(t.fetcher.abandoned(), 0);
}

#[test]
fn test_one_shot_never_refreshes() {
    let mut t = one_second_refresh(Script::Pending);
    t.send(play(1, "http://cdn.example/horn.mp3", false, true));
    for _ in 0..20 {
        t.session.tick(STEP);
    }

    let r = t.session.resource(h(1)).unwrap();
    assert_eq!(r.fetch_generation(), 1);
    assert_eq!(r.elapsed(), Duration::ZERO);
    assert_eq!(t.fetcher.begin_count(), 1);
}

#[test]
fn test_set_interval_changes_period() {
    let mut t = TestSession::new();
    t.send(play(1, "http://radio.example/live", true, true));
    t.session.tick(STEP);
    t.send(AudioCommand::SetInterval { handle: h(1), seconds: 0.5 });

    // 0.4 + 0.4 crosses 0.5
    t.session.tick(STEP);
    assert_eq!(t.session.resource(h(1)).unwrap().fetch_generation(), 2);
}

#[test]
fn test_non_positive_interval_is_ignored() {
    let mut t = TestSession::new();
    t.send(play(1, "http://radio.example/live", true, true));
    t.tick();

    t.send(AudioCommand::SetInterval { handle: h(1), seconds: 0.0 });
    t.send(AudioCommand::SetInterval { handle: h(1), seconds: -3.0 });
    t.send(AudioCommand::SetInterval { handle: h(1), seconds: f32::NAN });

    assert_eq!(
        t.session.resource(h(1)).unwrap().refresh_interval(),
        Duration::from_secs(60)
    );
}
