//! Integration tests: end-to-end sync scenarios using the scripted playback
//! source and the mock light.
//!
//! These exercise the full poll → decide → extract → fade cycle through the
//! public API, verifying how many transitions and off-writes a given
//! snapshot sequence produces.

use std::time::Duration;

use playglow_lib::color::Rgb;
use playglow_lib::device::mock::MockLight;
use playglow_lib::extract::ExtractOptions;
use playglow_lib::playback::mock::{
    ArtworkScript, ScriptedPlayback, active_snapshot, inactive_snapshot,
};
use playglow_lib::sync::{SyncEngine, SyncTuning, TickReport};

const TARGET: &str = "Living Room";

fn tuning() -> SyncTuning {
    SyncTuning {
        extract: ExtractOptions {
            cluster_count: 2,
            colorfulness_tolerance: 0.0,
            resize_to: None,
        },
        transition_steps: 5,
        transition_delay: Duration::ZERO,
    }
}

fn solid(color: Rgb) -> ArtworkScript {
    ArtworkScript::Solid {
        color,
        width: 8,
        height: 8,
    }
}

// ── Canonical playback session ──

#[test]
fn inactive_a_a_b_inactive_triggers_two_fades_and_one_off() {
    let mut source = ScriptedPlayback::new();
    source.push_snapshot(inactive_snapshot(TARGET));
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://a")));
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://a")));
    source.push_snapshot(active_snapshot(TARGET, "track-b", Some("art://b")));
    source.push_snapshot(inactive_snapshot(TARGET));
    source.set_artwork("art://a", solid(Rgb::new(220, 30, 30)));
    source.set_artwork("art://b", solid(Rgb::new(30, 30, 220)));

    let mut engine = SyncEngine::new(source, MockLight::new(), TARGET, tuning());

    let reports: Vec<TickReport> = (0..5).map(|_| engine.tick()).collect();

    assert_eq!(reports[0], TickReport::Idle, "device starts dark");
    assert!(matches!(reports[1], TickReport::Synced { .. }), "enter A");
    assert_eq!(reports[2], TickReport::Idle, "A repeat is a no-op");
    assert!(matches!(reports[3], TickReport::Synced { .. }), "switch to B");
    assert_eq!(reports[4], TickReport::Darkened, "session ends");

    let dev = engine.device();
    assert_eq!(dev.transitions.len(), 2, "exactly two fades");
    assert_eq!(dev.transitions[0].last(), Some(&Rgb::new(220, 30, 30)));
    assert_eq!(dev.transitions[1].last(), Some(&Rgb::new(30, 30, 220)));
    // The B fade starts where the A fade ended.
    assert_eq!(dev.transitions[1].first(), Some(&Rgb::new(220, 30, 30)));
    assert_eq!(dev.off_writes(), 1, "exactly one go-dark write");

    // Only the two distinct songs hit the artwork endpoint.
    assert_eq!(
        *engine.source().artwork_requests.borrow(),
        vec!["art://a".to_string(), "art://b".to_string()]
    );
}

// ── Poll failures ──

#[test]
fn three_failed_polls_keep_the_loop_alive_and_dark_the_light() {
    let mut source = ScriptedPlayback::new();
    source.push_failure("connection reset");
    source.push_failure("connection reset");
    source.push_failure("connection reset");

    let mut engine = SyncEngine::new(
        source,
        MockLight::with_color(Rgb::new(90, 0, 90)),
        TARGET,
        tuning(),
    );

    // First failing tick turns the lit device off …
    assert_eq!(engine.tick(), TickReport::Darkened);
    assert_eq!(engine.device().off_writes(), 1);

    // … and the remaining failures are quiet no-ops, not crashes.
    assert_eq!(engine.tick(), TickReport::Idle);
    assert_eq!(engine.tick(), TickReport::Idle);
    assert_eq!(engine.device().off_writes(), 1);
}

#[test]
fn recovery_after_failed_polls_syncs_again() {
    let mut source = ScriptedPlayback::new();
    source.push_failure("timeout");
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://a")));
    source.set_artwork("art://a", solid(Rgb::new(10, 200, 10)));

    let mut engine = SyncEngine::new(source, MockLight::new(), TARGET, tuning());

    engine.tick();
    let report = engine.tick();
    assert_eq!(
        report,
        TickReport::Synced {
            track: "track-a".into(),
            color: Rgb::new(10, 200, 10),
        }
    );
}

// ── Artwork fallback ──

#[test]
fn artwork_failure_on_song_change_fades_to_white() {
    let mut source = ScriptedPlayback::new();
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://broken")));
    source.set_artwork("art://broken", ArtworkScript::Unavailable);

    let mut engine = SyncEngine::new(source, MockLight::new(), TARGET, tuning());

    assert_eq!(
        engine.tick(),
        TickReport::Synced {
            track: "track-a".into(),
            color: Rgb::WHITE,
        }
    );
    let dev = engine.device();
    assert_eq!(dev.transitions.len(), 1, "device must not be left unchanged");
    assert_eq!(dev.transitions[0].last(), Some(&Rgb::WHITE));
}

// ── Device gating ──

#[test]
fn playback_on_another_device_keeps_the_light_dark() {
    let mut source = ScriptedPlayback::new();
    source.push_snapshot(active_snapshot("Kitchen", "track-a", Some("art://a")));
    source.push_snapshot(active_snapshot("Kitchen", "track-b", Some("art://b")));

    let mut engine = SyncEngine::new(source, MockLight::new(), TARGET, tuning());

    assert_eq!(engine.tick(), TickReport::Idle);
    assert_eq!(engine.tick(), TickReport::Idle);
    assert!(engine.device().transitions.is_empty());
    assert!(engine.device().writes.is_empty());
}

#[test]
fn song_reentry_after_dark_gap_triggers_a_fresh_fade() {
    let mut source = ScriptedPlayback::new();
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://a")));
    source.push_snapshot(inactive_snapshot(TARGET));
    source.push_snapshot(active_snapshot(TARGET, "track-a", Some("art://a")));
    source.set_artwork("art://a", solid(Rgb::new(200, 120, 0)));

    let mut engine = SyncEngine::new(source, MockLight::new(), TARGET, tuning());

    assert!(matches!(engine.tick(), TickReport::Synced { .. }));
    assert_eq!(engine.tick(), TickReport::Darkened);
    // Same song again after the gap: the light was dark, so fade again.
    assert!(matches!(engine.tick(), TickReport::Synced { .. }));
    assert_eq!(engine.device().transitions.len(), 2);
}
