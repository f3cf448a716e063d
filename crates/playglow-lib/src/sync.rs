//! Sync state machine — testable playback-to-light logic decoupled from I/O.
//!
//! [`TrackWatcher`] encapsulates the per-tick decision: has the session gone
//! dark, did the song change, or is there nothing new. [`SyncEngine`] wires a
//! playback source and a light device around it and runs the polling loop;
//! front-ends become thin adapters that print what the engine reports.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::color::Rgb;
use crate::config::Config;
use crate::device::LightDevice;
use crate::extract::{self, ExtractOptions};
use crate::playback::{PlaybackSnapshot, PlaybackSource};
use crate::transition;

/// Granularity at which the inter-tick sleep checks the stop flag.
const STOP_POLL_SLICE: Duration = Duration::from_millis(50);

/// Decision for one poll tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// A different track is playing on the target device (including the
    /// first active observation) — run the color pipeline.
    Sync(String),
    /// No snapshot, wrong device, or inactive — the light should be dark.
    Dark,
    /// Same track as last tick, nothing to do.
    Idle,
}

/// Tracks which song the light currently shows and decides per tick
/// whether anything changed.
pub struct TrackWatcher {
    target_device: String,
    current_track: Option<String>,
}

impl TrackWatcher {
    pub fn new(target_device: impl Into<String>) -> Self {
        TrackWatcher {
            target_device: target_device.into(),
            current_track: None,
        }
    }

    /// Feed one poll's snapshot. Returns the action to take.
    ///
    /// A [`SyncAction::Sync`] does NOT advance the remembered track by
    /// itself — call [`mark_synced`](Self::mark_synced) once the transition
    /// has actually been issued, so a failed tick retries on the next poll.
    pub fn update(&mut self, snapshot: Option<&PlaybackSnapshot>) -> SyncAction {
        let Some(snap) = snapshot else {
            self.current_track = None;
            return SyncAction::Dark;
        };
        let on_target = snap.device_name.as_deref() == Some(self.target_device.as_str());
        if !on_target || !snap.is_active {
            self.current_track = None;
            return SyncAction::Dark;
        }
        match &snap.track_id {
            Some(id) if self.current_track.as_deref() != Some(id.as_str()) => {
                SyncAction::Sync(id.clone())
            }
            // Active session without a usable track id has nothing to key on.
            _ => SyncAction::Idle,
        }
    }

    /// Remember `track_id` as the song the light now shows.
    pub fn mark_synced(&mut self, track_id: &str) {
        self.current_track = Some(track_id.to_string());
    }

    /// The track the light currently shows, if any.
    pub fn current_track(&self) -> Option<&str> {
        self.current_track.as_deref()
    }
}

/// Tunables the engine needs per tick.
#[derive(Debug, Clone)]
pub struct SyncTuning {
    pub extract: ExtractOptions,
    pub transition_steps: usize,
    pub transition_delay: Duration,
}

impl SyncTuning {
    pub fn from_config(config: &Config) -> Self {
        SyncTuning {
            extract: config.extract_options(),
            transition_steps: config.transition_steps.max(1),
            transition_delay: config.transition_delay(),
        }
    }
}

impl Default for SyncTuning {
    fn default() -> Self {
        SyncTuning::from_config(&Config::default())
    }
}

/// What one tick did, for front-ends and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// A song change was handled: the device faded to `color`.
    Synced { track: String, color: Rgb },
    /// The session went dark and the device was turned off.
    Darkened,
    /// Nothing happened this tick.
    Idle,
}

/// Polls a playback source and drives a light device.
///
/// The engine owns the device exclusively for as long as it exists; within a
/// tick everything runs strictly sequentially, so no two transitions are
/// ever in flight at once.
pub struct SyncEngine<S, D> {
    source: S,
    device: D,
    watcher: TrackWatcher,
    tuning: SyncTuning,
}

impl<S: PlaybackSource, D: LightDevice> SyncEngine<S, D> {
    pub fn new(source: S, device: D, target_device: impl Into<String>, tuning: SyncTuning) -> Self {
        SyncEngine {
            source,
            device,
            watcher: TrackWatcher::new(target_device),
            tuning,
        }
    }

    /// Build an engine with watcher and tuning taken from the config.
    pub fn from_config(source: S, device: D, config: &Config) -> Self {
        Self::new(
            source,
            device,
            config.target_device.clone(),
            SyncTuning::from_config(config),
        )
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// The track the light currently shows, if any.
    pub fn current_track(&self) -> Option<&str> {
        self.watcher.current_track()
    }

    /// Run one poll cycle: fetch a snapshot, decide, act.
    ///
    /// Never fails — every error is logged and degrades to a quieter
    /// behavior (skipped tick, fallback color), so the loop can run
    /// indefinitely.
    pub fn tick(&mut self) -> TickReport {
        let snapshot = match self.source.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                // A single failed poll reads as "nothing playing".
                log::warn!("playback poll failed: {e}");
                None
            }
        };

        match self.watcher.update(snapshot.as_ref()) {
            SyncAction::Dark => self.go_dark(),
            SyncAction::Sync(track) => {
                let artwork_url = snapshot.as_ref().and_then(|s| s.artwork_url.as_deref());
                self.sync_track(track, artwork_url)
            }
            SyncAction::Idle => TickReport::Idle,
        }
    }

    /// Turn the device off if it is still lit. Going dark needs no fade.
    fn go_dark(&mut self) -> TickReport {
        match self.device.color() {
            Ok(color) if color.is_off() => TickReport::Idle,
            Ok(_) => match self.device.turn_off() {
                Ok(()) => {
                    log::info!("playback stopped, light off");
                    TickReport::Darkened
                }
                Err(e) => {
                    log::warn!("could not turn light off: {e}");
                    TickReport::Idle
                }
            },
            Err(e) => {
                log::warn!("could not read light state: {e}");
                TickReport::Idle
            }
        }
    }

    /// Run the color pipeline for a song change.
    fn sync_track(&mut self, track: String, artwork_url: Option<&str>) -> TickReport {
        let target = match artwork_url {
            Some(url) => match self.source.artwork(url) {
                Ok(artwork) => match extract::dominant_color(&artwork, &self.tuning.extract) {
                    Ok(color) => color,
                    Err(e) => {
                        // Keep the previous color; the next tick retries.
                        log::warn!("color extraction failed for {track}: {e}");
                        return TickReport::Idle;
                    }
                },
                Err(e) => {
                    log::info!("artwork unavailable for {track}, using white: {e}");
                    Rgb::WHITE
                }
            },
            None => {
                log::info!("no artwork for {track}, using white");
                Rgb::WHITE
            }
        };

        let from = match self.device.color() {
            Ok(color) => color,
            Err(e) => {
                log::warn!("could not read light state, fading from off: {e}");
                Rgb::OFF
            }
        };

        let plan = transition::plan(from, target, self.tuning.transition_steps);
        match self
            .device
            .apply_transition(&plan, self.tuning.transition_delay)
        {
            Ok(()) => {
                self.watcher.mark_synced(&track);
                log::info!("now showing {track} as {target}");
                TickReport::Synced {
                    track,
                    color: target,
                }
            }
            Err(e) => {
                // Not marked as synced, so the next poll retries this track.
                log::warn!("could not apply transition for {track}: {e}");
                TickReport::Idle
            }
        }
    }

    /// The polling loop: tick, sleep, repeat until `stop` is raised.
    ///
    /// The sleep checks the stop flag every few milliseconds so a stop
    /// request interrupts between ticks promptly. As a terminal action the
    /// device is driven dark — the fixture never stays lit after a stop.
    pub fn run(&mut self, poll_interval: Duration, stop: &AtomicBool) {
        while !stop.load(Ordering::SeqCst) {
            self.tick();
            sleep_until_stopped(poll_interval, stop);
        }
        if let Err(e) = self.device.turn_off() {
            log::warn!("could not turn light off on stop: {e}");
        }
    }
}

/// Sleep `total`, waking early when `stop` is raised.
fn sleep_until_stopped(total: Duration, stop: &AtomicBool) {
    let mut remaining = total;
    while !stop.load(Ordering::SeqCst) && !remaining.is_zero() {
        let slice = remaining.min(STOP_POLL_SLICE);
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}

// ── Loop ownership handle ──

/// Ownership handle for a running sync loop.
///
/// Returned by [`SyncHandle::start`]. The engine — and with it the light
/// device — belongs to the background thread until [`stop`](SyncHandle::stop)
/// hands it back, which makes exclusive device access structural: whoever
/// wants the device next must stop the loop first. Dropping the handle
/// without stopping detaches the loop.
pub struct SyncHandle<S, D> {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<SyncEngine<S, D>>,
}

impl<S, D> SyncHandle<S, D>
where
    S: PlaybackSource + Send + 'static,
    D: LightDevice + 'static,
{
    /// Spawn the polling loop on a background thread.
    pub fn start(mut engine: SyncEngine<S, D>, poll_interval: Duration) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = std::thread::spawn(move || {
            engine.run(poll_interval, &flag);
            engine
        });
        SyncHandle { stop, thread }
    }

    /// Request a stop, wait for the loop to finish, and hand the engine
    /// (and its device) back to the caller.
    ///
    /// Returns `None` only if the loop thread panicked.
    pub fn stop(self) -> Option<SyncEngine<S, D>> {
        self.stop.store(true, Ordering::SeqCst);
        self.thread.join().ok()
    }

    /// Whether the loop thread has already exited.
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}
