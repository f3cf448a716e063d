//! `sync` subcommand — run the playback-to-light loop.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::{RUNNING, Result};
use playglow_lib::PlayglowError;
use playglow_lib::device::{LightDevice, open_device};
use playglow_lib::playback::SpotifyPlayback;
use playglow_lib::sync::{SyncEngine, TickReport};

pub(super) fn cmd_sync(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    if let Err(errors) = config.validate() {
        for e in &errors {
            log::warn!("[config] {e}");
        }
        if config.target_device.trim().is_empty() {
            return Err(PlayglowError::Config(
                "no target_device configured — set one in playglow.toml".into(),
            ));
        }
    }

    let source = SpotifyPlayback::from_env()?;
    let device = open_device(&config)?;

    println!(
        "Playglow — follows \"{}\" and colors the {} light.",
        config.target_device, config.device
    );
    println!("Press Ctrl+C to exit (turns the light off).");
    println!();

    let poll_interval = config.poll_interval();
    let mut engine = SyncEngine::from_config(source, device, &config);

    while RUNNING.load(Ordering::SeqCst) {
        match engine.tick() {
            TickReport::Synced { track, color } => println!("  {track} -> {color}"),
            TickReport::Darkened => println!("  (inactive) -> off"),
            TickReport::Idle => {}
        }
        sleep_while_running(poll_interval);
    }

    println!();
    println!("Turning light off...");
    if let Err(e) = engine.device_mut().turn_off() {
        log::warn!("could not turn light off: {e}");
    }
    println!("Done.");
    Ok(())
}

/// Sleep the poll interval in slices so Ctrl+C interrupts promptly.
fn sleep_while_running(total: Duration) {
    let mut remaining = total;
    while RUNNING.load(Ordering::SeqCst) && !remaining.is_zero() {
        let slice = remaining.min(Duration::from_millis(50));
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
}
