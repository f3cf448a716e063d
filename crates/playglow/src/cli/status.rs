//! `status` subcommand — playback, light and config overview.

use std::path::Path;

use serde::Serialize;

use super::{Config, Result, kv, kv_width};
use playglow_lib::device::{LightDevice, open_device};
use playglow_lib::playback::{PlaybackSource, SpotifyPlayback};

#[derive(Serialize)]
struct StatusOutput {
    version: String,
    playback: Option<PlaybackJson>,
    light_color: Option<String>,
    config: ConfigSummaryJson,
}

#[derive(Serialize)]
struct PlaybackJson {
    device: Option<String>,
    active: bool,
    track: Option<String>,
}

#[derive(Serialize)]
struct ConfigSummaryJson {
    target_device: String,
    driver: String,
    cluster_count: usize,
    colorfulness_tolerance: f64,
    poll_interval_seconds: f64,
}

/// Query current playback. Returns `None` when there is no token, the poll
/// fails, or nothing is playing anywhere.
fn get_playback() -> Option<PlaybackJson> {
    let mut source = SpotifyPlayback::from_env().ok()?;
    let snapshot = source.snapshot().ok()??;
    Some(PlaybackJson {
        device: snapshot.device_name,
        active: snapshot.is_active,
        track: snapshot.track_id,
    })
}

/// Query the light's current color, if the device is reachable.
fn get_light_color(config: &Config) -> Option<String> {
    let mut device = open_device(config).ok()?;
    device.color().ok().map(|c| c.to_string())
}

pub(super) fn cmd_status(json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);

    let output = StatusOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        playback: get_playback(),
        light_color: get_light_color(&config),
        config: ConfigSummaryJson {
            target_device: config.target_device.clone(),
            driver: config.device.to_string(),
            cluster_count: config.cluster_count,
            colorfulness_tolerance: config.colorfulness_tolerance,
            poll_interval_seconds: config.poll_interval_seconds,
        },
    };

    if json {
        let body = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        println!("{body}");
        return Ok(());
    }

    println!("Playglow v{}", output.version);
    println!();

    let w = kv_width(&[
        "device",
        "active",
        "track",
        "color",
        "target_device",
        "driver",
        "clusters",
        "tolerance",
        "poll interval",
    ]);

    println!("Playback:");
    match &output.playback {
        Some(p) => {
            kv("device", p.device.as_deref().unwrap_or("(none)"), w);
            kv("active", if p.active { "yes" } else { "no" }, w);
            kv("track", p.track.as_deref().unwrap_or("(none)"), w);
        }
        None => kv("state", "unavailable (no session or no token)", w),
    }
    println!();

    println!("Light:");
    match &output.light_color {
        Some(color) => kv("color", color, w),
        None => kv("state", "unreachable", w),
    }
    println!();

    println!("Config:");
    kv(
        "target_device",
        if output.config.target_device.is_empty() {
            "(unset)"
        } else {
            output.config.target_device.as_str()
        },
        w,
    );
    kv("driver", &output.config.driver, w);
    kv("clusters", output.config.cluster_count, w);
    kv("tolerance", output.config.colorfulness_tolerance, w);
    kv(
        "poll interval",
        format!("{}s", output.config.poll_interval_seconds),
        w,
    );
    Ok(())
}
