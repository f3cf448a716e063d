//! `config` subcommand — show current configuration and file paths.

use std::path::Path;

use serde::Serialize;

use super::{Config, Result, kv, kv_width};
use playglow_lib::device::DeviceKind;

#[derive(Serialize)]
struct ConfigOutput {
    config_file: Option<String>,
    config_file_exists: bool,
    settings: Config,
    problems: Vec<String>,
}

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().map(|p| p.exists()).unwrap_or(false);

    let problems: Vec<String> = match config.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            problems,
        };
        let body = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        println!("{body}");
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(&[
        "target_device:",
        "cluster_count:",
        "colorfulness_tolerance:",
        "artwork_resize:",
        "poll_interval_seconds:",
        "transition_steps:",
        "transition_delay_seconds:",
        "device:",
        "endpoint:",
    ]);

    match &config_path {
        Some(p) if config_exists => println!("Config file: {} (loaded)", p.display()),
        Some(p) => println!("Config file: {} (not found, using defaults)", p.display()),
        None => println!("Config file: (no config directory)"),
    }
    println!();

    println!("Settings:");
    kv(
        "target_device:",
        if config.target_device.is_empty() {
            "(unset)"
        } else {
            config.target_device.as_str()
        },
        w,
    );
    kv("cluster_count:", config.cluster_count, w);
    kv("colorfulness_tolerance:", config.colorfulness_tolerance, w);
    kv(
        "artwork_resize:",
        format!("{}x{}", config.artwork_resize[0], config.artwork_resize[1]),
        w,
    );
    kv("poll_interval_seconds:", config.poll_interval_seconds, w);
    kv("transition_steps:", config.transition_steps, w);
    kv(
        "transition_delay_seconds:",
        config.transition_delay_seconds,
        w,
    );
    kv("device:", config.device, w);
    let endpoint = match config.device {
        DeviceKind::Pwm => format!(
            "{}:{} (pins {}/{}/{})",
            config.pwm.host,
            config.pwm.port,
            config.pwm.red_pin,
            config.pwm.green_pin,
            config.pwm.blue_pin
        ),
        DeviceKind::PixelStrip => {
            format!("{} ({} LEDs)", config.strip.address, config.strip.led_count)
        }
        DeviceKind::Wled => config.wled.url.clone(),
    };
    kv("endpoint:", endpoint, w);

    if !problems.is_empty() {
        println!();
        println!("Problems:");
        for p in &problems {
            println!("  - {p}");
        }
    }
    Ok(())
}
