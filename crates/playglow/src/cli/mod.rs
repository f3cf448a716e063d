//! CLI subcommands — sync loop, manual light control, status.

mod color;
mod config_cmd;
mod status;
mod swatch;
mod sync;

use std::path::{Path, PathBuf};

use clap::Subcommand;

pub(super) use crate::RUNNING;
pub(super) use playglow_lib::color::parse_color;
pub(super) use playglow_lib::config::Config;
pub(super) use playglow_lib::error::Result;

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
pub(super) fn kv_width(keys: &[&str]) -> usize {
    keys.iter().map(|k| k.len()).max().unwrap_or(0) + PADDING
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w);
}

/// Load the config from an explicit path or the platform default,
/// logging any parse warnings.
pub(super) fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(p) => {
            let (config, warnings) = Config::load_from(p);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Follow the configured playback device and color the light (Ctrl+C stops)
    Sync,

    /// Set the light to a fixed color
    Color {
        /// Color to apply — hex like "#FF8800" or a name like "red"
        color: String,
        /// Fade from the current color over this many steps instead of
        /// switching instantly
        #[arg(long, value_name = "STEPS")]
        fade: Option<usize>,
    },

    /// Turn the light off
    Off,

    /// Show playback, light and config status
    Status,

    /// Print the dominant color of a local image file
    Swatch {
        /// Path to the image
        image: PathBuf,
        /// Also list every cluster with its weight and colorfulness
        #[arg(long)]
        clusters: bool,
    },

    /// Show the resolved configuration
    Config,
}

pub fn run(command: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Sync => sync::cmd_sync(config_path),
        Command::Color { color, fade } => color::cmd_color(&color, fade, config_path),
        Command::Off => color::cmd_off(config_path),
        Command::Status => status::cmd_status(json, config_path),
        Command::Swatch { image, clusters } => {
            swatch::cmd_swatch(&image, clusters, json, config_path)
        }
        Command::Config => config_cmd::cmd_config(json, config_path),
    }
}
