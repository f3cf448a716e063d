//! Application configuration — TOML-based, platform-aware paths.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::device::DeviceKind;
use crate::extract::ExtractOptions;

/// Header comment prepended to saved config files.
const CONFIG_HEADER: &str =
    "# Playglow configuration — changes made outside the app may be overwritten.\n\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Playback device that gates syncing. The loop only reacts while this
    /// device is the session's active one; empty matches nothing.
    #[serde(default)]
    pub target_device: String,

    /// Number of clusters formed over the artwork.
    #[serde(default = "default_cluster_count")]
    pub cluster_count: usize,

    /// Minimum colorfulness a cluster must reach before the extraction
    /// falls back to neutral gray. 0 accepts anything.
    #[serde(default)]
    pub colorfulness_tolerance: f64,

    /// Artwork is resampled to this [width, height] before clustering.
    #[serde(default = "default_artwork_resize")]
    pub artwork_resize: [u32; 2],

    /// Seconds between playback polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: f64,

    /// Number of colors in a fade.
    #[serde(default = "default_transition_steps")]
    pub transition_steps: usize,

    /// Seconds between fade steps.
    #[serde(default = "default_transition_delay")]
    pub transition_delay_seconds: f64,

    /// Which driver talks to the fixture.
    #[serde(default)]
    pub device: DeviceKind,

    /// Parameters for the `pwm` driver.
    #[serde(default)]
    pub pwm: PwmParams,

    /// Parameters for the `pixel-strip` driver.
    #[serde(default)]
    pub strip: StripParams,

    /// Parameters for the `wled` driver.
    #[serde(default)]
    pub wled: WledParams,
}

fn default_cluster_count() -> usize {
    8
}
fn default_artwork_resize() -> [u32; 2] {
    [100, 100]
}
fn default_poll_interval() -> f64 {
    2.0
}
fn default_transition_steps() -> usize {
    40
}
fn default_transition_delay() -> f64 {
    0.05
}

impl Default for Config {
    fn default() -> Self {
        Config {
            target_device: String::new(),
            cluster_count: default_cluster_count(),
            colorfulness_tolerance: 0.0,
            artwork_resize: default_artwork_resize(),
            poll_interval_seconds: default_poll_interval(),
            transition_steps: default_transition_steps(),
            transition_delay_seconds: default_transition_delay(),
            device: DeviceKind::default(),
            pwm: PwmParams::default(),
            strip: StripParams::default(),
            wled: WledParams::default(),
        }
    }
}

// ── Driver parameter tables ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PwmParams {
    /// Host running the pigpio daemon.
    #[serde(default = "default_pwm_host")]
    pub host: String,
    /// pigpiod port.
    #[serde(default = "default_pwm_port")]
    pub port: u16,
    /// GPIO pin of the red channel.
    #[serde(default = "default_red_pin")]
    pub red_pin: u8,
    /// GPIO pin of the green channel.
    #[serde(default = "default_green_pin")]
    pub green_pin: u8,
    /// GPIO pin of the blue channel.
    #[serde(default = "default_blue_pin")]
    pub blue_pin: u8,
}

fn default_pwm_host() -> String {
    "localhost".into()
}
fn default_pwm_port() -> u16 {
    8888
}
fn default_red_pin() -> u8 {
    17
}
fn default_green_pin() -> u8 {
    22
}
fn default_blue_pin() -> u8 {
    24
}

impl Default for PwmParams {
    fn default() -> Self {
        PwmParams {
            host: default_pwm_host(),
            port: default_pwm_port(),
            red_pin: default_red_pin(),
            green_pin: default_green_pin(),
            blue_pin: default_blue_pin(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripParams {
    /// `host:port` of the strip's realtime UDP endpoint.
    #[serde(default = "default_strip_address")]
    pub address: String,
    /// Number of pixels on the strip.
    #[serde(default = "default_led_count")]
    pub led_count: usize,
}

fn default_strip_address() -> String {
    "127.0.0.1:21324".into()
}
fn default_led_count() -> usize {
    30
}

impl Default for StripParams {
    fn default() -> Self {
        StripParams {
            address: default_strip_address(),
            led_count: default_led_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WledParams {
    /// Base URL of the fixture, e.g. `http://wled.local`.
    #[serde(default = "default_wled_url")]
    pub url: String,
}

fn default_wled_url() -> String {
    "http://wled.local".into()
}

impl Default for WledParams {
    fn default() -> Self {
        WledParams {
            url: default_wled_url(),
        }
    }
}

// ── Validation ──

/// Validation errors that [`Config::validate`] can return.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No target playback device configured — the loop would never sync.
    EmptyTargetDevice,
    /// `cluster_count` must be at least 1.
    ZeroClusterCount,
    /// `colorfulness_tolerance` must not be negative.
    NegativeTolerance(f64),
    /// Both artwork resize dimensions must be non-zero.
    ZeroResizeDimension,
    /// `poll_interval_seconds` must be positive.
    NonPositivePollInterval(f64),
    /// `transition_steps` must be at least 1.
    ZeroTransitionSteps,
    /// `transition_delay_seconds` must not be negative.
    NegativeTransitionDelay(f64),
    /// The WLED base URL is not an http(s) URL.
    InvalidWledUrl(String),
    /// The strip must have at least one pixel.
    ZeroStripLeds,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTargetDevice => write!(f, "Target device cannot be empty"),
            ValidationError::ZeroClusterCount => write!(f, "Cluster count must be at least 1"),
            ValidationError::NegativeTolerance(v) => {
                write!(f, "Colorfulness tolerance cannot be negative (got {v})")
            }
            ValidationError::ZeroResizeDimension => {
                write!(f, "Artwork resize dimensions must be non-zero")
            }
            ValidationError::NonPositivePollInterval(v) => {
                write!(f, "Poll interval must be positive (got {v})")
            }
            ValidationError::ZeroTransitionSteps => {
                write!(f, "Transition steps must be at least 1")
            }
            ValidationError::NegativeTransitionDelay(v) => {
                write!(f, "Transition delay cannot be negative (got {v})")
            }
            ValidationError::InvalidWledUrl(url) => {
                write!(f, "WLED URL must start with http:// or https:// (got \"{url}\")")
            }
            ValidationError::ZeroStripLeds => write!(f, "Strip LED count must be at least 1"),
        }
    }
}

impl Config {
    /// Platform-specific config directory.
    pub fn dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("playglow"))
    }

    /// Full path to config file.
    pub fn path() -> Option<PathBuf> {
        Self::dir().map(|d| d.join("playglow.toml"))
    }

    /// Load config from disk, or return defaults if not found.
    pub fn load() -> Self {
        let (config, warnings) = Self::load_with_warnings();
        for w in &warnings {
            log::warn!("{w}");
        }
        config
    }

    /// Load config from the default path, returning the config and any parse warnings.
    pub fn load_with_warnings() -> (Self, Vec<String>) {
        let Some(path) = Self::path() else {
            return (Self::default(), vec![]);
        };
        Self::load_from(&path)
    }

    /// Load config from an arbitrary path, returning the config and any parse warnings.
    ///
    /// Returns `(defaults, [])` if the file doesn't exist.
    /// Returns `(defaults, [warning])` if the file exists but can't be parsed.
    pub fn load_from(path: &Path) -> (Self, Vec<String>) {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => (config, vec![]),
                Err(e) => {
                    let warning = format!(
                        "config parse error ({}), using defaults: {e}",
                        path.display()
                    );
                    (Self::default(), vec![warning])
                }
            },
            Err(_) => (Self::default(), vec![]),
        }
    }

    /// Save config to an arbitrary path atomically (write to temp file, then rename).
    ///
    /// A header comment is prepended to warn that manual edits may be overwritten.
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let serialized = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        let contents = format!("{CONFIG_HEADER}{serialized}");
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, &contents)?;
        match std::fs::rename(&tmp, path) {
            Ok(()) => Ok(()),
            Err(_) => {
                // Rename can fail across filesystems; fall back to direct write + cleanup
                let result = std::fs::write(path, &contents);
                let _ = std::fs::remove_file(&tmp);
                result
            }
        }
    }

    /// Save config to the default platform path.
    pub fn save(&self) -> std::io::Result<()> {
        let Some(path) = Self::path() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config directory",
            ));
        };
        self.save_to(&path)
    }

    /// Poll interval as a [`Duration`]. Negative values clamp to zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_seconds.max(0.0))
    }

    /// Inter-step fade delay as a [`Duration`]. Negative values clamp to zero.
    pub fn transition_delay(&self) -> Duration {
        Duration::from_secs_f64(self.transition_delay_seconds.max(0.0))
    }

    /// Extraction options derived from this config.
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            cluster_count: self.cluster_count.max(1),
            colorfulness_tolerance: self.colorfulness_tolerance,
            resize_to: Some((self.artwork_resize[0], self.artwork_resize[1])),
        }
    }

    /// Validate the entire config, collecting all errors.
    ///
    /// Driver parameters are only checked for the driver that is selected.
    pub fn validate(&self) -> std::result::Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.target_device.trim().is_empty() {
            errors.push(ValidationError::EmptyTargetDevice);
        }
        if self.cluster_count == 0 {
            errors.push(ValidationError::ZeroClusterCount);
        }
        if self.colorfulness_tolerance < 0.0 {
            errors.push(ValidationError::NegativeTolerance(
                self.colorfulness_tolerance,
            ));
        }
        if self.artwork_resize[0] == 0 || self.artwork_resize[1] == 0 {
            errors.push(ValidationError::ZeroResizeDimension);
        }
        if self.poll_interval_seconds <= 0.0 {
            errors.push(ValidationError::NonPositivePollInterval(
                self.poll_interval_seconds,
            ));
        }
        if self.transition_steps == 0 {
            errors.push(ValidationError::ZeroTransitionSteps);
        }
        if self.transition_delay_seconds < 0.0 {
            errors.push(ValidationError::NegativeTransitionDelay(
                self.transition_delay_seconds,
            ));
        }

        match self.device {
            DeviceKind::Wled => {
                let url = self.wled.url.trim();
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    errors.push(ValidationError::InvalidWledUrl(self.wled.url.clone()));
                }
            }
            DeviceKind::PixelStrip => {
                if self.strip.led_count == 0 {
                    errors.push(ValidationError::ZeroStripLeds);
                }
            }
            DeviceKind::Pwm => {}
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
