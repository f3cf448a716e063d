//! Light device drivers — capability trait + concrete backends.
//!
//! Every driver exposes the same three operations: read the current color,
//! write one color immediately, and play back a precomputed fade. The sync
//! engine is driver-agnostic; which backend runs is decided once at startup
//! from configuration.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

mod pwm;
mod strip;
mod wled;

pub use pwm::PwmLight;
pub use strip::StripLight;
pub use wled::WledLight;

// ── Error type ──

/// Device communication errors.
///
/// String payloads follow the convention **"context: details"** where
/// *context* identifies the operation (e.g. `"pigpiod command 5"`,
/// `"POST http://…"`) and *details* describes what went wrong.
#[derive(Debug)]
pub enum DeviceError {
    Connect(String),
    Read(String),
    Write(String),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Connect(e) => write!(f, "Failed to connect to light device: {e}"),
            DeviceError::Read(e) => write!(f, "Device read failed: {e}"),
            DeviceError::Write(e) => write!(f, "Device write failed: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {}

pub type Result<T> = std::result::Result<T, DeviceError>;

// ── Trait ──

/// A light fixture that can report and take a single RGB color.
pub trait LightDevice: Send {
    /// The device's current color.
    ///
    /// Networked fixtures query live state. Drivers whose hardware has no
    /// readback track the last written value instead and say so on the impl.
    fn color(&mut self) -> Result<Rgb>;

    /// Apply one color immediately, with no transition.
    fn set_color(&mut self, color: Rgb) -> Result<()>;

    /// Write a planned fade in order, pausing `step_delay` between
    /// consecutive writes. Blocks for the whole sequence.
    fn apply_transition(&mut self, plan: &[Rgb], step_delay: Duration) -> Result<()> {
        for (i, &color) in plan.iter().enumerate() {
            if i > 0 && !step_delay.is_zero() {
                std::thread::sleep(step_delay);
            }
            self.set_color(color)?;
        }
        Ok(())
    }

    /// Drive all channels to zero output.
    fn turn_off(&mut self) -> Result<()> {
        self.set_color(Rgb::OFF)
    }
}

impl LightDevice for Box<dyn LightDevice> {
    fn color(&mut self) -> Result<Rgb> {
        (**self).color()
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        (**self).set_color(color)
    }

    fn apply_transition(&mut self, plan: &[Rgb], step_delay: Duration) -> Result<()> {
        (**self).apply_transition(plan, step_delay)
    }

    fn turn_off(&mut self) -> Result<()> {
        (**self).turn_off()
    }
}

// ── Driver selection ──

/// Which backend drives the configured fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceKind {
    /// Three GPIO duty-cycle channels via the pigpio daemon.
    Pwm,
    /// Addressable strip behind a WLED realtime UDP endpoint.
    PixelStrip,
    /// Network-attached fixture speaking the WLED HTTP JSON API.
    #[default]
    Wled,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceKind::Pwm => write!(f, "pwm"),
            DeviceKind::PixelStrip => write!(f, "pixel-strip"),
            DeviceKind::Wled => write!(f, "wled"),
        }
    }
}

/// Open the light device selected by the configuration.
pub fn open_device(config: &crate::config::Config) -> Result<Box<dyn LightDevice>> {
    match config.device {
        DeviceKind::Pwm => Ok(Box::new(PwmLight::connect(&config.pwm)?)),
        DeviceKind::PixelStrip => Ok(Box::new(StripLight::bind(&config.strip)?)),
        DeviceKind::Wled => Ok(Box::new(WledLight::new(&config.wled)?)),
    }
}

// ── Mock device for testing ──

/// In-memory mock light for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;

    /// Records immediate writes and transition plans separately; transitions
    /// apply instantly regardless of the requested pacing so tests never
    /// sleep.
    pub struct MockLight {
        current: Rgb,
        /// Every color written via `set_color` (transition steps are
        /// recorded in `transitions` instead).
        pub writes: Vec<Rgb>,
        /// One entry per `apply_transition` call: the full plan it received.
        pub transitions: Vec<Vec<Rgb>>,
        /// If true, writes and transitions return an error.
        pub fail_writes: bool,
        /// If true, `color` returns an error.
        pub fail_reads: bool,
    }

    impl Default for MockLight {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockLight {
        pub fn new() -> Self {
            Self::with_color(Rgb::OFF)
        }

        pub fn with_color(color: Rgb) -> Self {
            MockLight {
                current: color,
                writes: Vec::new(),
                transitions: Vec::new(),
                fail_writes: false,
                fail_reads: false,
            }
        }

        /// Number of immediate writes that drove the device dark.
        pub fn off_writes(&self) -> usize {
            self.writes.iter().filter(|c| c.is_off()).count()
        }
    }

    impl LightDevice for MockLight {
        fn color(&mut self) -> Result<Rgb> {
            if self.fail_reads {
                return Err(DeviceError::Read("mock: read failure injected".into()));
            }
            Ok(self.current)
        }

        fn set_color(&mut self, color: Rgb) -> Result<()> {
            if self.fail_writes {
                return Err(DeviceError::Write("mock: write failure injected".into()));
            }
            self.writes.push(color);
            self.current = color;
            Ok(())
        }

        fn apply_transition(&mut self, plan: &[Rgb], _step_delay: Duration) -> Result<()> {
            if self.fail_writes {
                return Err(DeviceError::Write("mock: write failure injected".into()));
            }
            self.transitions.push(plan.to_vec());
            if let Some(&last) = plan.last() {
                self.current = last;
            }
            Ok(())
        }
    }
}
