//! Unified error type for the playglow-lib crate.
//!
//! [`PlayglowError`] wraps module-specific errors (`DeviceError`,
//! `PlaybackError`) and domain-specific error kinds (`Config`, `Color`,
//! `InsufficientData`). `From` impls allow `?` to propagate across module
//! boundaries seamlessly.

use std::fmt;

use crate::device::DeviceError;
use crate::playback::PlaybackError;

/// Unified error type for playglow-lib operations.
#[derive(Debug)]
pub enum PlayglowError {
    /// Light device communication error (connect, read, write).
    Device(DeviceError),
    /// Playback source error (snapshot fetch, artwork fetch/decode).
    Playback(PlaybackError),
    /// Standard I/O error (file read/write, config persistence).
    Io(std::io::Error),
    /// Configuration validation error.
    Config(String),
    /// Color parsing error.
    Color(String),
    /// The image has too few pixels to form the requested cluster count.
    InsufficientData { pixels: usize, clusters: usize },
}

impl fmt::Display for PlayglowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayglowError::Device(e) => write!(f, "{e}"),
            PlayglowError::Playback(e) => write!(f, "{e}"),
            PlayglowError::Io(e) => write!(f, "I/O error: {e}"),
            PlayglowError::Config(e) => write!(f, "Config error: {e}"),
            PlayglowError::Color(e) => write!(f, "Color error: {e}"),
            PlayglowError::InsufficientData { pixels, clusters } => {
                write!(
                    f,
                    "Not enough pixels to cluster: {pixels} pixel{} for {clusters} cluster{}",
                    if *pixels == 1 { "" } else { "s" },
                    if *clusters == 1 { "" } else { "s" }
                )
            }
        }
    }
}

impl std::error::Error for PlayglowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlayglowError::Device(e) => Some(e),
            PlayglowError::Playback(e) => Some(e),
            PlayglowError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DeviceError> for PlayglowError {
    fn from(e: DeviceError) -> Self {
        PlayglowError::Device(e)
    }
}

impl From<PlaybackError> for PlayglowError {
    fn from(e: PlaybackError) -> Self {
        PlayglowError::Playback(e)
    }
}

impl From<std::io::Error> for PlayglowError {
    fn from(e: std::io::Error) -> Self {
        PlayglowError::Io(e)
    }
}

/// Crate-level Result alias using [`PlayglowError`].
pub type Result<T> = std::result::Result<T, PlayglowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_device_error() {
        let e: PlayglowError = DeviceError::Connect("refused".into()).into();
        assert!(matches!(e, PlayglowError::Device(DeviceError::Connect(_))));
    }

    #[test]
    fn from_playback_error() {
        let e: PlayglowError = PlaybackError::Snapshot("timeout".into()).into();
        assert!(matches!(
            e,
            PlayglowError::Playback(PlaybackError::Snapshot(_))
        ));
    }

    #[test]
    fn from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: PlayglowError = io_err.into();
        assert!(matches!(e, PlayglowError::Io(_)));
    }

    #[test]
    fn display_device_error() {
        let e = PlayglowError::Device(DeviceError::Write("broken pipe".into()));
        assert_eq!(e.to_string(), "Device write failed: broken pipe");
    }

    #[test]
    fn display_config_error() {
        let e = PlayglowError::Config("invalid device kind".into());
        assert_eq!(e.to_string(), "Config error: invalid device kind");
    }

    #[test]
    fn display_insufficient_data() {
        let e = PlayglowError::InsufficientData {
            pixels: 4,
            clusters: 8,
        };
        assert_eq!(
            e.to_string(),
            "Not enough pixels to cluster: 4 pixels for 8 clusters"
        );
    }

    #[test]
    fn display_insufficient_data_singular() {
        let e = PlayglowError::InsufficientData {
            pixels: 1,
            clusters: 1,
        };
        assert_eq!(
            e.to_string(),
            "Not enough pixels to cluster: 1 pixel for 1 cluster"
        );
    }

    #[test]
    fn source_chains_device_error() {
        let e = PlayglowError::Device(DeviceError::Write("timeout".into()));
        let source = std::error::Error::source(&e).unwrap();
        assert!(source.to_string().contains("timeout"));
    }

    #[test]
    fn source_none_for_string_variants() {
        let e = PlayglowError::Config("test".into());
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn question_mark_propagation_device_to_playglow() {
        fn inner() -> crate::device::Result<()> {
            Err(DeviceError::Connect("refused".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(err, PlayglowError::Device(DeviceError::Connect(_))));
    }

    #[test]
    fn question_mark_propagation_playback_to_playglow() {
        fn inner() -> crate::playback::Result<()> {
            Err(PlaybackError::Artwork("404".into()))
        }
        fn outer() -> Result<()> {
            inner()?;
            Ok(())
        }
        let err = outer().unwrap_err();
        assert!(matches!(
            err,
            PlayglowError::Playback(PlaybackError::Artwork(_))
        ));
    }
}
