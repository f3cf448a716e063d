//! Playglow — fades a light fixture to the dominant color of whatever is
//! currently playing.

pub mod color;
pub mod config;
pub mod device;
pub mod error;
pub mod extract;
pub mod playback;
pub mod sync;
pub mod transition;

pub use error::PlayglowError;
