//! Playback source — what's playing right now, and its artwork.
//!
//! The sync engine only ever sees the [`PlaybackSource`] trait: one call for
//! a fresh snapshot of the remote session, one to fetch and decode artwork.
//! [`SpotifyPlayback`] is the concrete client over the Spotify Web API;
//! token acquisition and refresh happen outside this crate — the client is
//! handed a ready-to-use bearer token.

use std::fmt;
use std::time::Duration;

use image::RgbImage;
use serde::Deserialize;

// ── Error type ──

#[derive(Debug)]
pub enum PlaybackError {
    /// The playback state could not be fetched (network, auth, bad payload).
    Snapshot(String),
    /// The current track has no fetchable/decodable artwork.
    Artwork(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::Snapshot(e) => write!(f, "Could not fetch playback state: {e}"),
            PlaybackError::Artwork(e) => write!(f, "Artwork unavailable: {e}"),
        }
    }
}

impl std::error::Error for PlaybackError {}

pub type Result<T> = std::result::Result<T, PlaybackError>;

// ── Snapshot ──

/// One poll's read-only view of the remote playback session.
///
/// Rebuilt from scratch on every poll; nothing holds onto it across ticks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSnapshot {
    /// Name of the device the session is playing on, if any.
    pub device_name: Option<String>,
    /// Whether that device is actively playing.
    pub is_active: bool,
    /// Stable id of the current track.
    pub track_id: Option<String>,
    /// Where to fetch the current track's artwork.
    pub artwork_url: Option<String>,
}

// ── Trait ──

/// Supplies playback snapshots and artwork to the sync engine.
pub trait PlaybackSource {
    /// Fetch the current playback state. `Ok(None)` means nothing is playing
    /// anywhere; `Err` means the state could not be determined at all.
    fn snapshot(&mut self) -> Result<Option<PlaybackSnapshot>>;

    /// Fetch and decode the artwork behind `url`.
    fn artwork(&self, url: &str) -> Result<RgbImage>;
}

// ── Spotify Web API client ──

/// Environment variable holding the pre-obtained Spotify access token.
pub const TOKEN_ENV: &str = "PLAYGLOW_SPOTIFY_TOKEN";

const PLAYER_ENDPOINT: &str = "https://api.spotify.com/v1/me/player";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Playback source backed by the Spotify Web API.
pub struct SpotifyPlayback {
    client: reqwest::blocking::Client,
    token: String,
}

#[derive(Deserialize)]
struct PlayerResponse {
    device: Option<ApiDevice>,
    item: Option<ApiTrack>,
}

#[derive(Deserialize)]
struct ApiDevice {
    #[serde(default)]
    name: String,
    #[serde(default)]
    is_active: bool,
}

#[derive(Deserialize)]
struct ApiTrack {
    id: Option<String>,
    album: Option<ApiAlbum>,
}

#[derive(Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

/// Prefer the middle-resolution album image, falling back to the first.
fn pick_artwork(images: &[ApiImage]) -> Option<String> {
    images.get(1).or_else(|| images.first()).map(|i| i.url.clone())
}

/// Parse a player-endpoint payload into a snapshot.
fn snapshot_from_json(body: &str) -> Result<PlaybackSnapshot> {
    let resp: PlayerResponse = serde_json::from_str(body)
        .map_err(|e| PlaybackError::Snapshot(format!("player payload: {e}")))?;
    let (device_name, is_active) = match resp.device {
        Some(d) => (Some(d.name), d.is_active),
        None => (None, false),
    };
    let (track_id, artwork_url) = match resp.item {
        Some(track) => {
            let artwork = track.album.as_ref().and_then(|a| pick_artwork(&a.images));
            (track.id, artwork)
        }
        None => (None, None),
    };
    Ok(PlaybackSnapshot {
        device_name,
        is_active,
        track_id,
        artwork_url,
    })
}

impl SpotifyPlayback {
    /// Build a client around a ready-to-use bearer token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| PlaybackError::Snapshot(format!("HTTP client: {e}")))?;
        Ok(SpotifyPlayback {
            client,
            token: token.into(),
        })
    }

    /// Build a client from the [`TOKEN_ENV`] environment variable.
    pub fn from_env() -> Result<Self> {
        match std::env::var(TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Self::new(token),
            _ => Err(PlaybackError::Snapshot(format!(
                "no access token: set {TOKEN_ENV}"
            ))),
        }
    }
}

impl PlaybackSource for SpotifyPlayback {
    fn snapshot(&mut self) -> Result<Option<PlaybackSnapshot>> {
        let resp = self
            .client
            .get(PLAYER_ENDPOINT)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| PlaybackError::Snapshot(format!("GET player: {e}")))?;
        // 204 means the account has no playback session anywhere.
        if resp.status() == reqwest::StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let body = resp
            .error_for_status()
            .map_err(|e| PlaybackError::Snapshot(format!("player endpoint: {e}")))?
            .text()
            .map_err(|e| PlaybackError::Snapshot(format!("player body: {e}")))?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(snapshot_from_json(&body)?))
    }

    fn artwork(&self, url: &str) -> Result<RgbImage> {
        let bytes = self
            .client
            .get(url)
            .send()
            .map_err(|e| PlaybackError::Artwork(format!("GET {url}: {e}")))?
            .error_for_status()
            .map_err(|e| PlaybackError::Artwork(format!("artwork fetch: {e}")))?
            .bytes()
            .map_err(|e| PlaybackError::Artwork(format!("artwork body: {e}")))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| PlaybackError::Artwork(format!("artwork decode: {e}")))?;
        Ok(img.to_rgb8())
    }
}

// ── Scripted source for testing ──

/// In-memory playback source for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::color::Rgb;

    /// What a scripted source serves for an artwork URL.
    pub enum ArtworkScript {
        /// A uniform image of the given color and size.
        Solid { color: Rgb, width: u32, height: u32 },
        /// The fetch fails with an artwork error.
        Unavailable,
    }

    /// Plays back a programmed sequence of snapshot results. Once the script
    /// runs out it keeps reporting "nothing playing".
    #[derive(Default)]
    pub struct ScriptedPlayback {
        snapshots: VecDeque<Result<Option<PlaybackSnapshot>>>,
        artworks: HashMap<String, ArtworkScript>,
        /// Every artwork URL requested, in order.
        pub artwork_requests: RefCell<Vec<String>>,
    }

    /// A snapshot of `track` actively playing on `device`.
    pub fn active_snapshot(
        device: &str,
        track: &str,
        artwork_url: Option<&str>,
    ) -> PlaybackSnapshot {
        PlaybackSnapshot {
            device_name: Some(device.into()),
            is_active: true,
            track_id: Some(track.into()),
            artwork_url: artwork_url.map(String::from),
        }
    }

    /// A snapshot of `device` sitting idle.
    pub fn inactive_snapshot(device: &str) -> PlaybackSnapshot {
        PlaybackSnapshot {
            device_name: Some(device.into()),
            is_active: false,
            track_id: None,
            artwork_url: None,
        }
    }

    impl ScriptedPlayback {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_snapshot(&mut self, snapshot: PlaybackSnapshot) {
            self.snapshots.push_back(Ok(Some(snapshot)));
        }

        /// Script a poll where no session exists anywhere.
        pub fn push_missing(&mut self) {
            self.snapshots.push_back(Ok(None));
        }

        /// Script a failed poll (network/auth error).
        pub fn push_failure(&mut self, message: &str) {
            self.snapshots
                .push_back(Err(PlaybackError::Snapshot(message.into())));
        }

        pub fn set_artwork(&mut self, url: &str, script: ArtworkScript) {
            self.artworks.insert(url.into(), script);
        }
    }

    impl PlaybackSource for ScriptedPlayback {
        fn snapshot(&mut self) -> Result<Option<PlaybackSnapshot>> {
            self.snapshots.pop_front().unwrap_or(Ok(None))
        }

        fn artwork(&self, url: &str) -> Result<RgbImage> {
            self.artwork_requests.borrow_mut().push(url.to_string());
            match self.artworks.get(url) {
                Some(ArtworkScript::Solid {
                    color,
                    width,
                    height,
                }) => Ok(RgbImage::from_pixel(
                    *width,
                    *height,
                    image::Rgb([color.r, color.g, color.b]),
                )),
                Some(ArtworkScript::Unavailable) | None => Err(PlaybackError::Artwork(format!(
                    "no artwork scripted for {url}"
                ))),
            }
        }
    }
}
