//! Networked fixture driver — WLED HTTP JSON API.
//!
//! `set_color` posts the first segment's color to `/json/state`;
//! `color` reads it back from the same endpoint. Each transition step is one
//! remote call, so pacing only sleeps whatever the call latency left over.

use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::color::Rgb;
use crate::config::WledParams;

use super::{DeviceError, LightDevice, Result};

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Network-attached fixture speaking the WLED JSON API.
pub struct WledLight {
    client: reqwest::blocking::Client,
    state_url: String,
}

#[derive(Deserialize)]
struct State {
    #[serde(default)]
    seg: Vec<Segment>,
}

#[derive(Deserialize)]
struct Segment {
    #[serde(default)]
    col: Vec<Vec<u8>>,
}

/// Pull the first segment's primary color out of a `/json/state` payload.
fn parse_state_color(body: &str) -> Result<Rgb> {
    let state: State = serde_json::from_str(body)
        .map_err(|e| DeviceError::Read(format!("state payload: {e}")))?;
    let col = state
        .seg
        .first()
        .and_then(|s| s.col.first())
        .ok_or_else(|| DeviceError::Read("state has no segment color".into()))?;
    match col.as_slice() {
        // WLED reports [r, g, b] or [r, g, b, w]; extra channels are ignored.
        [r, g, b, ..] => Ok(Rgb::new(*r, *g, *b)),
        _ => Err(DeviceError::Read(format!(
            "segment color has {} channels, need at least 3",
            col.len()
        ))),
    }
}

/// The `/json/state` body that sets every segment pixel to one color.
fn state_payload(color: Rgb) -> serde_json::Value {
    serde_json::json!({
        "on": true,
        "seg": [{ "col": [[color.r, color.g, color.b]] }]
    })
}

impl WledLight {
    pub fn new(params: &WledParams) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| DeviceError::Connect(format!("HTTP client: {e}")))?;
        let base = params.url.trim_end_matches('/');
        Ok(WledLight {
            client,
            state_url: format!("{base}/json/state"),
        })
    }
}

impl LightDevice for WledLight {
    fn color(&mut self) -> Result<Rgb> {
        let body = self
            .client
            .get(&self.state_url)
            .send()
            .map_err(|e| DeviceError::Read(format!("GET {}: {e}", self.state_url)))?
            .error_for_status()
            .map_err(|e| DeviceError::Read(format!("GET {}: {e}", self.state_url)))?
            .text()
            .map_err(|e| DeviceError::Read(format!("state body: {e}")))?;
        parse_state_color(&body)
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.client
            .post(&self.state_url)
            .json(&state_payload(color))
            .send()
            .map_err(|e| DeviceError::Write(format!("POST {}: {e}", self.state_url)))?
            .error_for_status()
            .map_err(|e| DeviceError::Write(format!("fixture rejected update: {e}")))?;
        Ok(())
    }

    fn apply_transition(&mut self, plan: &[Rgb], step_delay: Duration) -> Result<()> {
        for (i, &color) in plan.iter().enumerate() {
            let started = Instant::now();
            self.set_color(color)?;
            // Network latency counts toward the pacing budget.
            if i + 1 < plan.len()
                && let Some(remaining) = step_delay.checked_sub(started.elapsed())
            {
                std::thread::sleep(remaining);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── state parsing ──

    #[test]
    fn parse_typical_state() {
        let body = r#"{
            "on": true, "bri": 128,
            "seg": [{"id": 0, "col": [[255, 160, 0], [0, 0, 0], [0, 0, 0]]}]
        }"#;
        assert_eq!(parse_state_color(body).unwrap(), Rgb::new(255, 160, 0));
    }

    #[test]
    fn parse_rgbw_state_ignores_white_channel() {
        let body = r#"{"seg": [{"col": [[10, 20, 30, 255]]}]}"#;
        assert_eq!(parse_state_color(body).unwrap(), Rgb::new(10, 20, 30));
    }

    #[test]
    fn parse_state_without_segments_fails() {
        let err = parse_state_color(r#"{"on": true}"#).unwrap_err();
        assert!(matches!(err, DeviceError::Read(_)), "got {err}");
    }

    #[test]
    fn parse_state_with_short_color_fails() {
        let err = parse_state_color(r#"{"seg": [{"col": [[1, 2]]}]}"#).unwrap_err();
        assert!(err.to_string().contains("channels"), "got {err}");
    }

    #[test]
    fn parse_garbage_fails() {
        assert!(parse_state_color("not json").is_err());
    }

    // ── payload shape ──

    #[test]
    fn payload_sets_first_segment_color() {
        let v = state_payload(Rgb::new(1, 2, 3));
        assert_eq!(v["on"], true);
        assert_eq!(v["seg"][0]["col"][0][0], 1);
        assert_eq!(v["seg"][0]["col"][0][1], 2);
        assert_eq!(v["seg"][0]["col"][0][2], 3);
    }

    // ── URL handling ──

    #[test]
    fn trailing_slash_is_normalized() {
        let light = WledLight::new(&WledParams {
            url: "http://wled.local/".into(),
        })
        .unwrap();
        assert_eq!(light.state_url, "http://wled.local/json/state");
    }

    #[test]
    fn plain_url_gets_state_path() {
        let light = WledLight::new(&WledParams {
            url: "http://192.168.1.50".into(),
        })
        .unwrap();
        assert_eq!(light.state_url, "http://192.168.1.50/json/state");
    }
}
