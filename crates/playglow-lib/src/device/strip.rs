//! Addressable pixel strip driver — WLED realtime UDP (DRGB).
//!
//! Every update paints the whole strip one color: a single datagram carrying
//! the DRGB header followed by one RGB triple per pixel. The protocol has no
//! readback, so `color()` reports the last written value.

use std::net::UdpSocket;

use crate::color::Rgb;
use crate::config::StripParams;

use super::{DeviceError, LightDevice, Result};

/// DRGB realtime protocol id.
const DRGB_PROTOCOL: u8 = 2;
/// Hold realtime colors until the next frame instead of timing out.
const REALTIME_HOLD: u8 = 255;

/// Pixel strip behind a WLED realtime UDP endpoint.
#[derive(Debug)]
pub struct StripLight {
    socket: UdpSocket,
    led_count: usize,
    last: Rgb,
}

impl StripLight {
    /// Bind a local socket and aim it at the strip's realtime endpoint.
    pub fn bind(params: &StripParams) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| DeviceError::Connect(format!("UDP socket: {e}")))?;
        socket
            .connect(&params.address)
            .map_err(|e| DeviceError::Connect(format!("strip at {}: {e}", params.address)))?;
        Ok(StripLight {
            socket,
            led_count: params.led_count.max(1),
            last: Rgb::OFF,
        })
    }

    /// One whole-strip frame: header + `led_count` copies of the color.
    fn frame(&self, color: Rgb) -> Vec<u8> {
        let mut frame = Vec::with_capacity(2 + self.led_count * 3);
        frame.push(DRGB_PROTOCOL);
        frame.push(REALTIME_HOLD);
        for _ in 0..self.led_count {
            frame.extend_from_slice(&[color.r, color.g, color.b]);
        }
        frame
    }
}

impl LightDevice for StripLight {
    /// Last written color — the strip offers no readback.
    fn color(&mut self) -> Result<Rgb> {
        Ok(self.last)
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.socket
            .send(&self.frame(color))
            .map_err(|e| DeviceError::Write(format!("strip datagram: {e}")))?;
        self.last = color;
        Ok(())
    }
}
