//! PWM light driver — three GPIO duty-cycle channels via the pigpio daemon.
//!
//! Speaks the pigpiod socket protocol: 16-byte little-endian command frames
//! `[cmd, p1, p2, p3]`, answered by a same-shaped frame whose last word
//! carries the result (negative = daemon error). Duty cycles map 1:1 onto
//! 8-bit color channels.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::color::Rgb;
use crate::config::PwmParams;

use super::{DeviceError, LightDevice, Result};

/// pigpiod command: set PWM duty cycle on a GPIO.
const CMD_PWM: u32 = 5;
/// pigpiod command: read back the PWM duty cycle of a GPIO.
const CMD_GET_DUTY: u32 = 83;

const SOCKET_TIMEOUT: Duration = Duration::from_secs(3);

/// Build a pigpiod command frame.
fn build_frame(cmd: u32, p1: u32, p2: u32) -> [u8; 16] {
    let mut frame = [0u8; 16];
    frame[0..4].copy_from_slice(&cmd.to_le_bytes());
    frame[4..8].copy_from_slice(&p1.to_le_bytes());
    frame[8..12].copy_from_slice(&p2.to_le_bytes());
    // p3 stays zero for the commands used here.
    frame
}

/// Three-channel PWM light behind a pigpio daemon.
#[derive(Debug)]
pub struct PwmLight {
    stream: TcpStream,
    red_pin: u8,
    green_pin: u8,
    blue_pin: u8,
}

impl PwmLight {
    /// Connect to the daemon and drive all channels to zero output.
    pub fn connect(params: &PwmParams) -> Result<Self> {
        let addr = format!("{}:{}", params.host, params.port);
        let stream = TcpStream::connect(&addr)
            .map_err(|e| DeviceError::Connect(format!("pigpiod at {addr}: {e}")))?;
        stream
            .set_read_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|e| DeviceError::Connect(format!("socket timeout: {e}")))?;
        stream
            .set_write_timeout(Some(SOCKET_TIMEOUT))
            .map_err(|e| DeviceError::Connect(format!("socket timeout: {e}")))?;

        let mut light = PwmLight {
            stream,
            red_pin: params.red_pin,
            green_pin: params.green_pin,
            blue_pin: params.blue_pin,
        };
        light.set_color(Rgb::OFF)?;
        Ok(light)
    }

    /// Send one command frame and return the daemon's result word.
    fn command(&mut self, cmd: u32, p1: u32, p2: u32) -> Result<i32> {
        self.stream
            .write_all(&build_frame(cmd, p1, p2))
            .map_err(|e| DeviceError::Write(format!("pigpiod command {cmd}: {e}")))?;
        let mut response = [0u8; 16];
        self.stream
            .read_exact(&mut response)
            .map_err(|e| DeviceError::Read(format!("pigpiod response to {cmd}: {e}")))?;
        Ok(i32::from_le_bytes(
            response[12..16].try_into().unwrap_or_default(),
        ))
    }

    fn set_duty(&mut self, pin: u8, duty: u8) -> Result<()> {
        let result = self.command(CMD_PWM, pin as u32, duty as u32)?;
        if result < 0 {
            return Err(DeviceError::Write(format!(
                "pigpiod rejected PWM on pin {pin}: error {result}"
            )));
        }
        Ok(())
    }

    fn duty(&mut self, pin: u8) -> Result<u8> {
        let result = self.command(CMD_GET_DUTY, pin as u32, 0)?;
        if result < 0 {
            return Err(DeviceError::Read(format!(
                "pigpiod could not read duty cycle of pin {pin}: error {result}"
            )));
        }
        Ok(result.min(255) as u8)
    }
}

impl LightDevice for PwmLight {
    fn color(&mut self) -> Result<Rgb> {
        let (red_pin, green_pin, blue_pin) = (self.red_pin, self.green_pin, self.blue_pin);
        Ok(Rgb::new(
            self.duty(red_pin)?,
            self.duty(green_pin)?,
            self.duty(blue_pin)?,
        ))
    }

    fn set_color(&mut self, color: Rgb) -> Result<()> {
        let (red_pin, green_pin, blue_pin) = (self.red_pin, self.green_pin, self.blue_pin);
        self.set_duty(red_pin, color.r)?;
        self.set_duty(green_pin, color.g)?;
        self.set_duty(blue_pin, color.b)?;
        Ok(())
    }
}

impl Drop for PwmLight {
    /// Leave all channels at zero output and release the socket.
    fn drop(&mut self) {
        let (red_pin, green_pin, blue_pin) = (self.red_pin, self.green_pin, self.blue_pin);
        let _ = self.set_duty(red_pin, 0);
        let _ = self.set_duty(green_pin, 0);
        let _ = self.set_duty(blue_pin, 0);
    }
}
