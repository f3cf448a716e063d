//! `color` / `off` subcommands — manual light control.
//!
//! Manual control assumes the sync loop is not running; whoever holds the
//! device writes to it exclusively.

use std::path::Path;

use super::{Result, parse_color};
use playglow_lib::device::{LightDevice, open_device};
use playglow_lib::transition;

pub(super) fn cmd_color(color_arg: &str, fade: Option<usize>, config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let target = parse_color(color_arg)?;
    let mut device = open_device(&config)?;

    match fade {
        Some(steps) => {
            let from = device.color()?;
            let plan = transition::plan(from, target, steps.max(1));
            device.apply_transition(&plan, config.transition_delay())?;
        }
        None => device.set_color(target)?,
    }
    println!("Light: {target}");
    Ok(())
}

pub(super) fn cmd_off(config_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path);
    let mut device = open_device(&config)?;
    device.turn_off()?;
    println!("Light: off");
    Ok(())
}
