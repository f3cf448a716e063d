//! `swatch` subcommand — dominant color of a local image file.
//!
//! Runs the same extraction pipeline the sync loop uses, without needing a
//! playback session. Handy for checking what a given album cover will do to
//! the room.

use std::path::Path;

use serde::Serialize;

use super::{Result, kv, kv_width};
use playglow_lib::extract;

#[derive(Serialize)]
struct SwatchOutput {
    color: String,
    clusters: Vec<ClusterJson>,
}

#[derive(Serialize)]
struct ClusterJson {
    color: String,
    weight: f64,
    colorfulness: f64,
}

pub(super) fn cmd_swatch(
    path: &Path,
    show_clusters: bool,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = super::load_config(config_path);
    let opts = config.extract_options();

    let image = extract::load_image(path)?;
    let color = extract::dominant_color(&image, &opts)?;
    let clusters = extract::analyze(&image, &opts)?;

    let output = SwatchOutput {
        color: color.to_string(),
        clusters: clusters
            .iter()
            .map(|c| ClusterJson {
                color: c.color().to_string(),
                weight: c.weight,
                colorfulness: c.colorfulness,
            })
            .collect(),
    };

    if json {
        let body = serde_json::to_string_pretty(&output).map_err(std::io::Error::other)?;
        println!("{body}");
        return Ok(());
    }

    println!("Dominant color: {}", output.color);
    if show_clusters {
        println!();
        println!("Clusters:");
        let w = kv_width(&["#RRGGBB"]);
        for c in &output.clusters {
            kv(
                &c.color,
                format!("weight {:.3}  colorfulness {:.1}", c.weight, c.colorfulness),
                w,
            );
        }
    }
    Ok(())
}
