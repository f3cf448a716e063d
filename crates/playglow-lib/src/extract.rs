//! Dominant artwork color extraction.
//!
//! Clusters the image's pixels in RGB space with k-means, scores each cluster
//! with the Hasler–Süsstrunk colorfulness metric, and returns the most
//! colorful centroid. Artwork that is drab throughout falls back to a neutral
//! gray rather than producing a muddy accent color.

use std::cmp::Ordering;

use image::RgbImage;
use image::imageops::FilterType;

use crate::color::Rgb;
use crate::error::{PlayglowError, Result};

/// Iteration cap for the k-means refinement loop.
const MAX_ITERATIONS: usize = 16;

/// Squared centroid movement below which a cluster counts as settled.
const CONVERGENCE_EPSILON: f64 = 1e-2;

/// Tuning knobs for [`dominant_color`].
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Number of clusters to form. At least 1.
    pub cluster_count: usize,
    /// Minimum colorfulness score a cluster must reach; below it the
    /// extraction falls back to [`Rgb::NEUTRAL_GRAY`].
    pub colorfulness_tolerance: f64,
    /// Resample the image to this size before clustering. Bounds the cost
    /// independent of the source resolution; `None` clusters at full size.
    pub resize_to: Option<(u32, u32)>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions {
            cluster_count: 8,
            colorfulness_tolerance: 0.0,
            resize_to: Some((100, 100)),
        }
    }
}

/// One cluster from an artwork analysis.
#[derive(Debug, Clone)]
pub struct ClusterStats {
    /// Mean color of the cluster's member pixels.
    pub centroid: [f64; 3],
    /// Fraction of all pixels assigned to this cluster. Weights across an
    /// analysis sum to 1.
    pub weight: f64,
    /// Colorfulness score of the cluster's member population.
    pub colorfulness: f64,
}

impl ClusterStats {
    /// Centroid truncated to integer RGB.
    pub fn color(&self) -> Rgb {
        Rgb::new(
            self.centroid[0].clamp(0.0, 255.0) as u8,
            self.centroid[1].clamp(0.0, 255.0) as u8,
            self.centroid[2].clamp(0.0, 255.0) as u8,
        )
    }
}

/// Colorfulness of a pixel population, after Hasler and Süsstrunk (2003).
///
/// Computed from the per-pixel opponent components `rg = |R−G|` and
/// `yb = |0.5(R+G) − B|` as `sqrt(std(rg)² + std(yb)²) +
/// 0.3·sqrt(mean(rg)² + mean(yb)²)`. A population of grays scores 0.
pub fn colorfulness(pixels: &[[f64; 3]]) -> f64 {
    if pixels.is_empty() {
        return 0.0;
    }
    let mut rg = Vec::with_capacity(pixels.len());
    let mut yb = Vec::with_capacity(pixels.len());
    for &[r, g, b] in pixels {
        rg.push((r - g).abs());
        yb.push((0.5 * (r + g) - b).abs());
    }
    let (rg_mean, rg_std) = mean_std(&rg);
    let (yb_mean, yb_std) = mean_std(&yb);
    (rg_std * rg_std + yb_std * yb_std).sqrt()
        + 0.3 * (rg_mean * rg_mean + yb_mean * yb_mean).sqrt()
}

/// Population mean and standard deviation.
fn mean_std(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

/// Cluster the image and return per-cluster statistics.
///
/// Fails with [`PlayglowError::InsufficientData`] if the (possibly resized)
/// image has fewer pixels than `cluster_count`.
pub fn analyze(image: &RgbImage, opts: &ExtractOptions) -> Result<Vec<ClusterStats>> {
    let samples = collect_samples(image, opts.resize_to);
    let k = opts.cluster_count.max(1);
    if samples.len() < k {
        return Err(PlayglowError::InsufficientData {
            pixels: samples.len(),
            clusters: k,
        });
    }

    let (centroids, assignments) = kmeans(&samples, k, MAX_ITERATIONS);

    let mut members: Vec<Vec<[f64; 3]>> = vec![Vec::new(); k];
    for (sample, &cluster) in samples.iter().zip(assignments.iter()) {
        members[cluster].push(*sample);
    }

    let total = samples.len() as f64;
    Ok(centroids
        .into_iter()
        .zip(members.iter())
        .map(|(centroid, member_pixels)| ClusterStats {
            centroid,
            weight: member_pixels.len() as f64 / total,
            colorfulness: colorfulness(member_pixels),
        })
        .collect())
}

/// Extract the single most representative color of an image.
///
/// Picks the cluster with the highest colorfulness score; if even that score
/// is below `colorfulness_tolerance`, returns [`Rgb::NEUTRAL_GRAY`] instead.
pub fn dominant_color(image: &RgbImage, opts: &ExtractOptions) -> Result<Rgb> {
    let clusters = analyze(image, opts)?;
    let Some(best) = clusters.iter().max_by(|a, b| {
        a.colorfulness
            .partial_cmp(&b.colorfulness)
            .unwrap_or(Ordering::Equal)
    }) else {
        return Ok(Rgb::NEUTRAL_GRAY);
    };
    if best.colorfulness < opts.colorfulness_tolerance {
        Ok(Rgb::NEUTRAL_GRAY)
    } else {
        Ok(best.color())
    }
}

/// Load an image file into an RGB buffer.
pub fn load_image(path: &std::path::Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| {
        PlayglowError::Io(std::io::Error::other(format!("{}: {e}", path.display())))
    })?;
    Ok(img.to_rgb8())
}

/// Flatten the image into RGB samples, resampling first when requested.
fn collect_samples(image: &RgbImage, resize_to: Option<(u32, u32)>) -> Vec<[f64; 3]> {
    let resized;
    let source = match resize_to {
        Some((w, h)) if w > 0 && h > 0 && (image.width() != w || image.height() != h) => {
            resized = image::imageops::resize(image, w, h, FilterType::Triangle);
            &resized
        }
        _ => image,
    };
    source
        .pixels()
        .map(|p| [p.0[0] as f64, p.0[1] as f64, p.0[2] as f64])
        .collect()
}

/// Plain k-means over RGB samples with deterministic strided initialization.
///
/// Returns the final centroids and the per-sample cluster assignments.
/// Clusters that empty out mid-run are re-seeded from the sample set.
fn kmeans(samples: &[[f64; 3]], k: usize, max_iter: usize) -> (Vec<[f64; 3]>, Vec<usize>) {
    let mut centroids: Vec<[f64; 3]> = (0..k)
        .map(|i| samples[(i * samples.len() / k).min(samples.len() - 1)])
        .collect();
    let mut assignments = vec![0usize; samples.len()];

    for iter in 0..max_iter {
        let mut sums = vec![[0f64; 3]; k];
        let mut counts = vec![0usize; k];

        for (sample_idx, sample) in samples.iter().enumerate() {
            let mut best = 0usize;
            let mut best_dist = f64::MAX;
            for (centroid_idx, centroid) in centroids.iter().enumerate() {
                let dist = squared_distance(sample, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = centroid_idx;
                }
            }
            assignments[sample_idx] = best;
            for channel in 0..3 {
                sums[best][channel] += sample[channel];
            }
            counts[best] += 1;
        }

        let mut changed = false;
        for i in 0..k {
            if counts[i] == 0 {
                centroids[i] = samples[(i + iter) % samples.len()];
                continue;
            }
            let next = [
                sums[i][0] / counts[i] as f64,
                sums[i][1] / counts[i] as f64,
                sums[i][2] / counts[i] as f64,
            ];
            if squared_distance(&centroids[i], &next) > CONVERGENCE_EPSILON {
                changed = true;
            }
            centroids[i] = next;
        }

        if !changed {
            break;
        }
    }

    (centroids, assignments)
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr * dr + dg * dg + db * db
}
