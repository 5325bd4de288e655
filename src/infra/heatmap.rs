use anyhow::{Context, Result};
use image::{GrayImage, Luma};
use std::path::Path;

use crate::domain::density_map::DensityMap;

/// Render a density map as 8-bit grayscale, scaled so the densest
/// cell is white. An all-zero map renders black.
pub fn to_grayscale(map: &DensityMap) -> GrayImage {
    let max = map.max_value();
    let scale = if max > 0.0 { 255.0 / max } else { 0.0 };
    GrayImage::from_fn(map.width as u32, map.height as u32, |x, y| {
        let v = map.get(y as usize, x as usize).max(0.0) * scale;
        Luma([v.round().min(255.0) as u8])
    })
}

pub fn save_heatmap(map: &DensityMap, path: &Path) -> Result<()> {
    to_grayscale(map)
        .save(path)
        .with_context(|| format!("Cannot write heatmap '{}'", path.display()))?;
    tracing::info!("Density heatmap written to '{}'", path.display());
    Ok(())
}
