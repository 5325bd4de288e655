// ============================================================
// Layer 3 — DensityMap Domain Type
// ============================================================
// A row-major 2-D grid of non-negative floats. Each value is the
// fraction of a person "spread" onto that pixel, so the sum over
// the whole map is the number of people in the image.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityMap {
    pub height: usize,
    pub width:  usize,
    /// Row-major values, `values[y * width + x]`
    pub values: Vec<f32>,
}

impl DensityMap {
    /// Build a map from row-major values.
    /// Returns None if `values.len() != height * width`.
    pub fn new(height: usize, width: usize, values: Vec<f32>) -> Option<Self> {
        if values.len() != height * width {
            return None;
        }
        Some(Self { height, width, values })
    }

    pub fn zeros(height: usize, width: usize) -> Self {
        Self { height, width, values: vec![0.0; height * width] }
    }

    #[inline]
    pub fn get(&self, y: usize, x: usize) -> f32 {
        self.values[y * self.width + x]
    }

    /// Estimated number of people: the sum of every pixel.
    /// Accumulated in f64 so large maps don't lose precision.
    pub fn count(&self) -> f64 {
        self.values.iter().map(|&v| v as f64).sum()
    }

    pub fn scale(mut self, factor: f32) -> Self {
        self.values.iter_mut().for_each(|v| *v *= factor);
        self
    }

    pub fn max_value(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }
}
