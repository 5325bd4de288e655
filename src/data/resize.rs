// ============================================================
// Layer 4 — Bicubic Density Downsampling
// ============================================================
// The network predicts one value per 8x8 block of input pixels,
// so ground truth is shrunk to (floor(W/8), floor(H/8)) and then
// multiplied by 64 to keep the total count unchanged.
//
// Interpolation matches OpenCV's INTER_CUBIC on float input:
//   - source coordinate: sx = (dx + 0.5) * (src / dst) - 0.5
//   - Keys cubic kernel with a = -0.75
//   - taps outside the image are clamped to the border
//
// The pass is separable: rows first, then columns.
//
// Note: image::imageops::resize clamps
// f32 samples into [0, 1] and its CatmullRom filter is a = -0.5.

use crate::domain::density_map::DensityMap;

const CUBIC_A: f32 = -0.75;

/// Factor between input pixels and output density cells
pub const DOWNSAMPLE: usize = 8;

/// The four Keys weights for fractional offset `fx` in [0, 1).
fn cubic_coeffs(fx: f32) -> [f32; 4] {
    let a = CUBIC_A;
    let x = fx + 1.0;
    let w0 = ((a * x - 5.0 * a) * x + 8.0 * a) * x - 4.0 * a;
    let w1 = ((a + 2.0) * fx - (a + 3.0)) * fx * fx + 1.0;
    let x = 1.0 - fx;
    let w2 = ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0;
    let w3 = 1.0 - w0 - w1 - w2;
    [w0, w1, w2, w3]
}

/// Precomputed source taps for every destination index along one axis.
fn axis_taps(src_len: usize, dst_len: usize) -> Vec<([usize; 4], [f32; 4])> {
    let scale = src_len as f32 / dst_len as f32;
    let last = src_len as isize - 1;
    (0..dst_len)
        .map(|d| {
            let fx = (d as f32 + 0.5) * scale - 0.5;
            let sx = fx.floor();
            let coeffs = cubic_coeffs(fx - sx);
            let sx = sx as isize;
            let mut idx = [0usize; 4];
            for (k, slot) in idx.iter_mut().enumerate() {
                *slot = (sx - 1 + k as isize).clamp(0, last) as usize;
            }
            (idx, coeffs)
        })
        .collect()
}

/// Resize `map` to `out_h x out_w` with OpenCV-style bicubic interpolation.
/// Both output dimensions must be non-zero.
pub fn resize_cubic(map: &DensityMap, out_h: usize, out_w: usize) -> DensityMap {
    debug_assert!(out_h > 0 && out_w > 0);
    if map.height == 0 || map.width == 0 {
        return DensityMap::zeros(out_h, out_w);
    }

    // Horizontal pass: [height, width] → [height, out_w]
    let x_taps = axis_taps(map.width, out_w);
    let mut rows = vec![0.0f32; map.height * out_w];
    for y in 0..map.height {
        let src = &map.values[y * map.width..(y + 1) * map.width];
        let dst = &mut rows[y * out_w..(y + 1) * out_w];
        for (out, (idx, w)) in dst.iter_mut().zip(&x_taps) {
            *out = src[idx[0]] * w[0] + src[idx[1]] * w[1] + src[idx[2]] * w[2] + src[idx[3]] * w[3];
        }
    }

    // Vertical pass: [height, out_w] → [out_h, out_w]
    let y_taps = axis_taps(map.height, out_h);
    let mut values = vec![0.0f32; out_h * out_w];
    for (dy, (idx, w)) in y_taps.iter().enumerate() {
        for x in 0..out_w {
            values[dy * out_w + x] = rows[idx[0] * out_w + x] * w[0]
                + rows[idx[1] * out_w + x] * w[1]
                + rows[idx[2] * out_w + x] * w[2]
                + rows[idx[3] * out_w + x] * w[3];
        }
    }

    DensityMap { height: out_h, width: out_w, values }
}

/// Output size of a `height x width` map after downsampling by `factor`.
/// None if either side would collapse to zero.
pub fn downsampled_dims(height: usize, width: usize, factor: usize) -> Option<(usize, usize)> {
    let (h, w) = (height / factor, width / factor);
    (h > 0 && w > 0).then_some((h, w))
}

/// Shrink by `factor` in both dimensions and multiply by `factor²`
/// so that the count survives the resize.
pub fn downsample_density(map: &DensityMap, factor: usize) -> Option<DensityMap> {
    let (h, w) = downsampled_dims(map.height, map.width, factor)?;
    Some(resize_cubic(map, h, w).scale((factor * factor) as f32))
}
