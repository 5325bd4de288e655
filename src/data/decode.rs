// ============================================================
// Layer 4 — Image Decoding
// ============================================================
// JPEG → 3-channel RGB → f32 in [0, 1], channels-first.
//
//   pixels[c * H * W + y * W + x] = rgb[y][x][c] / 255
//
// Channels-first is what burn's Conv2d expects ([N, C, H, W]).

use std::path::Path;

use image::RgbImage;

use crate::data::error::{DataError, DataResult};

/// A decoded image ready to become a [3, H, W] tensor.
#[derive(Debug, Clone)]
pub struct ImageChw {
    pub height: usize,
    pub width:  usize,
    pub pixels: Vec<f32>,
}

pub fn load_image(path: &Path) -> DataResult<ImageChw> {
    let img = image::open(path)
        .map_err(|source| DataError::Image { path: path.to_path_buf(), source })?
        .to_rgb8();
    Ok(rgb_to_chw(&img))
}

pub fn rgb_to_chw(img: &RgbImage) -> ImageChw {
    let (w, h) = (img.width() as usize, img.height() as usize);
    let plane = w * h;
    let mut pixels = vec![0.0f32; 3 * plane];
    for (x, y, px) in img.enumerate_pixels() {
        let offset = y as usize * w + x as usize;
        for c in 0..3 {
            pixels[c * plane + offset] = px[c] as f32 / 255.0;
        }
    }
    ImageChw { height: h, width: w, pixels }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_channels_first_layout() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([255, 0, 51]));
        img.put_pixel(1, 0, Rgb([0, 255, 0]));

        let chw = rgb_to_chw(&img);
        assert_eq!((chw.height, chw.width), (1, 2));
        // R plane, G plane, B plane
        assert_eq!(chw.pixels, vec![1.0, 0.0, 0.0, 1.0, 0.2, 0.0]);
    }

    #[test]
    fn test_missing_file_is_image_error() {
        let err = load_image(Path::new("/nonexistent/IMG_0.jpg")).unwrap_err();
        assert!(matches!(err, DataError::Image { .. }));
    }
}
