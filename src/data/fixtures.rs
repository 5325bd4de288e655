//! Tiny on-disk datasets for tests.

use std::path::Path;

use ndarray::Array2;

use crate::domain::part::{DatasetPart, Split};

/// Write `count` solid-colour JPEGs of `size x size` pixels and matching
/// uniform `.npy` density maps into `{root}/part_X_final/{split}/`.
pub fn write_split(root: &Path, part: DatasetPart, split: Split, count: usize, size: u32) {
    let split_dir = root.join(part.dir_name()).join(split.dir_name());
    let images = split_dir.join("images");
    let gts = split_dir.join("ground-truth");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::create_dir_all(&gts).unwrap();

    for i in 0..count {
        let shade = (i as u8).wrapping_mul(40).wrapping_add(60);
        image::RgbImage::from_pixel(size, size, image::Rgb([shade, shade / 2, 200]))
            .save(images.join(format!("IMG_{}.jpg", i + 1)))
            .unwrap();

        let density = Array2::<f32>::from_elem((size as usize, size as usize), 0.01 * (i + 1) as f32);
        ndarray_npy::write_npy(gts.join(format!("IMG_{}.npy", i + 1)), &density).unwrap();
    }
}

/// Train and test splits for one part.
pub fn write_part(root: &Path, part: DatasetPart, train: usize, test: usize) {
    write_split(root, part, Split::Train, train, 16);
    write_split(root, part, Split::Test, test, 16);
}
