// ============================================================
// Layer 4 — Sample Listing
// ============================================================
// Walks one split of one dataset part and pairs every image
// with its ground-truth file.
//
//   part_A_final/train_data/images/IMG_12.jpg
//   part_A_final/train_data/ground-truth/IMG_12.npy
//
// Only paths are collected here. Pixels and density maps are
// read later, one sample at a time, by CrowdBatcher::batch.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::data::error::{DataError, DataResult};
use crate::domain::part::{DatasetPart, Split};

const IMAGES_DIR: &str = "images";
const GROUND_TRUTH_DIR: &str = "ground-truth";

/// An image and the ground-truth file that belongs to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub image:        PathBuf,
    pub ground_truth: PathBuf,
}

/// Map an image path to its ground-truth path: the `images`
/// directory becomes `ground-truth` and the extension becomes `gt_ext`.
pub fn ground_truth_path(image: &Path, gt_ext: &str) -> DataResult<PathBuf> {
    let not_in_images = || DataError::NotInImagesDir { path: image.to_path_buf() };

    let images_dir = image.parent().ok_or_else(not_in_images)?;
    if images_dir.file_name().and_then(|n| n.to_str()) != Some(IMAGES_DIR) {
        return Err(not_in_images());
    }
    let file_name = image.file_name().ok_or_else(not_in_images)?;
    let split_dir = images_dir.parent().unwrap_or_else(|| Path::new(""));

    Ok(split_dir
        .join(GROUND_TRUTH_DIR)
        .join(file_name)
        .with_extension(gt_ext))
}

fn is_jpeg(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
        .unwrap_or(false)
}

/// Lists image/ground-truth pairs under a dataset root.
pub struct SampleLoader {
    root:   PathBuf,
    gt_ext: &'static str,
}

impl SampleLoader {
    pub fn new(root: impl Into<PathBuf>, gt_ext: &'static str) -> Self {
        Self { root: root.into(), gt_ext }
    }

    /// `{root}/part_X_final/{train_data|test_data}/images`
    pub fn images_dir(&self, part: DatasetPart, split: Split) -> PathBuf {
        self.root
            .join(part.dir_name())
            .join(split.dir_name())
            .join(IMAGES_DIR)
    }

    /// All pairs of one split, sorted by image path.
    /// Images without a ground-truth file are skipped with a warning.
    pub fn list(&self, part: DatasetPart, split: Split) -> Result<Vec<SamplePaths>> {
        let dir = self.images_dir(part, split);

        let mut images = Vec::new();
        for entry in fs::read_dir(&dir)
            .with_context(|| format!("Cannot read image directory '{}'", dir.display()))?
        {
            let path = entry
                .map_err(|source| DataError::Io { path: dir.clone(), source })?
                .path();
            if path.is_file() && is_jpeg(&path) {
                images.push(path);
            }
        }
        images.sort();

        let mut pairs = Vec::with_capacity(images.len());
        for image in images {
            let ground_truth = ground_truth_path(&image, self.gt_ext)?;
            if !ground_truth.is_file() {
                tracing::warn!(
                    "Skipping '{}': no ground truth at '{}'",
                    image.display(),
                    ground_truth.display()
                );
                continue;
            }
            tracing::debug!("Listed {}", image.display());
            pairs.push(SamplePaths { image, ground_truth });
        }

        tracing::info!(
            "Part {} {}: {} samples in '{}'",
            part,
            split.dir_name(),
            pairs.len(),
            dir.display()
        );
        Ok(pairs)
    }
}
