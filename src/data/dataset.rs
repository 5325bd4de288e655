use anyhow::Result;
use burn::data::dataset::Dataset;

use crate::data::decode::{load_image, ImageChw};
use crate::data::error::DataError;
use crate::data::loader::SamplePaths;
use crate::data::resize::{downsample_density, DOWNSAMPLE};
use crate::domain::density_map::DensityMap;
use crate::domain::traits::GroundTruthReader;

/// One decoded training pair: the normalised image and its
/// ground truth already shrunk to the network's output grid.
#[derive(Debug, Clone)]
pub struct DensitySample {
    pub image:   ImageChw,
    pub density: DensityMap,
}

impl DensitySample {
    pub fn count(&self) -> f64 {
        self.density.count()
    }
}

/// Decode the image, read its density map, check that they line up,
/// then downsample the map by 8 (count-preserving).
pub fn load_sample(paths: &SamplePaths, reader: &dyn GroundTruthReader) -> Result<DensitySample> {
    let image = load_image(&paths.image)?;
    let full = reader.read(&paths.ground_truth)?;

    if (full.height, full.width) != (image.height, image.width) {
        return Err(DataError::ShapeMismatch {
            path: paths.ground_truth.clone(),
            gt_height: full.height,
            gt_width: full.width,
            height: image.height,
            width: image.width,
        }
        .into());
    }

    let density = downsample_density(&full, DOWNSAMPLE).ok_or_else(|| DataError::TooSmall {
        path: paths.ground_truth.clone(),
        height: full.height,
        width: full.width,
        factor: DOWNSAMPLE,
    })?;

    Ok(DensitySample { image, density })
}

/// A split of the dataset. Holds only paths; CrowdBatcher decodes
/// each sample when the DataLoader asks for it.
pub struct CrowdDataset {
    samples: Vec<SamplePaths>,
}

impl CrowdDataset {
    pub fn new(samples: Vec<SamplePaths>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

impl Dataset<SamplePaths> for CrowdDataset {
    fn get(&self, index: usize) -> Option<SamplePaths> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}
