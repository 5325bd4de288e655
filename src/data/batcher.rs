// ============================================================
// Layer 4 — Crowd Batcher
// ============================================================
// Implements Burn's Batcher trait: turns the SamplePaths handed
// out by the DataLoader into tensors on the target device.
//
// This is where the lazy loading happens. DataLoader workers call
// batch() on their own threads, so JPEG decoding and ground-truth
// resizing overlap with the training step.
//
// Crowd images all have different sizes, so samples are not
// stacked. Each sample keeps its own tensors:
//   image:   [1, 3, H, W]
//   density: [H/8, W/8]
// A sample that fails to load is logged and left out of the batch.
//
// Reference: Burn Book §4 (Batcher)

use std::path::PathBuf;
use std::sync::Arc;

use burn::{
    data::dataloader::{batcher::Batcher, DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::dataset::{load_sample, CrowdDataset, DensitySample};
use crate::data::loader::SamplePaths;
use crate::domain::traits::GroundTruthReader;

/// A single image and its downsampled ground truth, on device.
#[derive(Debug, Clone)]
pub struct DensityItem<B: Backend> {
    /// Normalised pixels, shape [1, 3, H, W]
    pub image: Tensor<B, 4>,

    /// Target density, shape [H/8, W/8]
    pub density: Tensor<B, 2>,

    /// Ground-truth head count (sum of `density`)
    pub count: f64,

    pub source: PathBuf,
}

impl<B: Backend> DensityItem<B> {
    pub fn from_sample(sample: DensitySample, source: PathBuf, device: &B::Device) -> Self {
        let count = sample.count();
        let DensitySample { image, density } = sample;

        let image = Tensor::<B, 4>::from_data(
            TensorData::new(image.pixels, [1, 3, image.height, image.width]),
            device,
        );
        let density = Tensor::<B, 2>::from_data(
            TensorData::new(density.values, [density.height, density.width]),
            device,
        );
        Self { image, density, count, source }
    }
}

#[derive(Debug, Clone)]
pub struct DensityBatch<B: Backend> {
    pub items: Vec<DensityItem<B>>,
}

#[derive(Clone)]
pub struct CrowdBatcher<B: Backend> {
    reader: Arc<dyn GroundTruthReader>,
    device: B::Device,
}

impl<B: Backend> CrowdBatcher<B> {
    pub fn new(reader: Arc<dyn GroundTruthReader>, device: B::Device) -> Self {
        Self { reader, device }
    }
}

impl<B: Backend> Batcher<SamplePaths, DensityBatch<B>> for CrowdBatcher<B> {
    fn batch(&self, items: Vec<SamplePaths>) -> DensityBatch<B> {
        let items = items
            .into_iter()
            .filter_map(|paths| match load_sample(&paths, self.reader.as_ref()) {
                Ok(sample) => Some(DensityItem::from_sample(sample, paths.image, &self.device)),
                Err(e) => {
                    tracing::error!("Failed to load '{}': {:#}", paths.image.display(), e);
                    None
                }
            })
            .collect();
        DensityBatch { items }
    }
}

// ─── Loader Construction ──────────────────────────────────────────────────────
/// One image per batch. `shuffle` reorders every epoch with that seed.
/// `num_workers == 0` keeps loading on the calling thread.
pub fn build_loader<B: Backend>(
    batcher:     CrowdBatcher<B>,
    dataset:     CrowdDataset,
    shuffle:     Option<u64>,
    num_workers: usize,
) -> Arc<dyn DataLoader<DensityBatch<B>>> {
    let mut builder = DataLoaderBuilder::new(batcher).batch_size(1);
    if let Some(seed) = shuffle {
        builder = builder.shuffle(seed);
    }
    if num_workers > 0 {
        builder = builder.num_workers(num_workers);
    }
    builder.build(dataset)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ground_truth::NpyReader;
    use crate::domain::density_map::DensityMap;
    use crate::data::decode::ImageChw;
    use crate::data::{fixtures, loader::SampleLoader};
    use crate::domain::part::{DatasetPart, Split};
    use burn::backend::NdArray;

    #[test]
    fn test_item_shapes() {
        let device = Default::default();
        let sample = DensitySample {
            image: ImageChw { height: 16, width: 8, pixels: vec![0.5; 3 * 16 * 8] },
            density: DensityMap::new(2, 1, vec![1.5, 0.5]).unwrap(),
        };
        let item = DensityItem::<NdArray>::from_sample(sample, "x.jpg".into(), &device);
        assert_eq!(item.image.dims(), [1, 3, 16, 8]);
        assert_eq!(item.density.dims(), [2, 1]);
        assert!((item.count - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreadable_samples_are_dropped() {
        let batcher = CrowdBatcher::<NdArray>::new(Arc::new(NpyReader), Default::default());
        let batch = batcher.batch(vec![SamplePaths {
            image: "/nonexistent/images/1.jpg".into(),
            ground_truth: "/nonexistent/ground-truth/1.npy".into(),
        }]);
        assert!(batch.items.is_empty());
    }

    fn load_split(num_workers: usize) -> Vec<String> {
        let dir = tempfile::tempdir().unwrap();
        fixtures::write_part(dir.path(), DatasetPart::B, 3, 1);
        let samples = SampleLoader::new(dir.path(), "npy").list(DatasetPart::B, Split::Train).unwrap();

        let batcher = CrowdBatcher::<NdArray>::new(Arc::new(NpyReader), Default::default());
        let loader = build_loader(batcher, CrowdDataset::new(samples), None, num_workers);
        let mut names: Vec<String> = loader
            .iter()
            .flat_map(|batch| batch.items)
            .map(|item| item.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_loader_without_workers() {
        assert_eq!(load_split(0), vec!["IMG_1.jpg", "IMG_2.jpg", "IMG_3.jpg"]);
    }

    #[test]
    fn test_loader_with_workers() {
        assert_eq!(load_split(2), vec!["IMG_1.jpg", "IMG_2.jpg", "IMG_3.jpg"]);
    }
}
