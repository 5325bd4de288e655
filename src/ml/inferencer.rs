// ============================================================
// Layer 5 — Inferencer
// ============================================================
// Rebuilds the network of a part from its saved TrainConfig,
// loads the best checkpoint into it, and predicts density maps.

use std::path::Path;

use anyhow::{bail, Context, Result};
use burn::prelude::*;

use crate::data::decode::load_image;
use crate::data::resize::{downsampled_dims, DOWNSAMPLE};
use crate::domain::density_map::DensityMap;
use crate::domain::part::DatasetPart;
use crate::domain::traits::CrowdCounter;
use crate::infra::checkpoint::{BestCheckpoint, CheckpointManager};
use crate::ml::model::{CsrNet, CsrNetConfig};

pub struct Inferencer<B: Backend> {
    model:      CsrNet<B>,
    checkpoint: BestCheckpoint,
    device:     B::Device,
}

impl<B: Backend> Inferencer<B> {
    pub fn from_checkpoint(
        ckpt_manager: &CheckpointManager,
        part:         DatasetPart,
        device:       B::Device,
    ) -> Result<Self> {
        let cfg  = ckpt_manager.load_config(part)?;
        let best = ckpt_manager.best_checkpoint(part)?;

        let model: CsrNet<B> = CsrNetConfig::new()
            .with_width_divisor(cfg.width_divisor)
            .init(&device);
        let model = ckpt_manager.load_model(model, &best.stem, &device)?;

        tracing::info!(
            "Loaded '{}' (part {}, {} epochs, test MAE {:.5})",
            best.stem, part, best.epochs, best.mae
        );
        Ok(Self { model, checkpoint: best, device })
    }

    pub fn model(&self) -> &CsrNet<B> {
        &self.model
    }

    pub fn checkpoint(&self) -> &BestCheckpoint {
        &self.checkpoint
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    /// image: [1, 3, H, W] → density map of shape [H/8, W/8]
    pub fn predict(&self, image: Tensor<B, 4>) -> Result<DensityMap> {
        let density = self.model.forward_density(image);
        let [height, width] = density.dims();
        let values = density
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| anyhow::anyhow!("Cannot read prediction: {e:?}"))?;
        DensityMap::new(height, width, values)
            .context("Prediction has an unexpected number of values")
    }
}

impl<B: Backend> CrowdCounter for Inferencer<B> {
    fn density(&self, path: &Path) -> Result<DensityMap> {
        let image = load_image(path)?;
        if downsampled_dims(image.height, image.width, DOWNSAMPLE).is_none() {
            bail!(
                "'{}' is {}x{}; both sides must be at least {} pixels",
                path.display(),
                image.width,
                image.height,
                DOWNSAMPLE
            );
        }
        let tensor = Tensor::<B, 4>::from_data(
            TensorData::new(image.pixels, [1, 3, image.height, image.width]),
            &self.device,
        );
        self.predict(tensor)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::TrainConfig;
    use crate::infra::checkpoint::best_model_stem;
    use burn::backend::NdArray;

    fn saved_inferencer(dir: &Path) -> Inferencer<NdArray> {
        let manager = CheckpointManager::new(dir).unwrap();
        let device = Default::default();

        let cfg = TrainConfig { part: DatasetPart::B, width_divisor: 64, ..TrainConfig::default() };
        manager.save_config(&cfg).unwrap();

        let model: CsrNet<NdArray> = CsrNetConfig::new().with_width_divisor(64).init(&device);
        let stem = best_model_stem(DatasetPart::B, 1);
        manager.save_model(&model, &stem).unwrap();
        manager
            .record_best(&BestCheckpoint { part: DatasetPart::B, stem, epochs: 1, mae: 3.0 })
            .unwrap();

        Inferencer::from_checkpoint(&manager, DatasetPart::B, device).unwrap()
    }

    fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn test_density_has_output_stride_shape() {
        let dir = tempfile::tempdir().unwrap();
        let inferencer = saved_inferencer(dir.path());
        let image_path = write_jpeg(dir.path(), "crowd.jpg", 24, 16);

        let map = inferencer.density(&image_path).unwrap();
        assert_eq!((map.height, map.width), (2, 3));
        assert_eq!(inferencer.checkpoint().epochs, 1);
    }

    #[test]
    fn test_image_smaller_than_stride_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let inferencer = saved_inferencer(dir.path());
        let image_path = write_jpeg(dir.path(), "tiny.jpg", 4, 4);

        let err = inferencer.density(&image_path).unwrap_err();
        assert!(err.to_string().contains("at least 8 pixels"));
    }

    #[test]
    fn test_missing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        assert!(Inferencer::<NdArray>::from_checkpoint(&manager, DatasetPart::A, Default::default()).is_err());
    }
}
