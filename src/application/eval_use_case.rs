// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Uses the best checkpoint of a part after training:
//   evaluate() → MAE / RMSE over the part's test split
//   count()    → estimated head count of a single image

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use crate::data::{
    batcher::{build_loader, CrowdBatcher},
    dataset::CrowdDataset,
    ground_truth::GroundTruthFormat,
    loader::SampleLoader,
};
use crate::domain::part::{DatasetPart, Split};
use crate::domain::traits::CrowdCounter;
use crate::infra::{checkpoint::CheckpointManager, heatmap::save_heatmap};
use crate::ml::backend::{default_device, InferBackend};
use crate::ml::evaluator::{evaluate, CountMetrics};
use crate::ml::inferencer::Inferencer;

#[derive(Debug, Clone)]
pub struct EvalConfig {
    pub part:        DatasetPart,
    pub data_root:   String,
    pub gt_format:   GroundTruthFormat,
    pub num_workers: usize,
}

/// Result of counting one image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountReport {
    pub count:  f64,
    pub height: usize,
    pub width:  usize,
}

pub struct EvalUseCase {
    inferencer: Inferencer<InferBackend>,
}

impl EvalUseCase {
    /// Load the best checkpoint recorded for `part` in `checkpoint_dir`.
    pub fn new(checkpoint_dir: impl Into<PathBuf>, part: DatasetPart) -> Result<Self> {
        let ckpt_manager = CheckpointManager::open(checkpoint_dir)?;
        let inferencer = Inferencer::from_checkpoint(&ckpt_manager, part, default_device())?;
        Ok(Self { inferencer })
    }

    pub fn inferencer(&self) -> &Inferencer<InferBackend> {
        &self.inferencer
    }

    /// Count MAE / RMSE over the test split of `cfg.part`.
    pub fn evaluate(&self, cfg: &EvalConfig) -> Result<CountMetrics> {
        let reader  = cfg.gt_format.reader()?;
        let loader  = SampleLoader::new(&cfg.data_root, reader.extension());
        let samples = loader.list(cfg.part, Split::Test)?;
        if samples.is_empty() {
            bail!("No test samples found for part {} under '{}'", cfg.part, cfg.data_root);
        }

        let batcher = CrowdBatcher::<InferBackend>::new(reader, self.inferencer.device().clone());
        let test_loader = build_loader(batcher, CrowdDataset::new(samples), None, cfg.num_workers);

        match evaluate(self.inferencer.model(), test_loader.iter()) {
            Some(metrics) => Ok(metrics),
            None => bail!("No test sample of part {} could be loaded", cfg.part),
        }
    }

    /// Count the people in one image, optionally writing the predicted
    /// density map as a grayscale PNG.
    pub fn count(&self, image: &Path, heatmap: Option<&Path>) -> Result<CountReport> {
        let map = self.inferencer.density(image)?;
        if let Some(out) = heatmap {
            save_heatmap(&map, out)?;
        }
        Ok(CountReport { count: map.count(), height: map.height, width: map.width })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};
    use crate::data::fixtures;

    #[test]
    fn test_train_then_eval_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let data_root = dir.path().join("data");
        fixtures::write_part(&data_root, DatasetPart::B, 2, 2);

        let train_cfg = TrainConfig {
            part: DatasetPart::B,
            data_root: data_root.to_string_lossy().into_owned(),
            checkpoint_dir: dir.path().join("ckpt").to_string_lossy().into_owned(),
            best_vals_path: dir.path().join("best_vals.txt").to_string_lossy().into_owned(),
            epochs: 1,
            width_divisor: 64,
            num_workers: 0,
            ..TrainConfig::default()
        };
        let outcome = TrainUseCase::new(train_cfg.clone()).execute().unwrap();
        let trained_mae = outcome.history[0].test_mae;

        let use_case = EvalUseCase::new(&train_cfg.checkpoint_dir, DatasetPart::B).unwrap();
        let metrics = use_case
            .evaluate(&EvalConfig {
                part: DatasetPart::B,
                data_root: train_cfg.data_root.clone(),
                gt_format: GroundTruthFormat::Npy,
                num_workers: 0,
            })
            .unwrap();
        assert_eq!(metrics.samples, 2);
        assert!((metrics.mae - trained_mae).abs() < 1e-4);

        let image = data_root.join("part_B_final/test_data/images/IMG_1.jpg");
        let heatmap = dir.path().join("density.png");
        let report = use_case.count(&image, Some(&heatmap)).unwrap();
        assert_eq!((report.height, report.width), (2, 2));
        assert!(heatmap.is_file());
    }

    #[test]
    fn test_untrained_part_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(EvalUseCase::new(dir.path(), DatasetPart::A).is_err());
    }
}
