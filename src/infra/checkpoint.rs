// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores model weights as gzip'd MessagePack records
// at full f32 precision.
//
// File naming convention:
//   checkpoints/
//     part_A_best_model_10.mpk.gz  ← weights that beat the best MAE
//     part_A_best.json             ← which of those files is current
//     part_A_config.json           ← TrainConfig of the run
//     part_B_...                   ← same for part B
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{FullPrecisionSettings, NamedMpkGzFileRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::domain::part::DatasetPart;
use crate::ml::model::CsrNet;

/// Pointer to the checkpoint holding the best weights of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestCheckpoint {
    pub part:   DatasetPart,
    /// File name without the recorder extension
    pub stem:   String,
    pub epochs: usize,
    pub mae:    f64,
}

/// `part_A_best_model_10`
pub fn best_model_stem(part: DatasetPart, epochs: usize) -> String {
    format!("part_{}_best_model_{}", part.label(), epochs)
}

type CheckpointRecorder = NamedMpkGzFileRecorder<FullPrecisionSettings>;

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a manager rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", dir.display()))?;
        Ok(Self { dir })
    }

    /// Open an existing checkpoint directory without creating it.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            anyhow::bail!(
                "Checkpoint directory '{}' does not exist. Have you run 'train' first?",
                dir.display()
            );
        }
        Ok(Self { dir })
    }

    /// Write the weights to `{dir}/{stem}.mpk.gz` and return the path
    /// handed to the recorder (without extension).
    pub fn save_model<B: Backend>(&self, model: &CsrNet<B>, stem: &str) -> Result<PathBuf> {
        let path = self.dir.join(stem);

        CheckpointRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))?;

        tracing::debug!("Saved weights to '{}'", path.display());
        Ok(path)
    }

    /// Load the weights stored under `stem` into `model`.
    /// The architecture of `model` must match the saved one.
    pub fn load_model<B: Backend>(
        &self,
        model:  CsrNet<B>,
        stem:   &str,
        device: &B::Device,
    ) -> Result<CsrNet<B>> {
        let path = self.dir.join(stem);

        let record = CheckpointRecorder::new()
            .load(path.clone(), device)
            .with_context(|| format!("Cannot load checkpoint '{}'", path.display()))?;

        Ok(model.load_record(record))
    }

    fn config_path(&self, part: DatasetPart) -> PathBuf {
        self.dir.join(format!("part_{}_config.json", part.label()))
    }

    fn best_path(&self, part: DatasetPart) -> PathBuf {
        self.dir.join(format!("part_{}_best.json", part.label()))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        let path = self.config_path(cfg.part);
        let json = serde_json::to_string_pretty(cfg)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }

    pub fn load_config(&self, part: DatasetPart) -> Result<TrainConfig> {
        let path = self.config_path(part);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "Cannot read config from '{}'. Make sure you have trained part {} first.",
                path.display(),
                part
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed config '{}'", path.display()))
    }

    /// Point `part_X_best.json` at a freshly saved checkpoint.
    pub fn record_best(&self, best: &BestCheckpoint) -> Result<()> {
        let path = self.best_path(best.part);
        fs::write(&path, serde_json::to_string_pretty(best)?)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        Ok(())
    }

    pub fn best_checkpoint(&self, part: DatasetPart) -> Result<BestCheckpoint> {
        let path = self.best_path(part);
        let json = fs::read_to_string(&path).with_context(|| {
            format!(
                "No best checkpoint recorded for part {} ('{}' is missing)",
                part,
                path.display()
            )
        })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed checkpoint pointer '{}'", path.display()))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::CsrNetConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_stem_naming() {
        assert_eq!(best_model_stem(DatasetPart::A, 10), "part_A_best_model_10");
    }

    #[test]
    fn test_model_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        let device = Default::default();
        let cfg = CsrNetConfig::new().with_width_divisor(64);

        let model: CsrNet<NdArray> = cfg.init(&device);
        manager.save_model(&model, "part_B_best_model_1").unwrap();
        assert!(dir.path().join("part_B_best_model_1.mpk.gz").is_file());

        let image = Tensor::<NdArray, 4>::ones([1, 3, 16, 16], &device);
        let expected = model.forward(image.clone()).sum().into_scalar().elem::<f64>();

        let fresh: CsrNet<NdArray> = cfg.init(&device);
        let loaded = manager.load_model(fresh, "part_B_best_model_1", &device).unwrap();
        let got = loaded.forward(image).sum().into_scalar().elem::<f64>();
        assert!((expected - got).abs() < 1e-6);
    }

    #[test]
    fn test_best_pointer_per_part() {
        let dir = tempfile::tempdir().unwrap();
        let manager = CheckpointManager::new(dir.path()).unwrap();
        let best = BestCheckpoint {
            part: DatasetPart::A,
            stem: best_model_stem(DatasetPart::A, 3),
            epochs: 3,
            mae: 71.5,
        };
        manager.record_best(&best).unwrap();
        assert_eq!(manager.best_checkpoint(DatasetPart::A).unwrap(), best);
        assert!(manager.best_checkpoint(DatasetPart::B).is_err());
    }

    #[test]
    fn test_open_requires_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CheckpointManager::open(dir.path().join("missing")).is_err());
        assert!(CheckpointManager::open(dir.path()).is_ok());
    }
}
