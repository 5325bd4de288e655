// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates one training run of one dataset part:
//
//   Step 1: Pick the ground-truth reader        (Layer 4 - data)
//   Step 2: List train and test samples         (Layer 4 - data)
//   Step 3: Build lazy Burn datasets            (Layer 4 - data)
//   Step 4: Open checkpoint / record / metrics  (Layer 6 - infra)
//   Step 5: Run the epoch loop + checkpointing  (Layer 5 - ml)
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::CrowdDataset,
    ground_truth::GroundTruthFormat,
    loader::SampleLoader,
};
use crate::domain::part::{DatasetPart, Split};
use crate::infra::{
    best_vals_store::BestValsStore,
    checkpoint::CheckpointManager,
    metrics::MetricsLogger,
};
use crate::ml::backend::TrainBackend;
use crate::ml::trainer::{run_training, FitOutcome};

/// When a run compares its test MAE against the recorded best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CheckpointPolicy {
    /// Only the MAE after the last epoch is compared
    Final,
    /// Every epoch is compared; each improvement is saved
    EveryEpoch,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All knobs for a training run. Saved next to each best checkpoint
// so `eval` and `count` can rebuild the same network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub part:              DatasetPart,
    pub data_root:         String,
    pub checkpoint_dir:    String,
    pub best_vals_path:    String,
    pub gt_format:         GroundTruthFormat,
    pub epochs:            usize,
    pub lr:                f64,
    pub width_divisor:     usize,
    pub seed:              u64,
    pub num_workers:       usize,
    pub checkpoint_policy: CheckpointPolicy,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            part:              DatasetPart::A,
            data_root:         "data/ShanghaiTech".to_string(),
            checkpoint_dir:    "checkpoints".to_string(),
            best_vals_path:    "best_vals.txt".to_string(),
            gt_format:         GroundTruthFormat::Npy,
            epochs:            10,
            lr:                1e-4,
            width_divisor:     1,
            seed:              42,
            num_workers:       2,
            checkpoint_policy: CheckpointPolicy::Final,
        }
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<FitOutcome<TrainBackend>> {
        let cfg = &self.config;
        if cfg.epochs == 0 {
            bail!("--epochs must be at least 1");
        }

        // ── Step 1: Ground-truth reader ───────────────────────────────────────
        let reader = cfg.gt_format.reader()?;

        // ── Step 2: List samples ──────────────────────────────────────────────
        let loader = SampleLoader::new(&cfg.data_root, reader.extension());
        let train_samples = loader.list(cfg.part, Split::Train)?;
        let test_samples  = loader.list(cfg.part, Split::Test)?;
        if train_samples.is_empty() {
            bail!("No training samples found for part {} under '{}'", cfg.part, cfg.data_root);
        }
        if test_samples.is_empty() {
            bail!("No test samples found for part {} under '{}'", cfg.part, cfg.data_root);
        }

        // ── Step 3: Lazy datasets ─────────────────────────────────────────────
        let train_dataset = CrowdDataset::new(train_samples);
        let test_dataset  = CrowdDataset::new(test_samples);

        // ── Step 4: Persistence ───────────────────────────────────────────────
        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir)?;
        let best_store = BestValsStore::new(&cfg.best_vals_path);
        let metrics    = MetricsLogger::new(&cfg.checkpoint_dir, cfg.part)?;

        // ── Step 5: Epoch loop ────────────────────────────────────────────────
        run_training(cfg, train_dataset, test_dataset, reader, &ckpt_manager, &best_store, &metrics)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_epochs_rejected() {
        let cfg = TrainConfig { epochs: 0, ..TrainConfig::default() };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_missing_dataset_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            data_root: dir.path().join("nope").to_string_lossy().into_owned(),
            checkpoint_dir: dir.path().join("ckpt").to_string_lossy().into_owned(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }

    #[test]
    fn test_config_roundtrips_as_json() {
        let cfg = TrainConfig { part: DatasetPart::B, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains(r#""checkpoint_policy":"final""#));
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.part, DatasetPart::B);
    }
}
