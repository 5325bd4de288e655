// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Appends one CSV row per epoch, one file per dataset part:
//
//   checkpoints/metrics_part_A.csv
//   epoch,train_loss,test_mae,test_rmse
//   1,0.000412,112.734100,160.220400
//   2,0.000377,98.120300,141.009200

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::PathBuf,
};
use serde::{Deserialize, Serialize};

use crate::domain::part::DatasetPart;

const HEADER: &str = "epoch,train_loss,test_mae,test_rmse";

/// One row of metrics data for a single training epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    /// Mean per-image MSE between predicted and target density maps
    pub train_loss: f64,

    /// Mean |predicted count - true count| over the test split
    pub test_mae: f64,

    /// sqrt(mean (predicted count - true count)²) over the test split
    pub test_rmse: f64,
}

impl EpochMetrics {
    pub fn new(epoch: usize, train_loss: f64, test_mae: f64, test_rmse: f64) -> Self {
        Self { epoch, train_loss, test_mae, test_rmse }
    }
}

pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Open (or create) `{dir}/metrics_part_X.csv`.
    /// The header is written only when the file is new, so repeated
    /// runs keep appending to the same log.
    pub fn new(dir: impl Into<PathBuf>, part: DatasetPart) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let csv_path = dir.join(format!("metrics_part_{}.csv", part.label()));
        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot append to '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6}",
            m.epoch, m.train_loss, m.test_mae, m.test_rmse,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: train_loss={:.6}, test_mae={:.4}",
            m.epoch,
            m.train_loss,
            m.test_mae,
        );
        Ok(())
    }

    pub fn csv_path(&self) -> &PathBuf {
        &self.csv_path
    }
}
