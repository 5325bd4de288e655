// ============================================================
// Layer 2 — BestUseCase
// ============================================================
// Inspect or clear the best-metric record (best_vals.txt).

use anyhow::Result;

use crate::domain::best_vals::BestVals;
use crate::domain::part::DatasetPart;
use crate::infra::best_vals_store::BestValsStore;

pub struct BestUseCase {
    store: BestValsStore,
}

impl BestUseCase {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { store: BestValsStore::new(path) }
    }

    pub fn show(&self) -> Result<BestVals> {
        self.store.load()
    }

    /// Forget the best MAE of `part` so the next run of that part
    /// checkpoints unconditionally.
    pub fn reset(&self, part: DatasetPart) -> Result<BestVals> {
        let vals = self.store.update(part, None)?;
        tracing::info!("Cleared best MAE for part {}", part);
        Ok(vals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_one_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_vals.txt");
        std::fs::write(&path, r#"{"best_mae_a": 65.0, "best_mae_b": 9.5}"#).unwrap();

        let use_case = BestUseCase::new(&path);
        let vals = use_case.reset(DatasetPart::A).unwrap();
        assert_eq!(vals, BestVals::new(None, Some(9.5)));
        assert_eq!(use_case.show().unwrap(), vals);
    }
}
