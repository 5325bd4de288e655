// ============================================================
// Layer 3 — Best Metric Record
// ============================================================
// The lowest test MAE ever reached for each dataset part.
// A run only checkpoints when it beats the value for its part.
//
// Serialised form (best_vals.txt):
//   {"best_mae_a": 68.2, "best_mae_b": 10.6}
//
// A missing or null entry means nothing has been recorded yet.

use serde::{Deserialize, Serialize};

use crate::domain::part::DatasetPart;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BestVals {
    #[serde(default)]
    pub best_mae_a: Option<f64>,
    #[serde(default)]
    pub best_mae_b: Option<f64>,
}

impl BestVals {
    pub fn new(best_mae_a: Option<f64>, best_mae_b: Option<f64>) -> Self {
        Self { best_mae_a, best_mae_b }
    }

    pub fn get(&self, part: DatasetPart) -> Option<f64> {
        match part {
            DatasetPart::A => self.best_mae_a,
            DatasetPart::B => self.best_mae_b,
        }
    }

    /// Replace the value for `part`, leaving the other part untouched.
    pub fn with(mut self, part: DatasetPart, mae: Option<f64>) -> Self {
        match part {
            DatasetPart::A => self.best_mae_a = mae,
            DatasetPart::B => self.best_mae_b = mae,
        }
        self
    }

    /// True if `mae` is strictly lower than the recorded best for `part`.
    /// With nothing recorded, any finite MAE is an improvement.
    pub fn is_improvement(&self, part: DatasetPart, mae: f64) -> bool {
        if !mae.is_finite() {
            return false;
        }
        match self.get(part) {
            Some(best) => mae < best,
            None => true,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_keeps_other_part() {
        let vals = BestVals::new(Some(90.0), Some(20.0)).with(DatasetPart::A, Some(80.0));
        assert_eq!(vals.get(DatasetPart::A), Some(80.0));
        assert_eq!(vals.get(DatasetPart::B), Some(20.0));
    }

    #[test]
    fn test_is_improvement() {
        let vals = BestVals::new(Some(90.0), None);
        assert!(vals.is_improvement(DatasetPart::A, 89.9));
        assert!(!vals.is_improvement(DatasetPart::A, 90.0));
        // Nothing recorded for B yet
        assert!(vals.is_improvement(DatasetPart::B, 1e6));
        assert!(!vals.is_improvement(DatasetPart::B, f64::NAN));
    }

    #[test]
    fn test_reads_plain_number_format() {
        let vals: BestVals =
            serde_json::from_str(r#"{"best_mae_a": 70.5, "best_mae_b": 11.25}"#).unwrap();
        assert_eq!(vals, BestVals::new(Some(70.5), Some(11.25)));

        let partial: BestVals = serde_json::from_str(r#"{"best_mae_b": null}"#).unwrap();
        assert_eq!(partial, BestVals::default());
    }
}
