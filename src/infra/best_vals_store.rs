// ============================================================
// Layer 6 — Best Metric Store
// ============================================================
// Persists BestVals as a small JSON file (best_vals.txt by default):
//
//   {"best_mae_a":68.2,"best_mae_b":10.6}
//
// load()  → read the record; a missing file means nothing recorded
// reset() → overwrite the whole record
//
// Python's json.dump writes float('inf') / float('nan') as the bare
// tokens Infinity / NaN. Those entries load as null (nothing recorded).

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::best_vals::BestVals;
use crate::domain::part::DatasetPart;

pub struct BestValsStore {
    path: PathBuf,
}

impl BestValsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<BestVals> {
        if !self.path.exists() {
            tracing::info!(
                "No best-metric record at '{}'; any MAE will count as an improvement",
                self.path.display()
            );
            return Ok(BestVals::default());
        }
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read '{}'", self.path.display()))?;
        let (json, replaced) = null_non_finite(&json);
        if replaced {
            tracing::warn!(
                "'{}' holds non-finite values; treating them as not recorded",
                self.path.display()
            );
        }
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed best-metric record '{}'", self.path.display()))
    }

    pub fn reset(&self, vals: &BestVals) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(vals)?)
            .with_context(|| format!("Cannot write '{}'", self.path.display()))?;
        tracing::debug!("Best-metric record now {:?}", vals);
        Ok(())
    }

    /// Record `mae` for `part`, keeping the other part's value.
    pub fn update(&self, part: DatasetPart, mae: Option<f64>) -> Result<BestVals> {
        let vals = self.load()?.with(part, mae);
        self.reset(&vals)?;
        Ok(vals)
    }
}

/// Replace the bare `Infinity`, `-Infinity` and `NaN` tokens outside
/// strings with `null`. Returns whether anything was replaced.
fn null_non_finite(json: &str) -> (String, bool) {
    let mut out = String::with_capacity(json.len());
    let mut replaced = false;
    let mut in_string = false;
    let mut escaped = false;
    let mut rest = json;

    while let Some(c) = rest.chars().next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = ["-Infinity", "Infinity", "NaN"].into_iter().find(|t| rest.starts_with(t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            replaced = true;
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    (out, replaced)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_means_no_best() {
        let dir = tempfile::tempdir().unwrap();
        let store = BestValsStore::new(dir.path().join("best_vals.txt"));
        assert_eq!(store.load().unwrap(), BestVals::default());
    }

    #[test]
    fn test_update_preserves_other_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_vals.txt");
        fs::write(&path, r#"{"best_mae_a": 100.0, "best_mae_b": 25.0}"#).unwrap();

        let store = BestValsStore::new(&path);
        store.update(DatasetPart::B, Some(18.5)).unwrap();

        let vals = store.load().unwrap();
        assert_eq!(vals.get(DatasetPart::A), Some(100.0));
        assert_eq!(vals.get(DatasetPart::B), Some(18.5));
    }

    #[test]
    fn test_malformed_record_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_vals.txt");
        fs::write(&path, "not json").unwrap();
        assert!(BestValsStore::new(&path).load().is_err());
    }

    #[test]
    fn test_python_infinity_means_no_best() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("best_vals.txt");
        fs::write(&path, r#"{"best_mae_a": Infinity, "best_mae_b": 12.5}"#).unwrap();

        let vals = BestValsStore::new(&path).load().unwrap();
        assert_eq!(vals, BestVals::new(None, Some(12.5)));
        assert!(vals.is_improvement(DatasetPart::A, 1e9));
    }

    #[test]
    fn test_non_finite_tokens_inside_strings_are_kept() {
        let (json, replaced) = null_non_finite(r#"{"NaN": -Infinity, "k": "Infinity\" NaN"}"#);
        assert!(replaced);
        assert_eq!(json, r#"{"NaN": null, "k": "Infinity\" NaN"}"#);
    }
}
