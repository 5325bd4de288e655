// ============================================================
// Layer 3 — Dataset Part and Split
// ============================================================
// The crowd dataset ships as two independent parts:
//   Part A — dense crowds scraped from the web
//   Part B — sparser street scenes
// Each part has its own train/test split and its own best MAE.
//
// On disk:
//   {data_root}/part_A_final/train_data/images/IMG_1.jpg
//   {data_root}/part_A_final/train_data/ground-truth/IMG_1.npy
//   {data_root}/part_A_final/test_data/...

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which half of the dataset a run trains and evaluates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetPart {
    A,
    B,
}

impl DatasetPart {
    /// Single-letter label used in file names, e.g. `part_A_best_model_10`
    pub fn label(self) -> &'static str {
        match self {
            DatasetPart::A => "A",
            DatasetPart::B => "B",
        }
    }

    /// Directory name of this part under the data root
    pub fn dir_name(self) -> String {
        format!("part_{}_final", self.label())
    }
}

impl fmt::Display for DatasetPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a part label is neither "A" nor "B".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPart(pub String);

impl fmt::Display for UnknownPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown dataset part '{}': please put A or B", self.0)
    }
}

impl std::error::Error for UnknownPart {}

impl FromStr for DatasetPart {
    type Err = UnknownPart;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(DatasetPart::A),
            "B" | "b" => Ok(DatasetPart::B),
            other => Err(UnknownPart(other.to_string())),
        }
    }
}

/// Train or test subset of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train_data",
            Split::Test => "test_data",
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        assert_eq!("A".parse::<DatasetPart>(), Ok(DatasetPart::A));
        assert_eq!("b".parse::<DatasetPart>(), Ok(DatasetPart::B));
    }

    #[test]
    fn test_reject_unknown_part() {
        let err = "C".parse::<DatasetPart>().unwrap_err();
        assert!(err.to_string().contains("please put A or B"));
    }

    #[test]
    fn test_dir_names() {
        assert_eq!(DatasetPart::B.dir_name(), "part_B_final");
        assert_eq!(Split::Test.dir_name(), "test_data");
    }
}
