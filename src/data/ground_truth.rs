// ============================================================
// Layer 4 — Ground-Truth Readers
// ============================================================
// Implements GroundTruthReader for the supported file formats.
//
//   .npy — 2-D float32 or float64 array, [height, width]
//   .h5  — `density` dataset, same shape (feature `hdf5`)
//
// Both produce a full-resolution DensityMap; downsampling to
// the network's output grid happens in the dataset.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::ValueEnum;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::error::DataError;
use crate::domain::density_map::DensityMap;
use crate::domain::traits::GroundTruthReader;

/// On-disk format of the ground-truth density maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroundTruthFormat {
    Npy,
    Hdf5,
}

impl GroundTruthFormat {
    /// Build the reader for this format.
    /// Fails for hdf5 when the binary was built without the `hdf5` feature.
    pub fn reader(self) -> Result<Arc<dyn GroundTruthReader>> {
        match self {
            GroundTruthFormat::Npy => Ok(Arc::new(NpyReader)),
            #[cfg(feature = "hdf5")]
            GroundTruthFormat::Hdf5 => Ok(Arc::new(Hdf5Reader::default())),
            #[cfg(not(feature = "hdf5"))]
            GroundTruthFormat::Hdf5 => anyhow::bail!(
                "this build has no HDF5 support; rebuild with `--features hdf5` or convert ground truth to .npy"
            ),
        }
    }
}

fn array_to_map(arr: Array2<f32>) -> DensityMap {
    let (height, width) = arr.dim();
    // as_standard_layout copies only when the array is not already C-contiguous
    let values = arr.as_standard_layout().iter().copied().collect();
    DensityMap { height, width, values }
}

// ─── NpyReader ────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, Default)]
pub struct NpyReader;

impl GroundTruthReader for NpyReader {
    fn extension(&self) -> &'static str {
        "npy"
    }

    fn read(&self, path: &Path) -> Result<DensityMap> {
        let gt_err = |msg: String| DataError::GroundTruth { path: path.to_path_buf(), msg };

        let arr: Array2<f32> = match ndarray_npy::read_npy::<_, Array2<f32>>(path) {
            Ok(arr) => arr,
            // Density maps produced by scipy are usually float64
            Err(ndarray_npy::ReadNpyError::WrongDescriptor(_)) => {
                ndarray_npy::read_npy::<_, Array2<f64>>(path)
                    .map_err(|e| gt_err(e.to_string()))?
                    .mapv(|v| v as f32)
            }
            Err(e) => return Err(gt_err(e.to_string()).into()),
        };
        Ok(array_to_map(arr))
    }
}

// ─── Hdf5Reader ───────────────────────────────────────────────────────────────
#[cfg(feature = "hdf5")]
#[derive(Debug, Clone)]
pub struct Hdf5Reader {
    /// Name of the dataset holding the map inside the file
    pub dataset: String,
}

#[cfg(feature = "hdf5")]
impl Default for Hdf5Reader {
    fn default() -> Self {
        Self { dataset: "density".to_string() }
    }
}

#[cfg(feature = "hdf5")]
impl GroundTruthReader for Hdf5Reader {
    fn extension(&self) -> &'static str {
        "h5"
    }

    fn read(&self, path: &Path) -> Result<DensityMap> {
        let gt_err = |msg: String| DataError::GroundTruth { path: path.to_path_buf(), msg };

        let file = hdf5::File::open(path).map_err(|e| gt_err(e.to_string()))?;
        let ds = file
            .dataset(&self.dataset)
            .map_err(|e| gt_err(format!("no `{}` dataset: {e}", self.dataset)))?;
        let arr: Array2<f64> = ds.read_2d::<f64>().map_err(|e| gt_err(e.to_string()))?;
        Ok(array_to_map(arr.mapv(|v| v as f32)))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_reads_f32_npy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_1.npy");
        let arr: Array2<f32> = array![[0.5, 0.25], [0.0, 1.0], [0.125, 0.125]];
        ndarray_npy::write_npy(&path, &arr).unwrap();

        let map = NpyReader.read(&path).unwrap();
        assert_eq!((map.height, map.width), (3, 2));
        assert_eq!(map.get(1, 1), 1.0);
        assert!((map.count() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_reads_f64_npy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_2.npy");
        let arr: Array2<f64> = array![[0.5, 0.5]];
        ndarray_npy::write_npy(&path, &arr).unwrap();

        let map = NpyReader.read(&path).unwrap();
        assert_eq!(map.values, vec![0.5, 0.5]);
    }

    #[test]
    fn test_transposed_array_is_row_major() {
        let arr: Array2<f32> = array![[1.0, 2.0], [3.0, 4.0]];
        let map = array_to_map(arr.reversed_axes());
        assert_eq!(map.values, vec![1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn test_missing_file() {
        assert!(NpyReader.read(Path::new("/nonexistent/gt.npy")).is_err());
    }
}
