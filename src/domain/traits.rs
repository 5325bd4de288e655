// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Ground-truth density maps come in more than one on-disk
// format. The data layer only talks to GroundTruthReader, so a
// new format is one new impl.
//
// Implementations:
//   - NpyReader  → NumPy .npy arrays (always available)
//   - Hdf5Reader → the `density` dataset of an .h5 file
//                  (cargo feature `hdf5`)

use std::path::Path;

use anyhow::Result;

use crate::domain::density_map::DensityMap;

// ─── GroundTruthReader ────────────────────────────────────────────────────────
/// Anything that can turn a ground-truth file into a full-resolution
/// density map.
pub trait GroundTruthReader: Send + Sync {
    /// File extension (without the dot) of ground-truth files
    fn extension(&self) -> &'static str;

    /// Read the density map stored at `path`
    fn read(&self, path: &Path) -> Result<DensityMap>;
}

// ─── CrowdCounter ─────────────────────────────────────────────────────────────
/// Any component that can estimate the number of people in an image.
///
/// Implementations:
///   - Inferencer → uses a trained checkpoint
pub trait CrowdCounter {
    /// Returns the predicted density map for the image at `path`.
    /// Its sum is the estimated head count.
    fn density(&self, path: &Path) -> Result<DensityMap>;
}
