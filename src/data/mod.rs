// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From a dataset directory to tensors on the device:
//
//   part_X_final/{train,test}_data/images/*.jpg
//       │
//       ▼
//   SampleLoader      → pairs each image with its ground-truth file
//       │
//       ▼
//   CrowdDataset      → implements Burn's Dataset trait (paths only)
//       │
//       ▼
//   DataLoader        → shuffles (train) and hands out paths
//       │
//       ▼
//   CrowdBatcher      → decodes the JPEG, reads the density map,
//                       downsamples it by 8, builds tensors
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Typed errors for everything that touches input files
pub mod error;

/// Lists image / ground-truth pairs for a part and split
pub mod loader;

/// JPEG decoding and [0, 1] normalisation
pub mod decode;

/// .npy / .h5 ground-truth readers
pub mod ground_truth;

/// OpenCV-compatible bicubic downsampling of density maps
pub mod resize;

/// Implements Burn's Dataset trait for crowd samples
pub mod dataset;

/// Implements Burn's Batcher trait; does the lazy per-sample loading
pub mod batcher;

#[cfg(test)]
pub mod fixtures;
