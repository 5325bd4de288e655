// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Everything that persists or displays state:
//
//   checkpoint.rs      — model weights (.mpk.gz), the run's
//                        TrainConfig, and a pointer to the best
//                        checkpoint of each dataset part
//
//   best_vals_store.rs — best_vals.txt, the lowest test MAE
//                        recorded per part
//
//   metrics.rs         — per-epoch CSV log
//
//   progress.rs        — terminal progress bar for the train pass
//
//   heatmap.rs         — PNG rendering of predicted density maps
//
// Reference: Rust Book §9 (Error Handling with anyhow)
//            Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Best held-out MAE per dataset part
pub mod best_vals_store;

/// Training metrics CSV logger
pub mod metrics;

/// indicatif progress bar
pub mod progress;

/// Density map → grayscale PNG
pub mod heatmap;
