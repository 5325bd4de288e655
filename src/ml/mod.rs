// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All tensor code lives here.
//
//   backend.rs    — NdArray / WGPU backend aliases
//
//   model.rs      — CSRNet-style density regressor:
//                   VGG-16 frontend (3 max-pools, stride 8)
//                   + dilated conv backend + 1x1 output conv,
//                   and the MSE training loss
//
//   trainer.rs    — epoch loop: Adam steps on the train split,
//                   count MAE on the test split, checkpoint
//                   when the MAE beats the recorded best
//
//   evaluator.rs  — MAE / RMSE of predicted vs true counts
//
//   inferencer.rs — reloads the best checkpoint of a part and
//                   predicts density maps for new images
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            Li et al. (2018) CSRNet

pub mod backend;

/// CSRNet-style density estimation network
pub mod model;

/// Full training loop with evaluation and checkpointing
pub mod trainer;

/// Count metrics over a dataset
pub mod evaluator;

/// Loads a checkpoint and predicts density maps
pub mod inferencer;
