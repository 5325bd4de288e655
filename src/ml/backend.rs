//! Backend aliases. NdArray (CPU) by default, WGPU with `--features wgpu`.

use burn::prelude::*;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;
#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

/// Backend used for training; gradients are tracked.
pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

/// Backend used for evaluation and single-image inference.
pub type InferBackend = InnerBackend;

pub fn default_device() -> <InnerBackend as Backend>::Device {
    Default::default()
}
