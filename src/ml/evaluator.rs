// ============================================================
// Layer 5 — Count Evaluation
// ============================================================
// The test metric of crowd counting compares head counts, not
// pixels: for every test image
//
//   err = sum(predicted density) - sum(ground-truth density)
//
//   MAE  = mean |err|
//   RMSE = sqrt(mean err²)

use burn::prelude::*;

use crate::data::batcher::DensityBatch;
use crate::ml::model::CsrNet;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountMetrics {
    pub mae:     f64,
    pub rmse:    f64,
    pub samples: usize,
}

/// Running sums for MAE / RMSE.
#[derive(Debug, Default, Clone, Copy)]
pub struct CountAccumulator {
    abs_sum: f64,
    sq_sum:  f64,
    samples: usize,
}

impl CountAccumulator {
    pub fn add(&mut self, predicted: f64, truth: f64) {
        let err = predicted - truth;
        self.abs_sum += err.abs();
        self.sq_sum  += err * err;
        self.samples += 1;
    }

    /// None when nothing was accumulated.
    pub fn finish(self) -> Option<CountMetrics> {
        if self.samples == 0 {
            return None;
        }
        let n = self.samples as f64;
        Some(CountMetrics {
            mae:     self.abs_sum / n,
            rmse:    (self.sq_sum / n).sqrt(),
            samples: self.samples,
        })
    }
}

/// Estimated count: sum of the predicted density map.
pub fn predicted_count<B: Backend>(model: &CsrNet<B>, image: Tensor<B, 4>) -> f64 {
    model.forward(image).sum().into_scalar().elem::<f64>()
}

/// Run the model over every sample of `batches` and compare counts.
pub fn evaluate<B, I>(model: &CsrNet<B>, batches: I) -> Option<CountMetrics>
where
    B: Backend,
    I: IntoIterator<Item = DensityBatch<B>>,
{
    let mut acc = CountAccumulator::default();
    for batch in batches {
        for item in batch.items {
            let predicted = predicted_count(model, item.image);
            tracing::debug!(
                "{}: predicted {:.2}, true {:.2}",
                item.source.display(),
                predicted,
                item.count
            );
            acc.add(predicted, item.count);
        }
    }
    acc.finish()
}
