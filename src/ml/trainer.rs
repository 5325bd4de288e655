// ============================================================
// Layer 5 — Training Loop
// ============================================================
// One image per step, Adam, MSE on the downsampled density map.
// The loss that feeds the running average is recomputed after the
// optimizer step.
// After each epoch the whole test split is counted (eval mode) and
// its MAE is compared with the best value recorded for the part.
//
//   Training uses TrainBackend (Autodiff<Inner>) for gradients.
//   model.valid() strips autodiff for the test pass, so the test
//   batcher builds tensors on the inner backend.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use burn::{
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::{CheckpointPolicy, TrainConfig};
use crate::data::{
    batcher::{build_loader, CrowdBatcher},
    dataset::CrowdDataset,
};
use crate::domain::traits::GroundTruthReader;
use crate::infra::{
    best_vals_store::BestValsStore,
    checkpoint::{best_model_stem, BestCheckpoint, CheckpointManager},
    metrics::{EpochMetrics, MetricsLogger},
    progress::ProgressMonitor,
};
use crate::ml::backend::{default_device, TrainBackend};
use crate::ml::evaluator::evaluate;
use crate::ml::model::{CsrNet, CsrNetConfig};

/// Where a run keeps its on-disk state.
pub struct Bookkeeping<'a> {
    pub checkpoints: &'a CheckpointManager,
    pub best:        &'a BestValsStore,
    pub metrics:     &'a MetricsLogger,
}

pub struct FitOutcome<B: Backend> {
    /// The model after the last epoch
    pub model:   CsrNet<B>,
    pub history: Vec<EpochMetrics>,
    /// The last checkpoint this run saved, if it beat the record
    pub saved:   Option<BestCheckpoint>,
}

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: CrowdDataset,
    test_dataset:  CrowdDataset,
    reader:        Arc<dyn GroundTruthReader>,
    ckpt_manager:  &CheckpointManager,
    best_store:    &BestValsStore,
    metrics:       &MetricsLogger,
) -> Result<FitOutcome<TrainBackend>> {
    let device = default_device();
    tracing::info!("Using device: {:?}", device);

    let books = Bookkeeping { checkpoints: ckpt_manager, best: best_store, metrics };
    train_loop::<TrainBackend>(cfg, train_dataset, test_dataset, reader, &books, device, true)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:           &TrainConfig,
    train_dataset: CrowdDataset,
    test_dataset:  CrowdDataset,
    reader:        Arc<dyn GroundTruthReader>,
    books:         &Bookkeeping<'_>,
    device:        B::Device,
    show_progress: bool,
) -> Result<FitOutcome<B>> {
    let part = cfg.part;

    // ── Best MAE so far ───────────────────────────────────────────────────────
    let mut best_vals = books.best.load()?;
    match best_vals.get(part) {
        Some(mae) => tracing::info!("Best recorded MAE for part {}: {:.5}", part, mae),
        None => tracing::info!("No MAE recorded for part {} yet", part),
    }

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = CsrNetConfig::new().with_width_divisor(cfg.width_divisor);
    let mut model: CsrNet<B> = model_cfg.init(&device);
    let mut optim = AdamConfig::new().init();

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_len = train_dataset.sample_count();
    let train_loader = build_loader(
        CrowdBatcher::<B>::new(reader.clone(), device.clone()),
        train_dataset,
        Some(cfg.seed),
        cfg.num_workers,
    );
    let test_loader = build_loader(
        CrowdBatcher::<B::InnerBackend>::new(reader, device.clone()),
        test_dataset,
        None,
        cfg.num_workers,
    );

    println!("Part {} Learning started. It takes sometime.", part);
    tracing::info!("Epoch metrics → '{}'", books.metrics.csv_path().display());

    let mut history = Vec::with_capacity(cfg.epochs);
    let mut saved = None;

    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let progress = if show_progress {
            ProgressMonitor::new(train_len, epoch, cfg.epochs)
        } else {
            ProgressMonitor::hidden()
        };

        let mut loss_sum = 0.0f64;
        let mut steps    = 0usize;

        for batch in train_loader.iter() {
            for item in batch.items {
                let (loss, _) = model.forward_loss(item.image.clone(), item.density.clone());
                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optim.step(cfg.lr, model, grads);

                // Reported loss is measured on the updated weights
                let (loss, _) = model.forward_loss(item.image, item.density);
                let loss_val: f64 = loss.into_scalar().elem::<f64>();

                loss_sum += loss_val;
                progress.update(steps, loss_sum / (steps + 1) as f64);
                steps += 1;
            }
        }
        progress.finish();

        if steps == 0 {
            bail!("No training sample of part {} could be loaded", part);
        }
        let train_loss = loss_sum / steps as f64;

        // ── Test phase ────────────────────────────────────────────────────────
        let model_valid = model.valid();
        let test = evaluate(&model_valid, test_loader.iter())
            .ok_or_else(|| anyhow!("No test sample of part {} could be loaded", part))?;

        println!("Epoch: {} Test MAE = {:.5}", epoch, test.mae);

        let row = EpochMetrics::new(epoch, train_loss, test.mae, test.rmse);
        books.metrics.log(&row)?;
        history.push(row);

        // ── Checkpointing ─────────────────────────────────────────────────────
        let stem_epochs = match cfg.checkpoint_policy {
            CheckpointPolicy::Final if epoch < cfg.epochs => continue,
            CheckpointPolicy::Final => cfg.epochs,
            CheckpointPolicy::EveryEpoch => epoch,
        };

        if best_vals.is_improvement(part, test.mae) {
            let stem = best_model_stem(part, stem_epochs);
            books.checkpoints.save_model(&model, &stem)?;
            books.checkpoints.save_config(cfg)?;

            let best = BestCheckpoint { part, stem, epochs: stem_epochs, mae: test.mae };
            books.checkpoints.record_best(&best)?;
            best_vals = books.best.update(part, Some(test.mae))?;

            tracing::info!("Test MAE {:.5} is a new best for part {}, saved '{}'", test.mae, part, best.stem);
            saved = Some(best);
        } else {
            tracing::info!(
                "Test MAE {:.5} does not beat {:.5}; no checkpoint",
                test.mae,
                best_vals.get(part).unwrap_or(f64::NAN)
            );
        }
    }

    println!("Learning Finished!");
    Ok(FitOutcome { model, history, saved })
}
