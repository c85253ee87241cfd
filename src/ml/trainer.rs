// ============================================================
// Layer 6 — Training Epoch
// ============================================================
// One pass over the training loader:
//
//   for each batch:
//     logits = model(images)
//     loss   = cross_entropy(logits, targets)
//     top-1 / top-5 hits on the detached logits
//     grads  = loss.backward()
//     model  = sgd.step(lr, model, grads)
//
// Loss and accuracies are averaged weighted by batch size.
// Progress is printed about 13 times per epoch as
// "[<epoch>E.<percent>%]", with the zero-based epoch index.
//
// Key Burn insight:
//   - optim.step takes the model by value and returns the
//     updated one, so the epoch threads ownership through
//   - GradientsParams::from_grads maps raw grads to params
//
// Reference: Burn Book §5

use std::time::Instant;

use burn::{
    data::dataloader::DataLoader,
    nn::loss::CrossEntropyLossConfig,
    optim::{GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::CifarBatch;
use crate::domain::records::EpochStats;
use crate::ml::{accuracy, model::CifarNet};
use crate::training::meter::MetricAccumulator;

/// Progress marks per epoch.
const PROGRESS_MARKS: usize = 13;

pub struct Trainer {
    /// Configured batch size; only used to estimate the batch count
    batch_size: usize,
}

impl Trainer {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size: batch_size.max(1) }
    }

    /// Train `model` for one epoch and return it with the epoch's
    /// averaged loss and accuracies.
    pub fn run_epoch<B, O>(
        &self,
        mut model: CifarNet<B>,
        optim: &mut O,
        loader: &dyn DataLoader<CifarBatch<B>>,
        epoch: usize,
        learning_rate: f64,
    ) -> (CifarNet<B>, EpochStats)
    where
        B: AutodiffBackend,
        O: Optimizer<CifarNet<B>, B>,
    {
        // ── Progress cadence ──────────────────────────────────────────────────
        let num_batches = loader.num_items().div_ceil(self.batch_size).max(1);
        let log_every = (num_batches / PROGRESS_MARKS).max(1);

        // ── Running averages, weighted by batch size ──────────────────────────
        let mut losses = MetricAccumulator::new();
        let mut top1 = MetricAccumulator::new();
        let mut top5 = MetricAccumulator::new();
        let started = Instant::now();

        for (i, batch) in loader.iter().enumerate() {
            // ── Forward + loss ────────────────────────────────────────────────
            let n = batch.targets.dims()[0];
            let logits = model.forward(batch.images);
            let criterion = CrossEntropyLossConfig::new().init(&logits.device());
            let loss = criterion.forward(logits.clone(), batch.targets.clone());

            // ── Metrics on detached logits (no graph kept alive) ──────────────
            let hits = accuracy::batch_hits(logits.detach(), batch.targets);
            let (acc1, acc5) = accuracy::percentages(hits, n);
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            losses.update(loss_val, n);
            top1.update(acc1, n);
            top5.update(acc5, n);

            // ── Backward + SGD step ───────────────────────────────────────────
            // gradients are fresh per batch, so there is nothing to zero
            let grads = GradientsParams::from_grads(loss.backward(), &model);
            model = optim.step(learning_rate, model, grads);

            if (i + 1) % log_every == 0 {
                let percent = (i + 1) * 100 / num_batches;
                tracing::info!(
                    "{}",
                    progress_line(epoch, percent, losses.last(), started.elapsed().as_secs_f64())
                );
            }
        }

        (model, EpochStats::new(losses.average(), top1.average(), top5.average()))
    }
}

/// `epoch` is printed zero-based, `percent` as completed batches.
fn progress_line(epoch: usize, percent: usize, loss: f64, elapsed_secs: f64) -> String {
    format!("[{:2}E.{:3}%] Train Loss: {:.4}  Elapsed Time: {:.3}", epoch, percent, loss, elapsed_secs)
}
