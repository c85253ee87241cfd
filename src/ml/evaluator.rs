// ============================================================
// Layer 6 — Evaluation Pass
// ============================================================
// Same batch bookkeeping as the trainer, minus backward and
// optimizer step. Callers pass the inference copy of the model
// (`model.valid()`), which runs on the inner backend: no
// autodiff graph, batch norm uses running statistics and
// dropout is disabled.

use burn::{data::dataloader::DataLoader, nn::loss::CrossEntropyLossConfig, prelude::*};

use crate::data::batcher::CifarBatch;
use crate::domain::records::EpochStats;
use crate::ml::{accuracy, model::CifarNet};
use crate::training::meter::MetricAccumulator;

/// Stateless; every call is one full pass over the loader.
pub struct Evaluator;

impl Evaluator {
    /// Average loss and accuracies of `model` over `loader`.
    pub fn run_epoch<B: Backend>(model: &CifarNet<B>, loader: &dyn DataLoader<CifarBatch<B>>) -> EpochStats {
        let mut losses = MetricAccumulator::new();
        let mut top1 = MetricAccumulator::new();
        let mut top5 = MetricAccumulator::new();

        for batch in loader.iter() {
            // ── Forward only: no backward, no optimizer ───────────────────────
            let n = batch.targets.dims()[0];
            let logits = model.forward(batch.images);
            let criterion = CrossEntropyLossConfig::new().init(&logits.device());
            let loss = criterion.forward(logits.clone(), batch.targets.clone());

            // ── Weighted bookkeeping, identical to the trainer ────────────────
            let (acc1, acc5) = accuracy::percentages(accuracy::batch_hits(logits, batch.targets), n);
            losses.update(loss.into_scalar().elem::<f64>(), n);
            top1.update(acc1, n);
            top5.update(acc5, n);
        }

        EpochStats::new(losses.average(), top1.average(), top5.average())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, data::dataloader::DataLoaderBuilder};

    use crate::data::{batcher::CifarBatcher, cifar::{CifarImage, IMAGE_BYTES}, dataset::CifarDataset};
    use crate::ml::model::NetworkConfig;

    #[test]
    fn evaluation_is_deterministic() {
        let device = <NdArray as Backend>::Device::default();
        let images: Vec<CifarImage> = (0..5)
            .map(|i| CifarImage { pixels: vec![(i * 50) as u8; IMAGE_BYTES], label: i % 2 })
            .collect();
        let loader = DataLoaderBuilder::new(CifarBatcher::<NdArray>::new(device.clone()))
            .batch_size(2)
            .build(CifarDataset::new(images));
        let model: CifarNet<NdArray> = NetworkConfig::new(2, 1).init(&device);

        let first = Evaluator::run_epoch(&model, loader.as_ref());
        let second = Evaluator::run_epoch(&model, loader.as_ref());
        assert_eq!(first, second);
        assert!(first.is_finite());
        assert_eq!(first.top5, 100.0);
    }
}
