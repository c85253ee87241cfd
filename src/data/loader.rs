// ============================================================
// Layer 4 — DataLoader Construction
// ============================================================
// Wraps the datasets in Burn DataLoaders.
//
//   train: augmented, reshuffled every epoch from the run seed
//   test:  plain, fixed order (evaluation is deterministic)
//
// With workers > 0 Burn prefetches batches on background
// threads; batches are still consumed in production order.

use std::sync::Arc;

use burn::{
    data::dataloader::{DataLoader, DataLoaderBuilder},
    prelude::*,
};

use crate::data::{
    augment::Augmentation,
    batcher::{CifarBatch, CifarBatcher},
    dataset::{AugmentedDataset, CifarDataset},
};

/// Shuffled loader over an augmented view of `dataset`.
pub fn train_loader<B: Backend>(
    dataset: CifarDataset,
    batch_size: usize,
    workers: usize,
    seed: u64,
    device: &B::Device,
) -> Arc<dyn DataLoader<CifarBatch<B>>> {
    let dataset = AugmentedDataset::new(dataset, Augmentation::default());
    let mut builder = DataLoaderBuilder::new(CifarBatcher::<B>::new(device.clone()))
        .batch_size(batch_size)
        .shuffle(seed);
    if workers > 0 {
        builder = builder.num_workers(workers);
    }
    builder.build(dataset)
}

/// Fixed-order loader; the last batch may be partial.
pub fn test_loader<B: Backend>(
    dataset: CifarDataset,
    batch_size: usize,
    workers: usize,
    device: &B::Device,
) -> Arc<dyn DataLoader<CifarBatch<B>>> {
    let mut builder = DataLoaderBuilder::new(CifarBatcher::<B>::new(device.clone())).batch_size(batch_size);
    if workers > 0 {
        builder = builder.num_workers(workers);
    }
    builder.build(dataset)
}
