// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from CIFAR archive files to tensor batches.
//
//   data_batch_*.bin / train.bin / test.bin
//       │
//       ▼
//   cifar::load_split    → decodes fixed-size binary records
//       │
//       ▼
//   imbalance::long_tail → exponential subsampling (train only)
//       │
//       ▼
//   CifarDataset         → implements Burn's Dataset trait
//       │
//       ▼
//   AugmentedDataset     → random crop + flip (train only)
//       │
//       ▼
//   CifarBatcher         → normalised [N,3,32,32] tensors
//       │
//       ▼
//   DataLoader           → shuffled, prefetched batches
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// CIFAR-10/100 binary archive reader
pub mod cifar;

/// Long-tailed subsampling of the training split
pub mod imbalance;

/// Random crop and horizontal flip
pub mod augment;

/// Implements Burn's Dataset trait for CIFAR images
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Builds the train and test DataLoaders
pub mod loader;
