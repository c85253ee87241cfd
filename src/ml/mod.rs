// ============================================================
// Layer 6 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn model and optimizer code.
// The training core (Layer 5) only sees it through the
// `EpochRunner` trait, implemented here by `BurnSession`.
//
// What's in this layer:
//
//   model.rs     — CifarNet: residual network for 32×32 inputs
//                  (3×3 stem, three stages of basic blocks,
//                  global average pool, linear `fc` head)
//
//   registry.rs  — typed architecture registry: name → depth
//                  rule, declared parameters, defaults, builder
//
//   accuracy.rs  — top-1 / top-5 hit counting
//
//   trainer.rs   — one training epoch: forward, cross-entropy,
//                  backward, SGD step, progress output
//
//   evaluator.rs — one evaluation pass in inference mode
//
//   state.rs     — model / optimizer records ↔ byte blobs
//
//   head.rs      — read and replace the classifier weight rows
//
//   session.rs   — BurnSession: model + optimizer + loaders
//
// Backends:
//   default       NdArray (CPU)
//   --features wgpu  Wgpu (GPU)
// Training always runs on Autodiff<ComputeBackend>; evaluation
// runs on the inner backend via `model.valid()`.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)
//            He et al. (2016) Deep Residual Learning
//            Zagoruyko & Komodakis (2016) Wide Residual Networks

use burn::tensor::backend::Backend;

#[cfg(not(feature = "wgpu"))]
pub type ComputeBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type ComputeBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<ComputeBackend>;

pub type ComputeDevice = <ComputeBackend as Backend>::Device;

/// CIFAR residual network architecture
pub mod model;

/// Architecture name → network config factory
pub mod registry;

/// Top-k accuracy counting
pub mod accuracy;

/// One training epoch
pub mod trainer;

/// One evaluation pass
pub mod evaluator;

/// Model and optimizer state encoding
pub mod state;

/// Classifier head weight access
pub mod head;

/// Burn-backed EpochRunner
pub mod session;
