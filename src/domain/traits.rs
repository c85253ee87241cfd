// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The orchestrator drives training through this trait and never
// sees a tensor. The burn-backed session in Layer 6 implements
// it for real runs; tests implement it with scripted accuracies.

use crate::domain::{
    error::TrainError,
    records::{EpochStats, StateSnapshot},
};

// ─── EpochRunner ──────────────────────────────────────────────────────────────
/// One model + optimizer pair with its training and test data.
///
/// Exactly one orchestrator drives a runner at a time, from a
/// single thread.
pub trait EpochRunner {
    /// Run one training epoch at the given learning rate,
    /// mutating model parameters and optimizer state.
    fn train_epoch(&mut self, epoch: usize, learning_rate: f64) -> Result<EpochStats, TrainError>;

    /// Evaluate on held-out data without touching model or
    /// optimizer state.
    fn evaluate(&self, epoch: usize) -> Result<EpochStats, TrainError>;

    /// Serialise model and optimizer state.
    fn snapshot(&self) -> Result<StateSnapshot, TrainError>;

    /// Replace model and optimizer state with a previous snapshot.
    fn restore(&mut self, snapshot: &StateSnapshot) -> Result<(), TrainError>;
}
