// ============================================================
// Layer 3 — Run Records
// ============================================================
// Plain data produced and consumed by the epoch loop:
//
//   EpochStats       — aggregate loss/accuracy of one pass
//   EpochRecord      — one line of the run log
//   StateSnapshot    — opaque model + optimizer blobs, tagged
//                      with the architecture that produced them
//   CheckpointRecord — everything needed to resume a run
//   RunState         — best accuracy + current learning rate
//
// Accuracies are percentages in [0, 100] throughout.

use serde::{Deserialize, Serialize};

/// Aggregate metrics of one training or evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EpochStats {
    pub loss: f64,
    pub top1: f64,
    pub top5: f64,
}

impl EpochStats {
    pub fn new(loss: f64, top1: f64, top5: f64) -> Self {
        Self { loss, top1, top5 }
    }

    /// False when training has diverged (NaN or infinite loss).
    pub fn is_finite(&self) -> bool {
        self.loss.is_finite()
    }
}

/// Summary of a completed epoch. Immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// Zero-based epoch index
    pub epoch: usize,
    pub learning_rate: f64,
    pub train_loss: f64,
    pub test_loss: f64,
    pub train_accuracy: f64,
    pub test_accuracy: f64,
}

impl EpochRecord {
    pub fn new(epoch: usize, learning_rate: f64, train: EpochStats, test: EpochStats) -> Self {
        Self {
            epoch,
            learning_rate,
            train_loss: train.loss,
            test_loss: test.loss,
            train_accuracy: train.top1,
            test_accuracy: test.top1,
        }
    }

    /// Human-readable run-log line. Epochs are displayed one-based
    /// and accuracies as fractions.
    pub fn summary_line(&self, total_epochs: usize) -> String {
        format!(
            "Epoch:[{:3} | {}] LR: {:.4}, Loss(Tr): {:.4}, Loss(Tt): {:.4}, Acc(Tr): {:.4}, Acc(Tt): {:.4}",
            self.epoch + 1,
            total_epochs,
            self.learning_rate,
            self.train_loss,
            self.test_loss,
            self.train_accuracy / 100.0,
            self.test_accuracy / 100.0,
        )
    }
}

/// Serialised model and optimizer state. The bytes are opaque to
/// everything except the ML layer that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StateSnapshot {
    /// Shape fingerprint of the network the blobs belong to
    pub architecture: String,
    pub model: Vec<u8>,
    pub optimizer: Vec<u8>,
}

/// Full training state persisted after every epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointRecord {
    /// Zero-based index of the epoch that produced this state
    pub epoch: usize,
    pub architecture: String,
    pub model_state: Vec<u8>,
    pub optimizer_state: Vec<u8>,
    /// Test accuracy of this epoch
    pub accuracy: f64,
    /// Best test accuracy seen up to and including this epoch
    pub best_accuracy: f64,
}

impl CheckpointRecord {
    pub fn new(epoch: usize, snapshot: StateSnapshot, accuracy: f64, best_accuracy: f64) -> Self {
        Self {
            epoch,
            architecture: snapshot.architecture,
            model_state: snapshot.model,
            optimizer_state: snapshot.optimizer,
            accuracy,
            best_accuracy,
        }
    }

    /// The epoch a resumed run starts at.
    pub fn resume_epoch(&self) -> usize {
        self.epoch + 1
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            architecture: self.architecture.clone(),
            model: self.model_state.clone(),
            optimizer: self.optimizer_state.clone(),
        }
    }
}

/// Mutable per-run state, owned by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunState {
    pub best_accuracy: f64,
    pub learning_rate: f64,
}

impl RunState {
    pub fn new(learning_rate: f64) -> Self {
        Self { best_accuracy: 0.0, learning_rate }
    }

    /// Fold one test accuracy into the best-so-far.
    ///
    /// Returns true only for a strict improvement; ties are not
    /// improvements.
    pub fn record_accuracy(&mut self, accuracy: f64) -> bool {
        let is_best = accuracy > self.best_accuracy;
        self.best_accuracy = self.best_accuracy.max(accuracy);
        is_best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_flags_follow_strict_improvement() {
        let mut state = RunState::new(0.1);
        let flags: Vec<bool> = [40.0, 55.0, 50.0, 60.0]
            .iter()
            .map(|&acc| state.record_accuracy(acc))
            .collect();
        assert_eq!(flags, vec![true, true, false, true]);
        assert_eq!(state.best_accuracy, 60.0);
    }

    #[test]
    fn tie_is_not_an_improvement() {
        let mut state = RunState { best_accuracy: 72.3, learning_rate: 0.01 };
        assert!(!state.record_accuracy(72.3));
        assert!(!state.record_accuracy(70.0));
        assert_eq!(state.best_accuracy, 72.3);
    }

    #[test]
    fn summary_line_is_one_based_with_fractional_accuracy() {
        let record = EpochRecord::new(
            0,
            0.1,
            EpochStats::new(1.5, 45.0, 90.0),
            EpochStats::new(1.25, 50.0, 92.0),
        );
        assert_eq!(
            record.summary_line(180),
            "Epoch:[  1 | 180] LR: 0.1000, Loss(Tr): 1.5000, Loss(Tt): 1.2500, Acc(Tr): 0.4500, Acc(Tt): 0.5000"
        );
    }

    #[test]
    fn resume_starts_after_recorded_epoch() {
        let record = CheckpointRecord::new(100, StateSnapshot::default(), 70.0, 72.3);
        assert_eq!(record.resume_epoch(), 101);
    }

    #[test]
    fn nan_loss_is_detectable() {
        assert!(!EpochStats::new(f64::NAN, 10.0, 50.0).is_finite());
        assert!(!EpochStats::new(f64::INFINITY, 10.0, 50.0).is_finite());
        assert!(EpochStats::new(2.3, 10.0, 50.0).is_finite());
    }
}
