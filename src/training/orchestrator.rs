// ============================================================
// Layer 5 — Training Orchestrator
// ============================================================
// Owns the epoch loop:
//
//   Init ─▶ ┌ Training ─▶ Evaluating ─▶ Checkpointing ┐ ─▶ Done
//           └──────────── for epoch in start..total ──┘
//
// Per epoch:
//   1. learning rate for this epoch from the scheduler
//   2. one training pass, one evaluation pass
//   3. log the epoch, update best accuracy (strict >),
//      save latest checkpoint (+ best copy on improvement)
//
// A run can be stopped between epochs without losing anything
// already checkpointed; there is no mid-epoch cancellation.

use std::path::Path;

use crate::domain::{
    error::TrainError,
    records::{CheckpointRecord, EpochRecord, RunState},
    traits::EpochRunner,
};
use crate::infra::{checkpoint::CheckpointStore, run_log::RunLog};
use crate::training::scheduler::LearningRateScheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Training,
    Evaluating,
    Checkpointing,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochOutcome {
    pub record: EpochRecord,
    pub is_best: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub best_accuracy: f64,
    pub final_state: RunState,
    pub epochs: Vec<EpochOutcome>,
}

pub struct TrainingOrchestrator<R: EpochRunner> {
    runner: R,
    scheduler: LearningRateScheduler,
    store: CheckpointStore,
    run_log: RunLog,
    total_epochs: usize,
    phase: Phase,
}

impl<R: EpochRunner> TrainingOrchestrator<R> {
    pub fn new(
        runner: R,
        scheduler: LearningRateScheduler,
        store: CheckpointStore,
        run_log: RunLog,
        total_epochs: usize,
    ) -> Self {
        Self { runner, scheduler, store, run_log, total_epochs, phase: Phase::Init }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run state for a run that starts from scratch at `start_epoch`.
    pub fn fresh_state(&mut self, start_epoch: usize) -> RunState {
        RunState::new(self.scheduler.maybe_decay(start_epoch))
    }

    /// Restore model, optimizer and best accuracy from a checkpoint.
    ///
    /// Returns the run state and the epoch to continue from.
    pub fn resume_from(&mut self, path: &Path) -> Result<(RunState, usize), TrainError> {
        let record = CheckpointStore::load(path)?;
        self.runner.restore(&record.snapshot())?;

        let start_epoch = record.resume_epoch();
        let state = RunState {
            best_accuracy: record.best_accuracy,
            learning_rate: self.scheduler.maybe_decay(start_epoch),
        };
        tracing::info!(
            "Resumed from '{}': epoch {}, best acc {:.2}, lr {:.4}",
            path.display(),
            start_epoch,
            state.best_accuracy,
            state.learning_rate,
        );
        Ok((state, start_epoch))
    }

    /// Drive epochs `start_epoch..total_epochs` to completion.
    pub fn run(&mut self, mut state: RunState, start_epoch: usize) -> Result<RunSummary, TrainError> {
        if self.phase != Phase::Init {
            return Err(TrainError::config("orchestrator has already run"));
        }

        let mut epochs = Vec::with_capacity(self.total_epochs.saturating_sub(start_epoch));
        for epoch in start_epoch..self.total_epochs {
            state.learning_rate = self.scheduler.maybe_decay(epoch);

            self.enter(Phase::Training);
            let train = self.runner.train_epoch(epoch, state.learning_rate)?;
            if !train.is_finite() {
                tracing::warn!("Training loss diverged at epoch {}: {}", epoch, train.loss);
            }

            self.enter(Phase::Evaluating);
            let test = self.runner.evaluate(epoch)?;

            self.enter(Phase::Checkpointing);
            let record = EpochRecord::new(epoch, state.learning_rate, train, test);
            self.run_log.log_epoch(&record)?;
            tracing::debug!("Top-5 accuracy: train {:.2}%, test {:.2}%", train.top5, test.top5);

            let is_best = state.record_accuracy(test.top1);
            let snapshot = self.runner.snapshot()?;
            let checkpoint = CheckpointRecord::new(epoch, snapshot, test.top1, state.best_accuracy);
            self.store.save(&checkpoint, is_best)?;

            epochs.push(EpochOutcome { record, is_best });
        }

        self.enter(Phase::Done);
        tracing::info!("Best acc: {:.2}", state.best_accuracy);
        Ok(RunSummary { best_accuracy: state.best_accuracy, final_state: state, epochs })
    }

    fn enter(&mut self, phase: Phase) {
        tracing::trace!("{:?} -> {:?}", self.phase, phase);
        self.phase = phase;
    }
}
