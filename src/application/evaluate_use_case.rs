// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Evaluation-only mode with post-hoc classifier rescaling:
//
//   Step 1: Load the checkpoint (resume path, else model_best)
//   Step 2: Rebuild the architecture and load its weights
//   Step 3: Evaluate on the test split          → "w/o RS"
//   Step 4: Rescale the fc rows by class frequency
//   Step 5: Evaluate again                      → "w/  RS"
//
// Never writes a checkpoint. Runs on the plain compute backend,
// so batch norm uses running statistics throughout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use serde::{Deserialize, Serialize};

use crate::application::experiment::ExperimentConfig;
use crate::data::loader::test_loader;
use crate::domain::{frequency::ClassFrequencyProfile, records::EpochStats};
use crate::infra::checkpoint::CheckpointStore;
use crate::ml::{
    evaluator::Evaluator,
    head::{read_classifier, write_classifier},
    model::CifarNet,
    state::decode_model,
    ComputeBackend,
};
use crate::training::rescale::rescale;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateConfig {
    pub experiment: ExperimentConfig,
    /// Rescaling strength p in s(i) = n(i)^p
    pub rescale_strength: f64,
    /// Size of the balanced training set the class profile is derived from
    pub train_samples: usize,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self { experiment: ExperimentConfig::default(), rescale_strength: 0.1, train_samples: 50_000 }
    }
}

impl EvaluateConfig {
    /// Checkpoint to evaluate: the resume path if given, otherwise
    /// the best checkpoint in the configured directory.
    pub fn checkpoint_path(&self) -> PathBuf {
        match &self.experiment.resume {
            Some(path) => PathBuf::from(path),
            None => CheckpointStore::best_path_in(&self.experiment.checkpoint_dir),
        }
    }

    pub fn profile(&self) -> Result<ClassFrequencyProfile> {
        Ok(ClassFrequencyProfile::exponential(
            self.train_samples as f64,
            self.experiment.dataset.num_classes(),
            self.experiment.imbalance,
        )?)
    }
}

/// Test metrics before and after rescaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationReport {
    pub epoch: usize,
    pub without_rescale: EpochStats,
    pub with_rescale: EpochStats,
}

pub struct EvaluateUseCase {
    config: EvaluateConfig,
}

impl EvaluateUseCase {
    pub fn new(config: EvaluateConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<EvaluationReport> {
        let cfg = &self.config;
        let exp = &cfg.experiment;
        exp.validate()?;
        let profile = cfg.profile()?;

        // ── Step 1: Checkpoint ────────────────────────────────────────────────
        let path = cfg.checkpoint_path();
        let record = CheckpointStore::load(&path)
            .with_context(|| format!("cannot evaluate checkpoint '{}'", path.display()))?;
        tracing::info!(
            "Evaluating epoch {} checkpoint (acc {:.2}, best {:.2})",
            record.epoch + 1,
            record.accuracy,
            record.best_accuracy,
        );

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let (net_cfg, _) = exp.network()?;
        let device = <ComputeBackend as Backend>::Device::default();
        let model: CifarNet<ComputeBackend> = net_cfg.init(&device);
        let model = decode_model(model, &record.architecture, &record.model_state, &device)?;

        // ── Step 3: Baseline ──────────────────────────────────────────────────
        let loader = test_loader::<ComputeBackend>(exp.load_test()?, exp.test_batch, exp.workers, &device);
        let without_rescale = Evaluator::run_epoch(&model, loader.as_ref());

        // ── Steps 4-5: Rescale once, re-evaluate ─────────────────────────────
        let weights = read_classifier(&model)?;
        let scaled = rescale(&weights, &profile, cfg.rescale_strength)?;
        let model = write_classifier(model, &scaled)?;
        let with_rescale = Evaluator::run_epoch(&model, loader.as_ref());

        Ok(EvaluationReport { epoch: record.epoch, without_rescale, with_rescale })
    }
}
