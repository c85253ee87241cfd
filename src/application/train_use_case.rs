// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run in order:
//
//   Step 1: Validate config, fail fast on a missing resume path
//   Step 2: Resolve seed and checkpoint directory, save config
//   Step 3: Resolve the architecture            (Layer 6 - ml)
//   Step 4: Load + long-tail the training split (Layer 4 - data)
//   Step 5: Build model, SGD and loaders        (Layer 6 - ml)
//   Step 6: Build scheduler, store and run log  (Layers 5, 7)
//   Step 7: Resume or start fresh, run epochs   (Layer 5)
//
// Reference: Burn Book §5 (Training)

use std::path::Path;

use anyhow::{Context, Result};
use burn::{module::Module, tensor::backend::Backend};
use serde::{Deserialize, Serialize};

use crate::application::experiment::ExperimentConfig;
use crate::data::loader::{test_loader, train_loader};
use crate::domain::error::TrainError;
use crate::infra::{checkpoint::CheckpointStore, run_log::RunLog};
use crate::ml::{
    model::CifarNet,
    session::{momentum_sgd, BurnSession},
    ComputeBackend, TrainBackend,
};
use crate::training::{
    orchestrator::{RunSummary, TrainingOrchestrator},
    scheduler::LearningRateScheduler,
};

// ─── Training Configuration ──────────────────────────────────────────────────
// Saved as train_config.json in the checkpoint directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub experiment: ExperimentConfig,
    pub epochs: usize,
    pub start_epoch: usize,
    pub lr: f64,
    pub schedule: Vec<usize>,
    pub gamma: f64,
    pub momentum: f64,
    pub weight_decay: f64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            experiment: ExperimentConfig::default(),
            epochs: 180,
            start_epoch: 0,
            lr: 0.1,
            schedule: vec![80, 150],
            gamma: 0.1,
            momentum: 0.9,
            weight_decay: 5e-4,
        }
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training run end to end.
    pub fn execute(&self) -> Result<RunSummary> {
        let cfg = &self.config;
        let exp = &cfg.experiment;

        // ── Step 1: Fail before any data is loaded ────────────────────────────
        exp.validate()?;
        let scheduler = LearningRateScheduler::new(cfg.lr, cfg.schedule.clone(), cfg.gamma)?;
        if let Some(resume) = &exp.resume {
            if !Path::new(resume).is_dir() {
                return Err(TrainError::CheckpointNotFound { path: resume.into() })
                    .context("cannot resume");
            }
        }

        // ── Step 2: Seed and artifacts directory ──────────────────────────────
        let seed = exp.resolve_seed();
        TrainBackend::seed(seed);
        let dir = exp.effective_checkpoint_dir();
        let store = CheckpointStore::new(&dir)?;
        let mut saved = cfg.clone();
        saved.experiment.seed = Some(seed);
        saved.experiment.checkpoint_dir = dir.display().to_string();
        store.save_config(&saved)?;
        tracing::info!("Experiment Name : {} (seed {})", exp.experiment_name(), seed);

        // ── Step 3: Architecture ──────────────────────────────────────────────
        let (net_cfg, resolved) = exp.network()?;
        tracing::info!(
            "==> creating model '{}' (depth {}, widen {}, drop {})",
            exp.arch,
            resolved.depth,
            resolved.widen_factor,
            resolved.drop_rate,
        );

        // ── Step 4: Data ──────────────────────────────────────────────────────
        let train_set = exp.load_train(seed)?;
        tracing::info!(
            "Training images per class: {:?}",
            train_set.class_counts(exp.dataset.num_classes())
        );
        let test_set = exp.load_test()?;

        // ── Step 5: Model, optimizer, loaders ─────────────────────────────────
        let device = <ComputeBackend as Backend>::Device::default();
        let model: CifarNet<TrainBackend> = net_cfg.init(&device);
        tracing::info!("    Total params: {:.2}M", model.num_params() as f64 / 1e6);

        let optim = momentum_sgd::<TrainBackend>(cfg.momentum, cfg.weight_decay);
        let train = train_loader::<TrainBackend>(train_set, exp.train_batch, exp.workers, seed, &device);
        let test = test_loader::<ComputeBackend>(test_set, exp.test_batch, exp.workers, &device);
        let session = BurnSession::new(model, optim, train, test, exp.train_batch, device);

        // ── Step 6: Loop collaborators ────────────────────────────────────────
        let title = match &exp.resume {
            Some(_) => format!("{} (resumed)", exp.experiment_name()),
            None => exp.experiment_name(),
        };
        let run_log = RunLog::open(&dir, &title, cfg.epochs)?;
        let mut orchestrator = TrainingOrchestrator::new(session, scheduler, store, run_log, cfg.epochs);

        // ── Step 7: Resume or start fresh ─────────────────────────────────────
        let (state, start_epoch) = match &exp.resume {
            Some(resume) => {
                tracing::info!("==> Resuming from checkpoint '{}'", resume);
                orchestrator.resume_from(Path::new(resume))?
            }
            None => (orchestrator.fresh_state(cfg.start_epoch), cfg.start_epoch),
        };

        let summary = orchestrator.run(state, start_epoch)?;
        Ok(summary)
    }
}
