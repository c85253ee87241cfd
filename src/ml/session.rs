// ============================================================
// Layer 6 — Burn Session
// ============================================================
// Bundles one model, its optimizer and both data loaders, and
// exposes them to the orchestrator through `EpochRunner`.
//
//   train_epoch → Trainer on Autodiff<B>
//   evaluate    → Evaluator on model.valid() (inner backend)
//   snapshot    → model + optimizer records as bytes, tagged
//                 with the model's architecture fingerprint
//   restore     → fingerprint checked, then records loaded back
//                 into model + optimizer

use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    module::AutodiffModule,
    optim::{decay::WeightDecayConfig, momentum::MomentumConfig, Optimizer, SgdConfig},
    tensor::backend::AutodiffBackend,
};

use crate::data::batcher::CifarBatch;
use crate::domain::{
    error::TrainError,
    records::{EpochStats, StateSnapshot},
    traits::EpochRunner,
};
use crate::ml::{evaluator::Evaluator, model::CifarNet, state, trainer::Trainer};

/// SGD with classical momentum (no dampening, no Nesterov) and L2
/// weight decay. The learning rate is supplied per step.
pub fn momentum_sgd<B: AutodiffBackend>(
    momentum: f64,
    weight_decay: f64,
) -> impl Optimizer<CifarNet<B>, B> + Clone {
    SgdConfig::new()
        .with_momentum(Some(
            MomentumConfig::new()
                .with_momentum(momentum)
                .with_dampening(0.0)
                .with_nesterov(false),
        ))
        .with_weight_decay(Some(WeightDecayConfig::new(weight_decay as f32)))
        .init()
}

pub struct BurnSession<B: AutodiffBackend, O> {
    model: CifarNet<B>,
    optim: O,
    train_loader: Arc<dyn DataLoader<CifarBatch<B>>>,
    test_loader: Arc<dyn DataLoader<CifarBatch<B::InnerBackend>>>,
    trainer: Trainer,
    device: B::Device,
}

impl<B, O> BurnSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<CifarNet<B>, B> + Clone,
{
    pub fn new(
        model: CifarNet<B>,
        optim: O,
        train_loader: Arc<dyn DataLoader<CifarBatch<B>>>,
        test_loader: Arc<dyn DataLoader<CifarBatch<B::InnerBackend>>>,
        train_batch_size: usize,
        device: B::Device,
    ) -> Self {
        Self {
            model,
            optim,
            train_loader,
            test_loader,
            trainer: Trainer::new(train_batch_size),
            device,
        }
    }

    pub fn model(&self) -> &CifarNet<B> {
        &self.model
    }
}

impl<B, O> EpochRunner for BurnSession<B, O>
where
    B: AutodiffBackend,
    O: Optimizer<CifarNet<B>, B> + Clone,
{
    fn train_epoch(&mut self, epoch: usize, learning_rate: f64) -> Result<EpochStats, TrainError> {
        let (model, stats) = self.trainer.run_epoch(
            self.model.clone(),
            &mut self.optim,
            self.train_loader.as_ref(),
            epoch,
            learning_rate,
        );
        self.model = model;
        Ok(stats)
    }

    fn evaluate(&self, _epoch: usize) -> Result<EpochStats, TrainError> {
        Ok(Evaluator::run_epoch(&self.model.valid(), self.test_loader.as_ref()))
    }

    fn snapshot(&self) -> Result<StateSnapshot, TrainError> {
        Ok(StateSnapshot {
            architecture: self.model.architecture(),
            model: state::encode_model(&self.model)?,
            optimizer: state::encode_optimizer::<B, CifarNet<B>, O>(&self.optim)?,
        })
    }

    fn restore(&mut self, snapshot: &StateSnapshot) -> Result<(), TrainError> {
        let model = state::decode_model(
            self.model.clone(),
            &snapshot.architecture,
            &snapshot.model,
            &self.device,
        )?;
        let optim = state::decode_optimizer::<B, CifarNet<B>, O>(
            self.optim.clone(),
            &snapshot.optimizer,
            &self.device,
        )?;
        self.model = model;
        self.optim = optim;
        Ok(())
    }
}
