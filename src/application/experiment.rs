// ============================================================
// Layer 2 — Experiment Setup
// ============================================================
// Settings shared by `train` and `evaluate`, plus the setup
// steps both workflows run before touching a model:
//
//   - seed resolution (explicit, or drawn from 1..=10000)
//   - checkpoint directory (relocated next to --resume)
//   - architecture lookup through the typed registry
//   - dataset loading, with long-tail subsampling for training

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::{
    cifar::{self, DatasetKind, Split},
    dataset::CifarDataset,
    imbalance,
};
use crate::ml::{
    model::NetworkConfig,
    registry::{ArchParams, ArchitectureRegistry, ResolvedParams},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub dataset: DatasetKind,
    /// Extracted archive directory; defaults per dataset when unset
    pub data_dir: Option<String>,
    pub arch: String,
    pub arch_params: ArchParams,
    /// Most / least frequent class ratio of the training split
    pub imbalance: f64,
    pub train_batch: usize,
    pub test_batch: usize,
    pub workers: usize,
    pub seed: Option<u64>,
    pub checkpoint_dir: String,
    pub resume: Option<String>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            dataset: DatasetKind::Cifar10,
            data_dir: None,
            arch: "resnet".to_string(),
            arch_params: ArchParams::default(),
            imbalance: 1.0,
            train_batch: 128,
            test_batch: 100,
            workers: 8,
            seed: None,
            checkpoint_dir: "checkpoints".to_string(),
            resume: None,
        }
    }
}

impl ExperimentConfig {
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::thread_rng().gen_range(1..=10_000))
    }

    /// Where artifacts go: the configured directory, or the
    /// directory holding the checkpoint being resumed.
    pub fn effective_checkpoint_dir(&self) -> PathBuf {
        match &self.resume {
            Some(resume) => match Path::new(resume).parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
            None => PathBuf::from(&self.checkpoint_dir),
        }
    }

    /// Final component of the checkpoint directory.
    pub fn experiment_name(&self) -> String {
        let dir = self.effective_checkpoint_dir();
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string())
    }

    /// Directory holding the binary archive files.
    pub fn data_path(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => PathBuf::from(self.dataset.default_data_dir()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.train_batch == 0 || self.test_batch == 0 {
            anyhow::bail!("batch sizes must be positive");
        }
        if self.imbalance.is_nan() || self.imbalance < 1.0 {
            anyhow::bail!("imbalance factor must be >= 1, got {}", self.imbalance);
        }
        Ok(())
    }

    pub fn network(&self) -> Result<(NetworkConfig, ResolvedParams)> {
        let registry = ArchitectureRegistry::with_builtins()?;
        let built = registry
            .build(&self.arch, &self.arch_params, self.dataset.num_classes())
            .with_context(|| format!("cannot build architecture '{}'", self.arch))?;
        Ok(built)
    }

    /// Training split after long-tail subsampling.
    pub fn load_train(&self, seed: u64) -> Result<CifarDataset> {
        tracing::info!("==> Preparing dataset {}", self.dataset);
        let images = cifar::load_split(&self.data_path(), self.dataset, Split::Train)
            .context("failed to load training split")?;
        let kept = imbalance::long_tail(images, self.dataset.num_classes(), self.imbalance, seed)?;
        Ok(CifarDataset::new(kept))
    }

    pub fn load_test(&self) -> Result<CifarDataset> {
        let images = cifar::load_split(&self.data_path(), self.dataset, Split::Test)
            .context("failed to load test split")?;
        Ok(CifarDataset::new(images))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_relocates_checkpoint_dir() {
        let cfg = ExperimentConfig {
            checkpoint_dir: "checkpoints".into(),
            resume: Some("runs/wrn_r100/checkpoint".into()),
            ..Default::default()
        };
        assert_eq!(cfg.effective_checkpoint_dir(), PathBuf::from("runs/wrn_r100"));
        assert_eq!(cfg.experiment_name(), "wrn_r100");
    }

    #[test]
    fn bare_resume_path_uses_current_dir() {
        let cfg = ExperimentConfig { resume: Some("checkpoint".into()), ..Default::default() };
        assert_eq!(cfg.effective_checkpoint_dir(), PathBuf::from("."));
    }

    #[test]
    fn explicit_seed_wins() {
        let cfg = ExperimentConfig { seed: Some(17), ..Default::default() };
        assert_eq!(cfg.resolve_seed(), 17);
        let drawn = ExperimentConfig::default().resolve_seed();
        assert!((1..=10_000).contains(&drawn));
    }

    #[test]
    fn data_dir_follows_dataset_unless_given() {
        let cfg = ExperimentConfig::default();
        assert_eq!(cfg.data_path(), PathBuf::from("data/cifar-10-batches-bin"));
        let cfg = ExperimentConfig { dataset: DatasetKind::Cifar100, ..Default::default() };
        assert_eq!(cfg.data_path(), PathBuf::from("data/cifar-100-binary"));
        let cfg = ExperimentConfig { data_dir: Some("/mnt/c100".into()), ..cfg };
        assert_eq!(cfg.data_path(), PathBuf::from("/mnt/c100"));
    }

    #[test]
    fn rejects_unknown_architecture() {
        let cfg = ExperimentConfig { arch: "vgg".into(), ..Default::default() };
        assert!(cfg.network().is_err());
        assert!(ExperimentConfig::default().network().is_ok());
    }

    #[test]
    fn validation_catches_bad_values() {
        let cfg = ExperimentConfig { imbalance: 0.5, ..Default::default() };
        assert!(cfg.validate().is_err());
        let cfg = ExperimentConfig { train_batch: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
        assert!(ExperimentConfig::default().validate().is_ok());
    }
}
