// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and
// their flags. Flags both commands need (dataset, architecture,
// batch sizes, checkpoint paths) live in `ExperimentArgs` and
// are flattened into each.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::{
    evaluate_use_case::EvaluateConfig, experiment::ExperimentConfig, train_use_case::TrainConfig,
};
use crate::data::cifar::DatasetKind;
use crate::ml::registry::ArchParams;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a network, checkpointing every epoch
    Train(TrainArgs),

    /// Evaluate a checkpoint before and after classifier rescaling
    Evaluate(EvaluateArgs),
}

#[derive(Args, Debug)]
pub struct ExperimentArgs {
    /// Dataset: cifar10 or cifar100
    #[arg(short = 'd', long, default_value = "cifar10")]
    pub dataset: DatasetKind,

    /// Directory holding the extracted CIFAR binary files
    /// [default: data/cifar-10-batches-bin or data/cifar-100-binary]
    #[arg(long)]
    pub data_dir: Option<String>,

    /// Model architecture (resnet, wrn)
    #[arg(short = 'a', long, default_value = "resnet")]
    pub arch: String,

    /// Model depth; defaults to the architecture's own default
    #[arg(long)]
    pub depth: Option<usize>,

    /// Widen factor (wrn only). 4 -> 64, 8 -> 128, ...
    #[arg(long)]
    pub widen_factor: Option<usize>,

    /// Dropout ratio inside residual blocks (wrn only)
    #[arg(long, alias = "dropout")]
    pub drop: Option<f64>,

    /// Imbalance factor: most / least frequent class count
    #[arg(long, default_value_t = 1.0)]
    pub imbalance: f64,

    /// Train batch size
    #[arg(long, default_value_t = 128)]
    pub train_batch: usize,

    /// Test batch size
    #[arg(long, default_value_t = 100)]
    pub test_batch: usize,

    /// Data loading worker threads (0 = load on the main thread)
    #[arg(short = 'j', long, default_value_t = 8)]
    pub workers: usize,

    /// Manual seed; drawn at random when omitted
    #[arg(long, alias = "manual-seed")]
    pub seed: Option<u64>,

    /// Directory for checkpoints, config and run log
    #[arg(short = 'c', long = "checkpoint", default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Checkpoint directory to resume from (e.g. checkpoints/checkpoint)
    #[arg(long)]
    pub resume: Option<String>,
}

impl From<ExperimentArgs> for ExperimentConfig {
    fn from(a: ExperimentArgs) -> Self {
        ExperimentConfig {
            dataset: a.dataset,
            data_dir: a.data_dir,
            arch: a.arch,
            arch_params: ArchParams {
                depth: a.depth,
                widen_factor: a.widen_factor,
                drop_rate: a.drop,
            },
            imbalance: a.imbalance,
            train_batch: a.train_batch,
            test_batch: a.test_batch,
            workers: a.workers,
            seed: a.seed,
            checkpoint_dir: a.checkpoint_dir,
            resume: a.resume,
        }
    }
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Number of total epochs to run
    #[arg(long, default_value_t = 180)]
    pub epochs: usize,

    /// Manual epoch number (overridden by --resume)
    #[arg(long, default_value_t = 0)]
    pub start_epoch: usize,

    /// Initial learning rate
    #[arg(long, alias = "learning-rate", default_value_t = 0.1)]
    pub lr: f64,

    /// Decrease the learning rate at these epochs
    #[arg(long, num_args = 1.., default_values_t = [80, 150])]
    pub schedule: Vec<usize>,

    /// Learning rate is multiplied by gamma on schedule
    #[arg(long, default_value_t = 0.1)]
    pub gamma: f64,

    /// SGD momentum
    #[arg(long, default_value_t = 0.9)]
    pub momentum: f64,

    /// L2 weight decay
    #[arg(long, alias = "wd", default_value_t = 5e-4)]
    pub weight_decay: f64,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            experiment: a.experiment.into(),
            epochs: a.epochs,
            start_epoch: a.start_epoch,
            lr: a.lr,
            schedule: a.schedule,
            gamma: a.gamma,
            momentum: a.momentum,
            weight_decay: a.weight_decay,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    #[command(flatten)]
    pub experiment: ExperimentArgs,

    /// Rescaling strength p: class rows are divided by (n_i / n_max)^p
    #[arg(long = "rs", alias = "rescale-strength", default_value_t = 0.1)]
    pub rescale_strength: f64,

    /// Balanced training set size the class profile is derived from
    #[arg(long, default_value_t = 50_000)]
    pub train_samples: usize,
}

impl From<EvaluateArgs> for EvaluateConfig {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateConfig {
            experiment: a.experiment.into(),
            rescale_strength: a.rescale_strength,
            train_samples: a.train_samples,
        }
    }
}
