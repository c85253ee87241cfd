// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All workflow logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `train`    — trains a network, checkpointing every epoch
//   2. `evaluate` — evaluates a checkpoint with and without
//                   classifier weight rescaling
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "cifar-longtail",
    version = "0.1.0",
    about = "Train CIFAR-10/100 classifiers on long-tailed data, then evaluate with classifier rescaling."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case; this layer only routes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    let config: TrainConfig = args.into();
    tracing::info!("Training {} on '{}'", config.experiment.arch, config.experiment.data_path().display());
    let summary = TrainUseCase::new(config).execute()?;

    println!("Best acc:");
    println!("{}", summary.best_accuracy);
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    println!("\nEvaluation only");
    let report = EvaluateUseCase::new(args.into()).execute()?;
    println!(
        "[w/o RS] Test Loss: {:.8}, Test Acc: {:.2}%",
        report.without_rescale.loss, report.without_rescale.top1
    );
    println!(
        "[w/  RS] Test Loss: {:.8}, Test Acc: {:.2}%",
        report.with_rescale.loss, report.with_rescale.top1
    );
    Ok(())
}
