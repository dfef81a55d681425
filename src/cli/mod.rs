// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with clap.
// All work is delegated to Layer 2 (application).
//
//   1. `train`: trains the fusion model on mined triplets
//   2. `evaluate`: scores a checkpoint on a triplet set

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "ui2vec",
    version,
    about = "Train a multimodal UI embedding model with triplet loss."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case; the CLI never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)    => run_train(args),
            Commands::Evaluate(args) => run_evaluate(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training on '{}/{}'", args.corpus_dir, args.source_data);

    let summary = TrainUseCase::new(args.into()).execute()?;
    tracing::info!(
        "Epochs {}..{} done, final loss {:.6}, {} checkpoint(s) saved",
        summary.start_epoch + 1,
        summary.last_epoch,
        summary.final_loss,
        summary.saved.len(),
    );
    Ok(())
}

fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    use crate::application::evaluate_use_case::EvaluateUseCase;

    let (meta, report) = EvaluateUseCase::new(args.into()).execute()?;
    println!(
        "epoch:{}, triplets:{}, loss:{:.6}, accuracy:{:.2}%",
        meta.epoch,
        report.triplets,
        report.loss,
        report.accuracy * 100.0,
    );
    Ok(())
}
