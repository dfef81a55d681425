// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `evaluate`, and
// all their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand, ValueEnum};

use crate::application::evaluate_use_case::EvaluateRequest;
use crate::application::train_use_case::{DeviceKind, TrainConfig};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the fusion embedding model with triplet loss
    Train(TrainArgs),

    /// Score a saved checkpoint (mean triplet loss and accuracy)
    Evaluate(EvaluateArgs),
}

/// Compute device selectable from the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DeviceArg {
    /// GPU through wgpu
    Wgpu,
    /// CPU through ndarray
    Cpu,
}

impl From<DeviceArg> for DeviceKind {
    fn from(d: DeviceArg) -> Self {
        match d {
            DeviceArg::Wgpu => DeviceKind::Wgpu,
            DeviceArg::Cpu  => DeviceKind::Cpu,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Name of the network, used in log output
    #[arg(long, default_value = "fusemodel")]
    pub net: String,

    /// Directory holding the embedded corpus
    #[arg(long, default_value = "enrico_corpus")]
    pub corpus_dir: String,

    /// Corpus file inside --corpus-dir
    #[arg(long, default_value = "enrico_expanded_embedding_nlp.json")]
    pub source_data: String,

    /// Directory new checkpoints are written to
    #[arg(long, default_value = "./weights/fusemodel_no_cv/")]
    pub weights: String,

    /// Resume from --continue-on instead of starting from scratch
    #[arg(long = "continue")]
    pub is_continue: bool,

    /// Checkpoint to resume from (with or without .mpk.gz)
    #[arg(long, default_value = "./weights/fusemodel/fuse_no_cv_epoch_1")]
    pub continue_on: String,

    /// Directory for the scalar loss log
    #[arg(long, default_value = "runs")]
    pub log_dir: String,

    /// Triplets per mini-batch
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Number of epochs to run in this invocation
    #[arg(long, default_value_t = 300)]
    pub num_epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 0.001)]
    pub learning_rate: f64,

    /// Adam weight decay (L2 penalty)
    #[arg(long, default_value_t = 1e-8)]
    pub weight_decay: f64,

    /// Width of each per-modality projection
    #[arg(long, default_value_t = 256)]
    pub hidden_dim: usize,

    /// Size of the output embedding
    #[arg(long, default_value_t = 128)]
    pub embedding_dim: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Triplet loss margin
    #[arg(long, default_value_t = 1.0)]
    pub margin: f64,

    /// Triplets mined per anchor screen
    #[arg(long, default_value_t = 1)]
    pub triplets_per_anchor: usize,

    /// Seed for triplet mining and dataloader shuffling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 1)]
    pub num_workers: usize,

    #[arg(long, value_enum, default_value_t = DeviceArg::Wgpu)]
    pub device: DeviceArg,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            net:           a.net,
            batch_size:    a.batch_size,
            num_epochs:    a.num_epochs,
            learning_rate: a.learning_rate,
            weight_decay:  a.weight_decay,
            is_continue:   a.is_continue,
            corpus_dir:    a.corpus_dir,
            source_data:   a.source_data,
            weights:       a.weights,
            continue_on:   a.continue_on,
            log_dir:       a.log_dir,
            hidden_dim:    a.hidden_dim,
            embedding_dim: a.embedding_dim,
            dropout:       a.dropout,
            margin:        a.margin,
            triplets_per_anchor: a.triplets_per_anchor,
            seed:          a.seed,
            num_workers:   a.num_workers,
            device:        a.device.into(),
        }
    }
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Weights directory written by `train`
    #[arg(long, default_value = "./weights/fusemodel_no_cv/")]
    pub weights: String,

    /// Checkpoint to score; defaults to the latest in --weights
    #[arg(long)]
    pub checkpoint: Option<String>,

    /// Override the corpus directory recorded at training time
    #[arg(long)]
    pub corpus_dir: Option<String>,

    /// Override the corpus file recorded at training time
    #[arg(long)]
    pub source_data: Option<String>,

    #[arg(long)]
    pub batch_size: Option<usize>,

    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,
}

impl From<EvaluateArgs> for EvaluateRequest {
    fn from(a: EvaluateArgs) -> Self {
        EvaluateRequest {
            weights:     a.weights,
            checkpoint:  a.checkpoint,
            corpus_dir:  a.corpus_dir,
            source_data: a.source_data,
            batch_size:  a.batch_size,
            device:      a.device.map(Into::into),
        }
    }
}
