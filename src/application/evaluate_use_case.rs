// ============================================================
// Layer 2 — EvaluateUseCase
// ============================================================
// Scores a saved checkpoint on a triplet set:
//
//   1. Read train_config.json + model_config.json from the
//      weights directory
//   2. Pick the requested checkpoint, or the latest one
//   3. Load the corpus (optionally a different file) and mine
//      triplets with the run's seed
//   4. Report mean triplet loss and triplet accuracy

use anyhow::{anyhow, bail, Result};
use std::path::PathBuf;

use crate::application::train_use_case::DeviceKind;
use crate::data::{
    dataset::TripletDataset,
    loader::JsonCorpusLoader,
    triplets::TripletMiner,
};
use crate::domain::traits::CorpusSource;
use crate::infra::checkpoint::{CheckpointManager, CheckpointMeta};
use crate::ml::evaluator::{evaluate_checkpoint, EvalReport};

#[derive(Debug, Clone, Default)]
pub struct EvaluateRequest {
    pub weights:     String,
    /// Explicit checkpoint; latest in `weights` when absent
    pub checkpoint:  Option<String>,
    /// Overrides of the values recorded at training time
    pub corpus_dir:  Option<String>,
    pub source_data: Option<String>,
    pub batch_size:  Option<usize>,
    pub device:      Option<DeviceKind>,
}

pub struct EvaluateUseCase {
    request: EvaluateRequest,
}

impl EvaluateUseCase {
    pub fn new(request: EvaluateRequest) -> Self {
        Self { request }
    }

    pub fn execute(&self) -> Result<(CheckpointMeta, EvalReport)> {
        let req  = &self.request;
        let ckpt = CheckpointManager::new(&req.weights);

        let train_cfg = ckpt.load_config()?;
        let model_cfg = ckpt.load_model_config()?;

        let batch_size = req.batch_size.unwrap_or(train_cfg.batch_size);
        if batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        let checkpoint: PathBuf = match &req.checkpoint {
            Some(path) => PathBuf::from(path),
            None => {
                let epoch = ckpt.latest()?.ok_or_else(|| {
                    anyhow!("No checkpoints found in '{}'", ckpt.dir().display())
                })?;
                ckpt.path_for(epoch)
            }
        };

        let corpus_dir  = req.corpus_dir.as_deref().unwrap_or(&train_cfg.corpus_dir);
        let source_data = req.source_data.as_deref().unwrap_or(&train_cfg.source_data);
        let corpus = JsonCorpusLoader::new(corpus_dir, source_data).load()?;

        if corpus.image_dim != model_cfg.image_dim || corpus.text_dim != model_cfg.text_dim {
            bail!(
                "Corpus dimensions ({}, {}) do not match the model ({}, {})",
                corpus.image_dim, corpus.text_dim, model_cfg.image_dim, model_cfg.text_dim
            );
        }

        let triplets = TripletMiner::new(train_cfg.seed)
            .mine(&corpus, train_cfg.triplets_per_anchor);
        let dataset = TripletDataset::new(corpus, triplets);

        let (meta, report) = evaluate_checkpoint(
            req.device.unwrap_or(train_cfg.device),
            &model_cfg,
            &checkpoint,
            dataset,
            batch_size,
            &train_cfg.loss_config().init(),
        )?;

        tracing::info!(
            "Checkpoint epoch {}: loss={:.6}, accuracy={:.4} over {} triplets",
            meta.epoch, report.loss, report.accuracy, report.triplets
        );
        Ok((meta, report))
    }
}
