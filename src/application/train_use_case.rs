// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates a full training run:
//
//   Step 1: Load the embedded corpus      (Layer 4 - data)
//   Step 2: Mine triplets                 (Layer 4 - data)
//   Step 3: Build the Burn dataset        (Layer 4 - data)
//   Step 4: Save the run config           (Layer 6 - infra)
//   Step 5: Open the scalar logger        (Layer 6 - infra)
//   Step 6: Run the training loop         (Layer 5 - ml)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    dataset::TripletDataset,
    loader::JsonCorpusLoader,
    triplets::TripletMiner,
};
use crate::domain::traits::CorpusSource;
use crate::infra::{checkpoint::CheckpointManager, metrics::ScalarLogger};
use crate::ml::{
    loss::TripletMarginLossConfig,
    model::FusionConfig,
    trainer::{run_training, TrainingSummary},
};

/// Compute device for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// GPU through wgpu (Vulkan / Metal / DX12), falling back to
    /// whatever adapter wgpu finds
    #[default]
    Wgpu,
    /// Pure-Rust ndarray CPU backend
    Cpu,
}

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Saved next to the checkpoints as train_config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Display name of the network being trained
    pub net:           String,
    pub batch_size:    usize,
    pub num_epochs:    usize,
    pub learning_rate: f64,
    pub weight_decay:  f64,

    /// Resume from `continue_on` instead of starting from scratch
    pub is_continue:   bool,

    pub corpus_dir:    String,
    pub source_data:   String,

    /// Directory new checkpoints are written to
    pub weights:       String,

    /// Checkpoint to resume from when `is_continue` is set
    pub continue_on:   String,

    /// Directory for the scalar CSV log
    pub log_dir:       String,

    pub hidden_dim:    usize,
    pub embedding_dim: usize,
    pub dropout:       f64,
    pub margin:        f64,

    pub triplets_per_anchor: usize,
    pub seed:          u64,
    pub num_workers:   usize,
    pub device:        DeviceKind,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            net:           "fusemodel".to_string(),
            batch_size:    64,
            num_epochs:    300,
            learning_rate: 0.001,
            weight_decay:  1e-8,
            is_continue:   false,
            corpus_dir:    "enrico_corpus".to_string(),
            source_data:   "enrico_expanded_embedding_nlp.json".to_string(),
            weights:       "./weights/fusemodel_no_cv/".to_string(),
            continue_on:   "./weights/fusemodel/fuse_no_cv_epoch_1".to_string(),
            log_dir:       "runs".to_string(),
            hidden_dim:    256,
            embedding_dim: 128,
            dropout:       0.1,
            margin:        1.0,
            triplets_per_anchor: 1,
            seed:          42,
            num_workers:   1,
            device:        DeviceKind::Wgpu,
        }
    }
}

impl TrainConfig {
    /// Architecture for a corpus with the given modality dimensions.
    pub fn fusion_config(&self, image_dim: usize, text_dim: usize) -> FusionConfig {
        FusionConfig::new(image_dim, text_dim)
            .with_hidden_dim(self.hidden_dim)
            .with_embedding_dim(self.embedding_dim)
            .with_dropout(self.dropout)
    }

    pub fn loss_config(&self) -> TripletMarginLossConfig {
        TripletMarginLossConfig::new().with_margin(self.margin)
    }

    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.num_epochs == 0 {
            bail!("num_epochs must be at least 1");
        }
        if self.learning_rate <= 0.0 {
            bail!("learning_rate must be positive (got {})", self.learning_rate);
        }
        if !(0.0..1.0).contains(&self.dropout) {
            bail!("dropout must be in [0, 1) (got {})", self.dropout);
        }
        if self.triplets_per_anchor == 0 {
            bail!("triplets_per_anchor must be at least 1");
        }
        Ok(())
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainingSummary> {
        let cfg = &self.config;
        cfg.validate()?;

        // ── Step 1: Load the embedded corpus ──────────────────────────────────
        let loader = JsonCorpusLoader::new(&cfg.corpus_dir, &cfg.source_data);
        let corpus = loader.load()?;
        if corpus.is_empty() {
            bail!("Corpus '{}' has no samples", loader.path().display());
        }

        // ── Step 2: Mine triplets ─────────────────────────────────────────────
        let triplets = TripletMiner::new(cfg.seed).mine(&corpus, cfg.triplets_per_anchor);
        if triplets.is_empty() {
            bail!(
                "No triplets could be formed from '{}': need at least two labels \
                 and one label with two or more samples",
                loader.path().display()
            );
        }

        // ── Step 3: Build the Burn dataset ────────────────────────────────────
        let dataset = TripletDataset::new(corpus, triplets);

        // ── Step 4: Save the run config for evaluation ────────────────────────
        // model_config.json is written by the trainer once the architecture
        // (fresh or resumed) is settled.
        let ckpt = CheckpointManager::new(&cfg.weights);
        ckpt.save_config(cfg)?;

        // ── Step 5: Scalar logger ─────────────────────────────────────────────
        let mut scalars = ScalarLogger::new(&cfg.log_dir)?;

        // ── Step 6: Training loop (Layer 5) ───────────────────────────────────
        println!("Training {}...", cfg.net);
        run_training(cfg, dataset, &ckpt, &mut scalars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fusemodel_run() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.num_epochs, 300);
        assert!((cfg.learning_rate - 0.001).abs() < 1e-12);
        assert!(!cfg.is_continue);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let cfg = TrainConfig { batch_size: 0, ..TrainConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_fusion_config_carries_dims() {
        let cfg = TrainConfig { hidden_dim: 32, embedding_dim: 8, ..TrainConfig::default() };
        let model_cfg = cfg.fusion_config(100, 50);
        assert_eq!(
            (model_cfg.image_dim, model_cfg.text_dim, model_cfg.hidden_dim, model_cfg.embedding_dim),
            (100, 50, 32, 8)
        );
    }

    #[test]
    fn test_config_json_roundtrip_keeps_device() {
        let cfg = TrainConfig { device: DeviceKind::Cpu, ..TrainConfig::default() };
        let json = serde_json::to_string(&cfg).unwrap();
        assert!(json.contains("\"cpu\""));
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.device, DeviceKind::Cpu);
    }

    #[test]
    fn test_execute_rejects_empty_corpus() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("empty.json"),
            r#"{"image_dim": 3, "text_dim": 2, "samples": []}"#,
        )
        .unwrap();
        let cfg = TrainConfig {
            corpus_dir:  tmp.path().display().to_string(),
            source_data: "empty.json".to_string(),
            weights:     tmp.path().join("w").display().to_string(),
            log_dir:     tmp.path().join("runs").display().to_string(),
            ..TrainConfig::default()
        };
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("no samples"));
    }

    #[test]
    fn test_execute_fails_without_corpus() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = TrainConfig {
            corpus_dir: tmp.path().display().to_string(),
            weights:    tmp.path().join("w").display().to_string(),
            log_dir:    tmp.path().join("runs").display().to_string(),
            ..TrainConfig::default()
        };
        assert!(TrainUseCase::new(cfg).execute().is_err());
    }
}
