// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores fusion-model checkpoints.
//
// A checkpoint record is {parameters, epoch, loss}, stored as
// two files sharing a base name:
//   fuse_epoch_<n>.mpk.gz  ← parameters (Burn CompactRecorder)
//   fuse_epoch_<n>.json    ← {"epoch": n, "loss": ...}
//
// The weights directory also holds:
//   train_config.json      ← TrainConfig used for the run
//   model_config.json      ← FusionConfig (architecture)
//
// `epoch` is the number of completed epochs, so resuming from
// fuse_epoch_7 continues with the 8th epoch.
//
// Burn's CompactRecorder:
//   - Serialises parameters to MessagePack, gzip-compressed
//   - Restores whatever shapes were saved, so `load` compares
//     them against the target model and fails on a mismatch
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::{bail, Context, Result};
use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
};
use serde::{Deserialize, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::ml::model::{FusionConfig, FusionModel};

const CHECKPOINT_PREFIX: &str = "fuse_epoch_";
const MODEL_CONFIG:      &str = "model_config.json";

/// The non-parameter half of a checkpoint record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    /// Number of completed epochs when the checkpoint was taken
    pub epoch: usize,
    /// Mean training loss of that epoch
    pub loss: f64,
}

/// Manages saving and loading of checkpoints under one directory.
pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// The directory is created lazily, on the first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base path (no extension) of the checkpoint for `epoch`.
    pub fn path_for(&self, epoch: usize) -> PathBuf {
        self.dir.join(format!("{CHECKPOINT_PREFIX}{epoch}"))
    }

    /// Save parameters + meta for `epoch`, returning the base path.
    pub fn save<B: Backend>(
        &self,
        model: &FusionModel<B>,
        epoch: usize,
        loss:  f64,
    ) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(epoch);

        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| {
                format!("Failed to save checkpoint to '{}'", path.display())
            })?;

        let meta = CheckpointMeta { epoch, loss };
        let meta_path = meta_path(&path);
        fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("Failed to write '{}'", meta_path.display()))?;

        tracing::debug!("Saved checkpoint: epoch {} (loss={:.6})", epoch, loss);
        Ok(path)
    }

    /// Load a checkpoint into `model`. Not tied to this manager's
    /// directory: `--continue-on` may point at another run.
    ///
    /// `path` may be given with or without the `.mpk.gz` extension.
    /// The model must have the architecture the checkpoint was saved with.
    pub fn load<B: Backend>(
        model:  FusionModel<B>,
        path:   impl AsRef<Path>,
        device: &B::Device,
    ) -> Result<(FusionModel<B>, CheckpointMeta)> {
        let base = strip_checkpoint_ext(path.as_ref());

        let record = CompactRecorder::new()
            .load(base.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'", base.display())
            })?;

        let meta_path = meta_path(&base);
        let json = fs::read_to_string(&meta_path)
            .with_context(|| format!("Cannot read '{}'", meta_path.display()))?;
        let meta: CheckpointMeta = serde_json::from_str(&json)
            .with_context(|| format!("Malformed checkpoint meta '{}'", meta_path.display()))?;

        let expected = model.param_shapes();
        let model    = model.load_record(record);
        let found    = model.param_shapes();
        if found != expected {
            bail!(
                "Checkpoint '{}' does not fit the model: expected weight shapes {:?}, found {:?}",
                base.display(), expected, found
            );
        }

        tracing::info!("Loaded checkpoint '{}' (epoch {})", base.display(), meta.epoch);
        Ok((model, meta))
    }

    /// The `model_config.json` sitting next to a checkpoint, if any.
    pub fn model_config_beside(checkpoint: impl AsRef<Path>) -> Result<Option<FusionConfig>> {
        let path = checkpoint
            .as_ref()
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(MODEL_CONFIG);
        if !path.is_file() {
            return Ok(None);
        }
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        let cfg: FusionConfig = serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))?;
        Ok(Some(cfg))
    }

    /// Highest epoch with a saved checkpoint in this directory.
    pub fn latest(&self) -> Result<Option<usize>> {
        if !self.dir.exists() {
            return Ok(None);
        }
        let mut latest = None;
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Cannot read directory '{}'", self.dir.display()))?
        {
            let name = entry?.file_name();
            let epoch = name
                .to_str()
                .and_then(|n| n.strip_prefix(CHECKPOINT_PREFIX))
                .and_then(|n| n.strip_suffix(".json"))
                .and_then(|n| n.parse::<usize>().ok());
            if let Some(epoch) = epoch {
                latest = latest.max(Some(epoch));
            }
        }
        Ok(latest)
    }

    /// Persist the run configuration as train_config.json.
    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    pub fn load_config(&self) -> Result<TrainConfig> {
        self.read_json("train_config.json")
    }

    /// Persist the architecture so evaluation can rebuild the model.
    pub fn save_model_config(&self, cfg: &FusionConfig) -> Result<()> {
        self.write_json(MODEL_CONFIG, cfg)
    }

    pub fn load_model_config(&self) -> Result<FusionConfig> {
        self.read_json(MODEL_CONFIG)
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.is_dir() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("Cannot create '{}'", self.dir.display()))?;
        }
        Ok(())
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| {
                format!(
                    "Cannot read '{}'. Make sure you have run 'train' first.",
                    path.display()
                )
            })?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

/// `fuse_epoch_3.mpk.gz` / `fuse_epoch_3.json` → `fuse_epoch_3`
fn strip_checkpoint_ext(path: &Path) -> PathBuf {
    let inner_ext = path.file_stem().map(Path::new).and_then(Path::extension);
    match path.extension().and_then(OsStr::to_str) {
        Some("json") => path.with_extension(""),
        Some("gz") if inner_ext == Some(OsStr::new("mpk")) => {
            path.with_extension("").with_extension("")
        }
        _ => path.to_path_buf(),
    }
}

fn meta_path(base: &Path) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".json");
    PathBuf::from(name)
}
