// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Triplet training of the fusion network with Burn's
// DataLoader and Adam.
//
// Per batch:
//   anchor, positive and negative are embedded by the SAME
//   network, the triplet margin loss is computed on the three
//   embeddings, then backward + Adam step.
//
// Per epoch:
//   epoch loss = sum of batch losses / number of batches
//   → scalar log ("Loss/train", loss, epoch) + flush
//   → checkpoint when the loss beats the benchmark, and
//     unconditionally every 10th epoch (the benchmark is
//     reset to the current loss either way)
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam

use anyhow::{bail, Result};
use burn::{
    backend::{
        ndarray::NdArrayDevice,
        wgpu::WgpuDevice,
        Autodiff, NdArray, Wgpu,
    },
    data::dataloader::{DataLoader, DataLoaderBuilder},
    optim::{decay::WeightDecayConfig, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};
use std::sync::Arc;

use crate::application::train_use_case::{DeviceKind, TrainConfig};
use crate::data::{
    batcher::{TripletBatch, TripletBatcher},
    dataset::TripletDataset,
};
use crate::domain::traits::ScalarSink;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::loss::TripletMarginLoss;
use crate::ml::model::{FusionConfig, FusionModel};

/// Benchmark loss used when training starts from scratch.
pub const INITIAL_BENCH_LOSS: f64 = 10000.0;

/// Scalar tag for the per-epoch training loss.
pub const TRAIN_LOSS_TAG: &str = "Loss/train";

/// Outcome of a `run_training` call.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// Completed epochs before this run (0 when starting from scratch)
    pub start_epoch: usize,
    /// Completed epochs after this run
    pub last_epoch:  usize,
    pub final_loss:  f64,
    /// Benchmark loss at the end of the run
    pub bench_loss:  f64,
    /// Epoch numbers (1-based) of the checkpoints written
    pub saved:       Vec<usize>,
}

/// Dispatch on the configured device and train.
pub fn run_training(
    cfg:     &TrainConfig,
    dataset: TripletDataset,
    ckpt:    &CheckpointManager,
    scalars: &mut impl ScalarSink,
) -> Result<TrainingSummary> {
    match cfg.device {
        DeviceKind::Wgpu => {
            let device = WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            train_loop::<Autodiff<Wgpu>>(cfg, dataset, ckpt, scalars, device)
        }
        DeviceKind::Cpu => {
            let device = NdArrayDevice::default();
            tracing::info!("Using CPU (ndarray) device");
            train_loop::<Autodiff<NdArray>>(cfg, dataset, ckpt, scalars, device)
        }
    }
}

/// Save when the loss improves on the benchmark or on every 10th epoch
/// (0-based), matching the periodic snapshot cadence.
pub fn should_checkpoint(loss: f64, bench_loss: f64, epoch: usize) -> bool {
    loss < bench_loss || epoch % 10 == 0
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:     &TrainConfig,
    dataset: TripletDataset,
    ckpt:    &CheckpointManager,
    scalars: &mut impl ScalarSink,
    device:  B::Device,
) -> Result<TrainingSummary> {

    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = resolve_model_config(cfg, dataset.image_dim(), dataset.text_dim())?;
    let model: FusionModel<B> = model_cfg.init(&device);
    let (mut model, start_epoch, mut bench_loss) = configure_train(cfg, model, &device)?;
    ckpt.save_model_config(&model_cfg)?;

    let criterion = cfg.loss_config().init();

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let mut optim = AdamConfig::new()
        .with_beta_1(0.9)
        .with_beta_2(0.999)
        .with_epsilon(1e-8)
        .with_weight_decay(Some(WeightDecayConfig::new(cfg.weight_decay as _)))
        .init();

    // ── Training data loader ──────────────────────────────────────────────────
    tracing::info!(
        "{} triplets, batch_size={}, {} epoch(s)",
        dataset.triplet_count(), cfg.batch_size, cfg.num_epochs
    );
    let batcher = TripletBatcher::<B>::new(device.clone());
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .num_workers(cfg.num_workers)
        .build(dataset);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    let mut saved      = Vec::new();
    let mut final_loss = f64::NAN;

    for epoch in start_epoch..start_epoch + cfg.num_epochs {
        let (next, loss) = train_epoch(model, &mut optim, &loader, &criterion, cfg.learning_rate)?;
        model      = next;
        final_loss = loss;

        scalars.add_scalar(TRAIN_LOSS_TAG, loss, epoch)?;
        scalars.flush()?;

        println!("epoch:{}, loss:{}", epoch + 1, loss * 100.0);
        println!("------------------------------------");

        if should_checkpoint(loss, bench_loss, epoch) {
            bench_loss = loss;
            println!("Saving model...");
            let path = ckpt.save(&model, epoch + 1, loss)?;
            tracing::info!("Checkpoint saved to '{}'", path.display());
            saved.push(epoch + 1);
        }
    }

    println!("Finished Training!");
    Ok(TrainingSummary {
        start_epoch,
        last_epoch: start_epoch + cfg.num_epochs,
        final_loss,
        bench_loss,
        saved,
    })
}

/// Architecture for this run. A resumed run keeps the architecture recorded
/// next to its checkpoint; the corpus feature sizes must still agree with it.
fn resolve_model_config(
    cfg:       &TrainConfig,
    image_dim: usize,
    text_dim:  usize,
) -> Result<FusionConfig> {
    let configured = cfg.fusion_config(image_dim, text_dim);
    if !cfg.is_continue {
        return Ok(configured);
    }
    let Some(saved) = CheckpointManager::model_config_beside(&cfg.continue_on)? else {
        return Ok(configured);
    };

    if (saved.image_dim, saved.text_dim) != (image_dim, text_dim) {
        bail!(
            "Checkpoint '{}' expects features ({}, {}) but the corpus has ({}, {})",
            cfg.continue_on, saved.image_dim, saved.text_dim, image_dim, text_dim
        );
    }
    if (saved.hidden_dim, saved.embedding_dim) != (configured.hidden_dim, configured.embedding_dim) {
        tracing::warn!(
            "Resuming with the checkpoint's hidden_dim={} embedding_dim={} (configured {} / {})",
            saved.hidden_dim, saved.embedding_dim, configured.hidden_dim, configured.embedding_dim
        );
    }
    Ok(saved.with_dropout(cfg.dropout))
}

/// Either resume from `cfg.continue_on` or start fresh.
/// Returns the model, the number of completed epochs, and the benchmark loss.
fn configure_train<B: Backend>(
    cfg:    &TrainConfig,
    model:  FusionModel<B>,
    device: &B::Device,
) -> Result<(FusionModel<B>, usize, f64)> {
    if cfg.is_continue {
        let (model, meta) = CheckpointManager::load(model, &cfg.continue_on, device)?;
        println!("Start training from epoch {}...", meta.epoch + 1);
        Ok((model, meta.epoch, meta.loss))
    } else {
        println!("Start training from scratch...");
        Ok((model, 0, INITIAL_BENCH_LOSS))
    }
}

/// One pass over the loader. Returns the updated model and the mean batch loss.
fn train_epoch<B, O>(
    mut model: FusionModel<B>,
    optim:     &mut O,
    loader:    &Arc<dyn DataLoader<TripletBatch<B>>>,
    criterion: &TripletMarginLoss,
    lr:        f64,
) -> Result<(FusionModel<B>, f64)>
where
    B: AutodiffBackend,
    O: Optimizer<FusionModel<B>, B>,
{
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;

    for batch in loader.iter() {
        let anchor   = model.embed(batch.anchor);
        let positive = model.embed(batch.positive);
        let negative = model.embed(batch.negative);

        let loss = criterion.forward(anchor, positive, negative);
        let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();

        // Backward pass + Adam update
        let grads = loss.backward();
        let grads = GradientsParams::from_grads(grads, &model);
        model = optim.step(lr, model, grads);

        loss_sum += loss_val;
        batches  += 1;
        tracing::debug!("iter {} loss={:.6}", batches, loss_val);
    }

    if batches == 0 {
        bail!("Training dataloader produced no batches");
    }
    Ok((model, loss_sum / batches as f64))
}
