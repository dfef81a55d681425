// ============================================================
// Layer 5 — Embedding Evaluator
// ============================================================
// Measures a trained fusion model on a triplet dataset:
//   - mean triplet margin loss (same criterion as training)
//   - triplet accuracy: fraction of triplets where the anchor
//     is closer to its positive than to its negative
//
// Runs on a plain (non-autodiff) backend, where dropout is a
// no-op; call model.valid() first when holding an autodiff model.

use anyhow::{bail, Result};
use burn::{
    backend::{ndarray::NdArrayDevice, wgpu::WgpuDevice, NdArray, Wgpu},
    data::dataloader::DataLoaderBuilder,
    prelude::*,
};
use std::path::Path;

use crate::application::train_use_case::DeviceKind;
use crate::data::{batcher::TripletBatcher, dataset::TripletDataset};
use crate::infra::checkpoint::{CheckpointManager, CheckpointMeta};
use crate::ml::loss::TripletMarginLoss;
use crate::ml::model::{FusionConfig, FusionModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalReport {
    pub triplets: usize,
    pub loss:     f64,
    pub accuracy: f64,
}

/// Rebuild the model from `model_cfg`, load `checkpoint` into it and
/// evaluate on the chosen device.
pub fn evaluate_checkpoint(
    device_kind: DeviceKind,
    model_cfg:   &FusionConfig,
    checkpoint:  &Path,
    dataset:     TripletDataset,
    batch_size:  usize,
    criterion:   &TripletMarginLoss,
) -> Result<(CheckpointMeta, EvalReport)> {
    match device_kind {
        DeviceKind::Wgpu => {
            load_and_evaluate::<Wgpu>(model_cfg, checkpoint, dataset, batch_size, criterion, WgpuDevice::default())
        }
        DeviceKind::Cpu => {
            load_and_evaluate::<NdArray>(model_cfg, checkpoint, dataset, batch_size, criterion, NdArrayDevice::default())
        }
    }
}

fn load_and_evaluate<B: Backend>(
    model_cfg:  &FusionConfig,
    checkpoint: &Path,
    dataset:    TripletDataset,
    batch_size: usize,
    criterion:  &TripletMarginLoss,
    device:     B::Device,
) -> Result<(CheckpointMeta, EvalReport)> {
    let model: FusionModel<B> = model_cfg.init(&device);
    let (model, meta) = CheckpointManager::load(model, checkpoint, &device)?;
    let report = evaluate(&model, dataset, batch_size, criterion, device)?;
    Ok((meta, report))
}

pub fn evaluate<B: Backend>(
    model:      &FusionModel<B>,
    dataset:    TripletDataset,
    batch_size: usize,
    criterion:  &TripletMarginLoss,
    device:     B::Device,
) -> Result<EvalReport> {
    let batcher = TripletBatcher::<B>::new(device);
    let loader  = DataLoaderBuilder::new(batcher)
        .batch_size(batch_size)
        .num_workers(1)
        .build(dataset);

    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    let mut correct  = 0usize;
    let mut total    = 0usize;

    for batch in loader.iter() {
        total += batch.batch_size();

        let anchor   = model.embed(batch.anchor);
        let positive = model.embed(batch.positive);
        let negative = model.embed(batch.negative);

        let d_ap = criterion.distance(anchor.clone(), positive.clone());
        let d_an = criterion.distance(anchor.clone(), negative.clone());
        let hits: i64 = d_ap.lower(d_an).int().sum().into_scalar().elem::<i64>();
        correct += hits as usize;

        loss_sum += criterion
            .forward(anchor, positive, negative)
            .into_scalar()
            .elem::<f64>();
        batches += 1;
    }

    if batches == 0 {
        bail!("Evaluation dataset is empty");
    }

    Ok(EvalReport {
        triplets: total,
        loss:     loss_sum / batches as f64,
        accuracy: correct as f64 / total as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use crate::domain::{triplet::Triplet, ui_sample::{EmbeddingCorpus, UiSample}};
    use crate::ml::{loss::TripletMarginLossConfig, model::FusionConfig};

    type TestBackend = NdArray;

    #[test]
    fn test_report_counts_all_triplets() {
        let samples = vec![
            UiSample::new("0", "a", vec![1.0, 0.0], vec![1.0]),
            UiSample::new("1", "a", vec![1.0, 0.1], vec![0.9]),
            UiSample::new("2", "b", vec![0.0, 1.0], vec![0.0]),
        ];
        let corpus  = EmbeddingCorpus::new(2, 1, samples).unwrap();
        let dataset = TripletDataset::new(
            corpus,
            vec![Triplet::new(0, 1, 2), Triplet::new(1, 0, 2), Triplet::new(0, 1, 2)],
        );
        let device = Default::default();
        let model: FusionModel<TestBackend> = FusionConfig::new(2, 1)
            .with_hidden_dim(4)
            .with_embedding_dim(3)
            .with_dropout(0.0)
            .init(&device);

        let report = evaluate(
            &model, dataset, 2, &TripletMarginLossConfig::new().init(), device,
        )
        .unwrap();

        assert_eq!(report.triplets, 3);
        assert!(report.loss.is_finite() && report.loss >= 0.0);
        assert!((0.0..=1.0).contains(&report.accuracy));
    }

    #[test]
    fn test_evaluate_saved_checkpoint_on_cpu() {
        let tmp = tempfile::tempdir().unwrap();
        let model_cfg = FusionConfig::new(2, 1).with_hidden_dim(4).with_embedding_dim(3);
        let model: FusionModel<TestBackend> = model_cfg.init(&Default::default());
        let path = CheckpointManager::new(tmp.path()).save(&model, 6, 0.125).unwrap();

        let samples = vec![
            UiSample::new("0", "a", vec![1.0, 0.0], vec![1.0]),
            UiSample::new("1", "a", vec![0.9, 0.0], vec![1.0]),
            UiSample::new("2", "b", vec![0.0, 1.0], vec![0.0]),
        ];
        let dataset = TripletDataset::new(
            EmbeddingCorpus::new(2, 1, samples).unwrap(),
            vec![Triplet::new(0, 1, 2)],
        );

        let (meta, report) = evaluate_checkpoint(
            DeviceKind::Cpu, &model_cfg, &path, dataset, 8, &TripletMarginLossConfig::new().init(),
        )
        .unwrap();
        assert_eq!(meta.epoch, 6);
        assert_eq!(report.triplets, 1);
    }

    #[test]
    fn test_empty_dataset_is_error() {
        let corpus  = EmbeddingCorpus::new(2, 1, Vec::new()).unwrap();
        let dataset = TripletDataset::new(corpus, Vec::new());
        let device  = Default::default();
        let model: FusionModel<TestBackend> = FusionConfig::new(2, 1).init(&device);

        let result = evaluate(&model, dataset, 4, &TripletMarginLossConfig::new().init(), device);
        assert!(result.is_err());
    }
}
