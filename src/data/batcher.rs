// ============================================================
// Layer 4 — Triplet Batcher
// ============================================================
// Implements Burn's Batcher trait to turn a Vec<TripletItem>
// into three FusionInput batches (anchor, positive, negative).
//
// Each modality is flattened row-major into a [N, D] tensor:
//   [s1_f1, s1_f2, ..., s1_fD, s2_f1, ..., sN_fD] → [N, D]
//
// All samples in a corpus share image_dim / text_dim (checked
// when the corpus is loaded), so no padding is needed here.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
    tensor::TensorData,
};

use crate::data::dataset::{FeaturePair, TripletItem};

// ─── FusionInput ──────────────────────────────────────────────────────────────
/// One side of a triplet batch: both modalities for N screens.
#[derive(Debug, Clone)]
pub struct FusionInput<B: Backend> {
    /// Screenshot features, shape [batch_size, image_dim]
    pub image: Tensor<B, 2>,

    /// Text features, shape [batch_size, text_dim]
    pub text: Tensor<B, 2>,
}

// ─── TripletBatch ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct TripletBatch<B: Backend> {
    pub anchor:   FusionInput<B>,
    pub positive: FusionInput<B>,
    pub negative: FusionInput<B>,
}

impl<B: Backend> TripletBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.anchor.image.dims()[0]
    }
}

// ─── TripletBatcher ───────────────────────────────────────────────────────────
/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct TripletBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> TripletBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Stack one side (anchor, positive or negative) of every item.
    pub fn stack<'a>(
        &self,
        pairs: impl Iterator<Item = &'a FeaturePair> + Clone,
    ) -> FusionInput<B> {
        let rows      = pairs.clone().count();
        let image_dim = pairs.clone().next().map_or(0, |p| p.image.len());
        let text_dim  = pairs.clone().next().map_or(0, |p| p.text.len());

        let image_flat: Vec<f32> = pairs.clone().flat_map(|p| p.image.iter().copied()).collect();
        let text_flat:  Vec<f32> = pairs.flat_map(|p| p.text.iter().copied()).collect();

        let image = Tensor::<B, 2>::from_data(
            TensorData::new(image_flat, [rows, image_dim]), &self.device,
        );
        let text = Tensor::<B, 2>::from_data(
            TensorData::new(text_flat, [rows, text_dim]), &self.device,
        );

        FusionInput { image, text }
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
impl<B: Backend> Batcher<TripletItem, TripletBatch<B>> for TripletBatcher<B> {
    fn batch(&self, items: Vec<TripletItem>) -> TripletBatch<B> {
        TripletBatch {
            anchor:   self.stack(items.iter().map(|i| &i.anchor)),
            positive: self.stack(items.iter().map(|i| &i.positive)),
            negative: self.stack(items.iter().map(|i| &i.negative)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn pair(image: [f32; 2], text: [f32; 3]) -> FeaturePair {
        FeaturePair { image: image.to_vec(), text: text.to_vec() }
    }

    #[test]
    fn test_batch_shapes() {
        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        let item = TripletItem {
            anchor:   pair([1.0, 2.0], [0.1, 0.2, 0.3]),
            positive: pair([3.0, 4.0], [0.4, 0.5, 0.6]),
            negative: pair([5.0, 6.0], [0.7, 0.8, 0.9]),
        };
        let batch = batcher.batch(vec![item.clone(), item]);

        assert_eq!(batch.batch_size(), 2);
        assert_eq!(batch.anchor.image.dims(), [2, 2]);
        assert_eq!(batch.negative.text.dims(), [2, 3]);
    }

    #[test]
    fn test_rows_keep_order() {
        let batcher = TripletBatcher::<TestBackend>::new(Default::default());
        let items = vec![
            TripletItem {
                anchor:   pair([1.0, 2.0], [0.0, 0.0, 0.0]),
                positive: pair([0.0, 0.0], [0.0, 0.0, 0.0]),
                negative: pair([0.0, 0.0], [0.0, 0.0, 0.0]),
            },
            TripletItem {
                anchor:   pair([3.0, 4.0], [0.0, 0.0, 0.0]),
                positive: pair([0.0, 0.0], [0.0, 0.0, 0.0]),
                negative: pair([0.0, 0.0], [0.0, 0.0, 0.0]),
            },
        ];
        let batch = batcher.batch(items);
        let values: Vec<f32> = batch.anchor.image.into_data().to_vec().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
