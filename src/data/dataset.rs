use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::triplet::Triplet;
use crate::domain::ui_sample::{EmbeddingCorpus, UiSample};

/// The two modality vectors of one screen, ready for batching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePair {
    pub image: Vec<f32>,
    pub text:  Vec<f32>,
}

impl From<&UiSample> for FeaturePair {
    fn from(s: &UiSample) -> Self {
        Self { image: s.image.clone(), text: s.text.clone() }
    }
}

/// One materialised triplet: what the batcher receives per index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripletItem {
    pub anchor:   FeaturePair,
    pub positive: FeaturePair,
    pub negative: FeaturePair,
}

/// Triplets over a corpus. Feature vectors are copied out lazily in `get`
/// so the corpus is stored once regardless of how many triplets reference it.
pub struct TripletDataset {
    corpus:   EmbeddingCorpus,
    triplets: Vec<Triplet>,
}

impl TripletDataset {
    pub fn new(corpus: EmbeddingCorpus, triplets: Vec<Triplet>) -> Self {
        Self { corpus, triplets }
    }

    pub fn image_dim(&self) -> usize { self.corpus.image_dim }

    pub fn text_dim(&self) -> usize { self.corpus.text_dim }

    pub fn triplet_count(&self) -> usize { self.triplets.len() }
}

impl Dataset<TripletItem> for TripletDataset {
    fn get(&self, index: usize) -> Option<TripletItem> {
        let t = self.triplets.get(index)?;
        let samples = &self.corpus.samples;
        Some(TripletItem {
            anchor:   FeaturePair::from(samples.get(t.anchor)?),
            positive: FeaturePair::from(samples.get(t.positive)?),
            negative: FeaturePair::from(samples.get(t.negative)?),
        })
    }

    fn len(&self) -> usize {
        self.triplets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_materialises_features() {
        let corpus = EmbeddingCorpus::new(
            1, 1,
            vec![
                UiSample::new("a", "x", vec![1.0], vec![10.0]),
                UiSample::new("b", "x", vec![2.0], vec![20.0]),
                UiSample::new("c", "y", vec![3.0], vec![30.0]),
            ],
        )
        .unwrap();
        let ds = TripletDataset::new(corpus, vec![Triplet::new(0, 1, 2)]);

        assert_eq!(ds.len(), 1);
        let item = ds.get(0).unwrap();
        assert_eq!(item.anchor.image, vec![1.0]);
        assert_eq!(item.positive.text, vec![20.0]);
        assert_eq!(item.negative.image, vec![3.0]);
        assert!(ds.get(1).is_none());
    }
}
