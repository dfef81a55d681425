// ============================================================
// Layer 4 — Triplet Miner
// ============================================================
// Turns a labelled corpus into (anchor, positive, negative)
// index triples:
//   positive: another screen with the anchor's label
//   negative: any screen with a different label
//
// Sampling is uniform and seeded, so the same seed always
// yields the same triplets for the same corpus.

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::collections::BTreeMap;

use crate::domain::triplet::Triplet;
use crate::domain::ui_sample::EmbeddingCorpus;

pub struct TripletMiner {
    rng: StdRng,
}

impl TripletMiner {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Draw `per_anchor` triplets for every sample that has both a
    /// same-label partner and at least one differently labelled sample.
    pub fn mine(&mut self, corpus: &EmbeddingCorpus, per_anchor: usize) -> Vec<Triplet> {
        let groups = corpus.indices_by_label();
        if groups.len() < 2 {
            tracing::warn!(
                "Corpus has {} label(s); at least 2 are needed to form triplets",
                groups.len()
            );
            return Vec::new();
        }

        // Samples outside each label, computed once per label.
        let outside: BTreeMap<&str, Vec<usize>> = groups
            .keys()
            .map(|&label| {
                let others: Vec<usize> = corpus
                    .samples
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.label != label)
                    .map(|(i, _)| i)
                    .collect();
                (label, others)
            })
            .collect();

        let mut triplets = Vec::with_capacity(corpus.len() * per_anchor);
        let mut skipped  = 0usize;

        for (anchor, sample) in corpus.samples.iter().enumerate() {
            let label = sample.label.as_str();
            let partners: Vec<usize> = groups[label]
                .iter()
                .copied()
                .filter(|&i| i != anchor)
                .collect();
            let negatives = &outside[label];

            for _ in 0..per_anchor {
                match (partners.choose(&mut self.rng), negatives.choose(&mut self.rng)) {
                    (Some(&positive), Some(&negative)) => {
                        triplets.push(Triplet::new(anchor, positive, negative));
                    }
                    _ => {
                        skipped += 1;
                        break;
                    }
                }
            }
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} anchors without a same-label partner", skipped);
        }
        tracing::info!("Mined {} triplets from {} samples", triplets.len(), corpus.len());
        triplets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ui_sample::UiSample;

    fn corpus(labels: &[&str]) -> EmbeddingCorpus {
        let samples = labels
            .iter()
            .enumerate()
            .map(|(i, l)| UiSample::new(i.to_string(), *l, vec![i as f32], vec![0.0]))
            .collect();
        EmbeddingCorpus::new(1, 1, samples).unwrap()
    }

    #[test]
    fn test_triplets_respect_labels() {
        let c = corpus(&["login", "login", "list", "list", "map"]);
        let triplets = TripletMiner::new(7).mine(&c, 3);

        // "map" has no partner, so only 4 anchors contribute
        assert_eq!(triplets.len(), 4 * 3);
        for t in &triplets {
            let a = &c.samples[t.anchor];
            assert_ne!(t.anchor, t.positive);
            assert_eq!(a.label, c.samples[t.positive].label);
            assert_ne!(a.label, c.samples[t.negative].label);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let c = corpus(&["a", "a", "a", "b", "b", "c"]);
        let first  = TripletMiner::new(42).mine(&c, 2);
        let second = TripletMiner::new(42).mine(&c, 2);
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_label_yields_nothing() {
        let c = corpus(&["login", "login", "login"]);
        assert!(TripletMiner::new(1).mine(&c, 1).is_empty());
    }

    #[test]
    fn test_empty_corpus() {
        let c = corpus(&[]);
        assert!(TripletMiner::new(1).mine(&c, 1).is_empty());
    }
}
