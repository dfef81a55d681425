// ============================================================
// Layer 3 — UI Sample Domain Types
// ============================================================
// One Enrico screen is described by two modalities:
//   - image: a feature vector extracted from the screenshot
//   - text:  a feature vector extracted from the screen's text
//
// The `label` is the Enrico design topic (e.g. "login", "list").
// Screens sharing a label are treated as similar when mining
// triplets; screens with different labels as dissimilar.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single UI screen with its two modality feature vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiSample {
    /// Screen identifier (Enrico screen id or file stem)
    pub id: String,

    /// Design topic class of the screen
    pub label: String,

    /// Screenshot feature vector, length = corpus image_dim
    pub image: Vec<f32>,

    /// Text feature vector, length = corpus text_dim
    pub text: Vec<f32>,
}

impl UiSample {
    pub fn new(
        id:    impl Into<String>,
        label: impl Into<String>,
        image: Vec<f32>,
        text:  Vec<f32>,
    ) -> Self {
        Self { id: id.into(), label: label.into(), image, text }
    }
}

/// The full set of embedded screens loaded from one source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingCorpus {
    pub image_dim: usize,
    pub text_dim:  usize,
    pub samples:   Vec<UiSample>,
}

impl EmbeddingCorpus {
    /// Build a corpus and check every sample against the declared dimensions.
    pub fn new(image_dim: usize, text_dim: usize, samples: Vec<UiSample>) -> Result<Self> {
        let corpus = Self { image_dim, text_dim, samples };
        corpus.validate()?;
        Ok(corpus)
    }

    /// Every sample must match `image_dim` / `text_dim` exactly.
    pub fn validate(&self) -> Result<()> {
        if self.image_dim == 0 || self.text_dim == 0 {
            bail!(
                "Corpus dimensions must be non-zero (image_dim={}, text_dim={})",
                self.image_dim,
                self.text_dim
            );
        }
        for s in &self.samples {
            if s.image.len() != self.image_dim {
                bail!(
                    "Sample '{}' has image features of length {} (expected {})",
                    s.id, s.image.len(), self.image_dim
                );
            }
            if s.text.len() != self.text_dim {
                bail!(
                    "Sample '{}' has text features of length {} (expected {})",
                    s.id, s.text.len(), self.text_dim
                );
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample indices grouped by label. BTreeMap keeps iteration
    /// order stable so seeded mining is reproducible.
    pub fn indices_by_label(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (i, s) in self.samples.iter().enumerate() {
            groups.entry(s.label.as_str()).or_default().push(i);
        }
        groups
    }
}
