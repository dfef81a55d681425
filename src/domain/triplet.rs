use serde::{Deserialize, Serialize};

/// Indices into an `EmbeddingCorpus` forming one training example.
///
/// `anchor` and `positive` share a label and are distinct samples;
/// `negative` carries a different label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triplet {
    pub anchor:   usize,
    pub positive: usize,
    pub negative: usize,
}

impl Triplet {
    pub fn new(anchor: usize, positive: usize, negative: usize) -> Self {
        Self { anchor, positive, negative }
    }
}
