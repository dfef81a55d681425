// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads a pre-embedded Enrico corpus from a JSON file.
//
// File layout (`<corpus_dir>/<source_data>`):
//   {
//     "image_dim": 4,
//     "text_dim":  3,
//     "samples": [
//       { "id": "10023", "label": "login",
//         "image": [0.1, 0.2, 0.3, 0.4], "text": [0.5, 0.6, 0.7] },
//       ...
//     ]
//   }
//
// The feature vectors are produced upstream (screenshot encoder
// and sentence encoder); this loader only checks their shape.

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::traits::CorpusSource;
use crate::domain::ui_sample::EmbeddingCorpus;

/// Reads an `EmbeddingCorpus` from `<corpus_dir>/<source_data>`.
pub struct JsonCorpusLoader {
    path: PathBuf,
}

impl JsonCorpusLoader {
    pub fn new(corpus_dir: impl Into<PathBuf>, source_data: &str) -> Self {
        Self { path: corpus_dir.into().join(source_data) }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl CorpusSource for JsonCorpusLoader {
    fn load(&self) -> Result<EmbeddingCorpus> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read corpus '{}'", self.path.display()))?;

        let corpus: EmbeddingCorpus = serde_json::from_str(&json)
            .with_context(|| format!("Corpus '{}' is not valid JSON", self.path.display()))?;

        corpus
            .validate()
            .with_context(|| format!("Corpus '{}' failed validation", self.path.display()))?;

        tracing::info!(
            "Loaded {} samples from '{}' (image_dim={}, text_dim={})",
            corpus.len(),
            self.path.display(),
            corpus.image_dim,
            corpus.text_dim,
        );
        Ok(corpus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loads_valid_corpus() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "image_dim": 2,
            "text_dim": 1,
            "samples": [
                {"id": "1", "label": "login", "image": [0.1, 0.2], "text": [0.3]},
                {"id": "2", "label": "list",  "image": [0.4, 0.5], "text": [0.6]}
            ]
        }"#;
        fs::write(dir.path().join("corpus.json"), json).unwrap();

        let corpus = JsonCorpusLoader::new(dir.path(), "corpus.json").load().unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.samples[1].label, "list");
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = JsonCorpusLoader::new(dir.path(), "nope.json").load().unwrap_err();
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_wrong_dimensions_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{
            "image_dim": 2,
            "text_dim": 1,
            "samples": [{"id": "x", "label": "login", "image": [0.1], "text": [0.3]}]
        }"#;
        fs::write(dir.path().join("corpus.json"), json).unwrap();
        assert!(JsonCorpusLoader::new(dir.path(), "corpus.json").load().is_err());
    }
}
