// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The application and ML layers program against these traits
// rather than concrete file formats or log sinks:
//   - JsonCorpusLoader implements CorpusSource
//   - ScalarLogger     implements ScalarSink
//
// A test can hand the trainer an in-memory sink instead of a
// CSV file without touching the training loop.

use anyhow::Result;
use crate::domain::ui_sample::EmbeddingCorpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce an embedded UI corpus.
pub trait CorpusSource {
    fn load(&self) -> Result<EmbeddingCorpus>;
}

// ─── ScalarSink ───────────────────────────────────────────────────────────────
/// Receives scalar training curves, keyed by tag and step.
pub trait ScalarSink {
    /// Record `value` under `tag` at training step `step`.
    fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()>;

    /// Persist everything recorded so far.
    fn flush(&mut self) -> Result<()>;
}
