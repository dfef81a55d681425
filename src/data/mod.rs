// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from the embedded corpus file to tensor batches:
//
//   <corpus_dir>/<source_data>.json
//       │
//       ▼
//   JsonCorpusLoader  → reads and validates the EmbeddingCorpus
//       │
//       ▼
//   TripletMiner      → samples (anchor, positive, negative) indices
//       │
//       ▼
//   TripletDataset    → implements Burn's Dataset trait
//       │
//       ▼
//   TripletBatcher    → stacks items into [batch, dim] tensors
//       │
//       ▼
//   DataLoader        → feeds batches to the training loop
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Loads the embedded Enrico corpus from JSON
pub mod loader;

/// Seeded label-aware triplet sampling
pub mod triplets;

/// Implements Burn's Dataset trait for triplets
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;
