// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing the Enrico corpus
// and the triplets the embedding model is trained on.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Everything in here can be unit tested without a device.

// A UI screen, its label, and its per-modality feature vectors
pub mod ui_sample;

// Anchor / positive / negative index triples
pub mod triplet;

// Core abstractions (traits) that other layers implement
pub mod traits;
