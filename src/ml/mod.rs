// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Burn-specific model code lives here.
//
//   model.rs:     The fusion network
//                 • per-modality Linear + ReLU projections
//                 • concatenation of image and text features
//                 • Linear head into the embedding space
//
//   loss.rs:      Triplet margin loss on embedding distances
//
//   trainer.rs:   The training loop
//                 Handles resuming, forward pass on all three
//                 triplet members, loss, backward pass, Adam
//                 step, scalar logging and checkpointing
//
//   evaluator.rs: Loss and triplet accuracy of a checkpoint
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Multimodal fusion embedding network
pub mod model;

/// Triplet margin ranking loss
pub mod loss;

/// Full training loop with checkpointing
pub mod trainer;

/// Checkpoint evaluation on a triplet set
pub mod evaluator;
