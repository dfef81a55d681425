// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Orchestrates the other layers for one goal at a time:
// training the fusion model, or scoring a saved checkpoint.
//
// Rules for this layer:
//   - No model math here (that's Layer 5)
//   - No clap types here (that's Layer 1)
//   - Only workflow coordination

// The training workflow and its configuration
pub mod train_use_case;

// The checkpoint evaluation workflow
pub mod evaluate_use_case;
