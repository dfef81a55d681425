// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by the application and ML
// layers:
//
//   checkpoint.rs: {parameters, epoch, loss} checkpoints via
//                  Burn's CompactRecorder, plus the run and
//                  architecture configs as JSON so evaluation
//                  can rebuild the model.
//
//   metrics.rs:    Scalar curve logging (loss per epoch) to a
//                  CSV file, behind the ScalarSink trait.
//
// Reference: Burn Book §5 (Checkpointing)

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Scalar training-curve CSV logger
pub mod metrics;
