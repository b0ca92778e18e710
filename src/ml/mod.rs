// ============================================================
// Layer 5 - ML / Model Layer (Burn)
// ============================================================
// All Burn specific model code lives here.
//
//   model.rs      - Keras-style ResNet-50 (bottleneck blocks)
//   trainer.rs    - fit loop with RMSprop and callback dispatch
//   inferencer.rs - forward-only prediction over generated batches
//   backend.rs    - which Burn backend a run executes on
//
// Reference: He et al. (2015) Deep Residual Learning

/// ResNet-50 architecture
pub mod model;

/// Training loop driving the callback list
pub mod trainer;

/// Inference over synthetic batches
pub mod inferencer;

/// Backend aliases and memory policy
pub mod backend;
