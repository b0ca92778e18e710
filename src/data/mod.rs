// ============================================================
// Layer 4 - Data Pipeline
// ============================================================
// Everything between "pick some random numbers" and a tensor
// batch on the device:
//
//   SyntheticImages   → endless (images, labels, one-hot) batches
//       │
//       ▼
//   ImageBatcher      → device tensors [N, C, H, W] and [N, K]
//       │
//       ▼
//   fit / predict loop in `ml`

/// Seeded synthetic image and label generator
pub mod synthetic;

/// Converts generated batches into Burn tensors
pub mod batcher;
