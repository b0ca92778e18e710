// ============================================================
// Layer 2 - Application / Use Cases
// ============================================================
// Workflow coordination only: no model math, no printing, no
// file formats. The use case tells the other layers what to do
// in which order.

/// Validate, build, then train or infer
pub mod run_use_case;
