// ============================================================
// Layer 6 - Infrastructure Layer
// ============================================================
// Concrete implementations behind the domain traits, plus file
// output:
//
//   metrics.rs  - CSV training curves and run config json
//   profiler.rs - Profiler that marks the window in the log
//   lms.rs      - MemorySwapper planning swap candidates

/// Training curve CSV logger
pub mod metrics;

/// Log-based profiler
pub mod profiler;

/// Large model support swap planning
pub mod lms;
