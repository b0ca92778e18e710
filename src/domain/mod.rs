// ============================================================
// Layer 3 - Domain Layer
// ============================================================
// Plain Rust types and traits shared by every other layer.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// The traits here are the extension points of a training run:
// callbacks observe the loop, a Profiler is toggled by the
// profiling window, and a MemorySwapper receives the large
// model support tunables. Concrete implementations live in
// `callbacks` and `infra`.

/// Typed validation errors for run and generator configuration
pub mod error;

/// Values handed to callbacks while the loop runs
pub mod progress;

/// Extension-point traits implemented by callbacks and infra
pub mod traits;
