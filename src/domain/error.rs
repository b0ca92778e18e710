// ============================================================
// Layer 3 - Configuration Errors
// ============================================================
// Every check on user supplied numbers happens before any model
// or backend resource is created. Failing checks produce one of
// these variants so callers (and tests) can match on the cause
// while anyhow carries it up to `main` unchanged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("image size must be at least {min} pixels per side, got {size}")]
    ImageTooSmall { size: usize, min: usize },

    #[error("{items} images of shape {shape:?} do not fit in memory")]
    ImageTooLarge { shape: [usize; 3], items: usize },

    #[error("number of classes must be positive")]
    NoClasses,

    #[error("{name} must be positive")]
    NotPositive { name: &'static str },

    #[error("image shape {shape:?} has a zero-sized dimension")]
    EmptyShape { shape: [usize; 3] },

    #[error("LMS swap count must be -1 (all tensors) or positive, got {0}")]
    SwapCount(i64),

    #[error("invalid profiling window: {0}")]
    ProfileWindow(String),
}
