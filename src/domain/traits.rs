// ============================================================
// Layer 3 - Core Traits (Extension Points)
// ============================================================
// A training run is a fixed loop. Everything optional about it
// (curve logging, profiling, memory swapping) plugs in through
// the traits below, so the loop in `ml::trainer` never needs to
// know which extras are switched on.
//
//   TrainingCallback  <- CurveLogger, ProfileWindow, LmsCallback
//   Profiler          <- TracingProfiler
//   MemorySwapper     <- CheckpointSwapper

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::progress::{EpochSummary, TrainContext};

// ─── TrainingCallback ────────────────────────────────────────────────────────
/// Hooks invoked by the fit loop. Epoch and batch indices are 0-based.
///
/// Every hook has a no-op default so implementations only override
/// the events they care about. Returning an error aborts the run.
pub trait TrainingCallback {
    /// Short name used in log lines
    fn name(&self) -> &str;

    fn on_train_begin(&mut self, _ctx: &TrainContext) -> Result<()> {
        Ok(())
    }

    fn on_epoch_begin(&mut self, _epoch: usize) -> Result<()> {
        Ok(())
    }

    fn on_batch_begin(&mut self, _epoch: usize, _batch: usize) -> Result<()> {
        Ok(())
    }

    fn on_batch_end(&mut self, _epoch: usize, _batch: usize, _loss: f64) -> Result<()> {
        Ok(())
    }

    fn on_epoch_end(&mut self, _summary: &EpochSummary) -> Result<()> {
        Ok(())
    }

    fn on_train_end(&mut self) -> Result<()> {
        Ok(())
    }
}

// ─── Profiler ────────────────────────────────────────────────────────────────
/// A low-level profiler that can be switched on and off around a
/// range of batches.
pub trait Profiler {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

// ─── MemorySwapper ───────────────────────────────────────────────────────────
/// Tunables for large model support.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LmsConfig {
    /// How many tensors to swap; -1 swaps all candidates
    pub n_tensors: i64,

    /// A tensor is swapped back in at least `lb` layers before it is
    /// needed in the backward phase
    pub lb: usize,

    /// Layers from which swap candidate analysis starts. Naming a
    /// known layer from a previous run shortens the analysis.
    pub starting_op_names: Vec<String>,
}

/// The component that actually moves tensors between device and host.
pub trait MemorySwapper {
    /// Activate swapping for a model whose layers, in forward order,
    /// are `layer_names`.
    fn install(&mut self, config: &LmsConfig, layer_names: &[String]) -> Result<()>;
}
