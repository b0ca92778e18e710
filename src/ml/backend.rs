// ============================================================
// Layer 5 - Backend Policy
// ============================================================
// Chooses the Burn backends a run executes on.
//
//   Inference                      → Wgpu (inner backend of either)
//   Training, memory policy Off    → Autodiff<Wgpu>
//   Training, SchedulingHeuristics → Autodiff<Wgpu, BalancedCheckpointing>
//
// With balanced checkpointing the autodiff graph drops cheap
// intermediate activations after the forward pass and recomputes
// them during backward, trading compute for device memory.

use burn::backend::{
    autodiff::checkpoint::strategy::{BalancedCheckpointing, NoCheckpointing},
    wgpu::WgpuDevice,
    Autodiff, Wgpu,
};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type TrainBackend      = Autodiff<Wgpu, NoCheckpointing>;
pub type CheckpointBackend = Autodiff<Wgpu, BalancedCheckpointing>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MemoryOptimization {
    /// Keep every activation on the device until backward
    Off,
    /// Recompute activations during backward where cheap
    #[default]
    SchedulingHeuristics,
}

pub fn default_device() -> WgpuDevice {
    WgpuDevice::default()
}
