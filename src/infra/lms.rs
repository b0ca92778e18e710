// ============================================================
// Layer 6 - Checkpoint Swapper
// ============================================================
// The MemorySwapper used for real runs. Device memory relief
// comes from the autodiff checkpointing backend picked in
// `ml::backend`, which releases activations after the forward
// pass and rebuilds them for backward. This swapper decides which
// layers are swap candidates from the LMS tunables and records
// that plan so it can be inspected and logged.
//
//   starting_op_names → first known hint marks where candidates begin
//   n_tensors         → how many candidates are taken (-1 = all)
//   lb                → lowerbound, carried in the plan as given

use anyhow::{bail, Result};

use crate::domain::traits::{LmsConfig, MemorySwapper};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapPlan {
    /// First layer that matched a starting hint, e.g. "conv1_bn"
    pub start_layer: String,

    /// Layers whose activations are released after the forward pass,
    /// in forward order starting at `start_layer`
    pub swapped:     Vec<String>,

    /// Lowerbound copied from the tunables: how many layers ahead of
    /// backward a tensor is brought back
    pub lb:          usize,
}

#[derive(Debug, Default)]
pub struct CheckpointSwapper {
    plan: Option<SwapPlan>,
}

impl CheckpointSwapper {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn plan(&self) -> Option<&SwapPlan> {
        self.plan.as_ref()
    }
}

impl MemorySwapper for CheckpointSwapper {
    fn install(&mut self, config: &LmsConfig, layer_names: &[String]) -> Result<()> {
        let found = config
            .starting_op_names
            .iter()
            .find_map(|hint| layer_names.iter().position(|l| l == hint));
        let Some(start) = found else {
            bail!(
                "none of the LMS starting layers {:?} exist in the model",
                config.starting_op_names
            );
        };

        let candidates = &layer_names[start..];
        let take = match usize::try_from(config.n_tensors) {
            Ok(n) => n.min(candidates.len()),
            Err(_) => candidates.len(),
        };

        let plan = SwapPlan {
            start_layer: layer_names[start].clone(),
            swapped:     candidates[..take].to_vec(),
            lb:          config.lb,
        };
        tracing::info!(
            "LMS plan: {} of {} layers swappable from '{}' (lb={})",
            plan.swapped.len(),
            layer_names.len(),
            plan.start_layer,
            plan.lb,
        );
        self.plan = Some(plan);
        Ok(())
    }
}
