// ============================================================
// Layer 5 - Inferencer
// ============================================================
// Forward-only pass over a fixed number of generated batches.
// No optimizer, no callbacks, no autodiff graph.

use anyhow::{Context, Result};
use burn::prelude::*;

use crate::data::{
    batcher::ImageBatcher,
    synthetic::{argmax_rows, SyntheticBatch},
};
use crate::ml::model::ResNet;

/// Softmax outputs for every predicted item
#[derive(Debug, Clone, PartialEq)]
pub struct Predictions {
    pub num_classes:   usize,
    /// `rows * num_classes` probabilities
    pub probabilities: Vec<f32>,
    /// Most likely class per row
    pub classes:       Vec<usize>,
}

impl Predictions {
    pub fn rows(&self) -> usize {
        self.classes.len()
    }
}

pub fn predict<B, I>(
    model:  &ResNet<B>,
    data:   &mut I,
    steps:  usize,
    device: &B::Device,
) -> Result<Predictions>
where
    B: Backend,
    I: Iterator<Item = SyntheticBatch>,
{
    let batcher = ImageBatcher::<B>::new(device.clone());
    let mut probabilities = Vec::new();
    let mut num_classes   = 0;

    for step in 0..steps {
        let sample = data
            .next()
            .context("synthetic data stream ended unexpectedly")?;
        let batch = batcher.batch(sample);

        let probs = model.forward_probabilities(batch.images);
        num_classes = probs.dims()[1];
        let values: Vec<f32> = probs
            .into_data()
            .to_vec()
            .map_err(|e| anyhow::anyhow!("cannot read predictions: {e:?}"))?;
        tracing::debug!("Inference step {} produced {} values", step, values.len());
        probabilities.extend(values);
    }

    let classes = argmax_rows(&probabilities, num_classes);
    tracing::info!("Predicted {} images", classes.len());
    Ok(Predictions { num_classes, probabilities, classes })
}
