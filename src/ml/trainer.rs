// ============================================================
// Layer 5 - Training Loop
// ============================================================
// Epoch/step loop over the synthetic stream with RMSprop, calling
// into the callback list at every boundary:
//
//   on_train_begin
//   for each epoch:  on_epoch_begin
//       for each step:  on_batch_begin → forward/backward/step → on_batch_end
//   on_epoch_end
//   on_train_end
//
// The data source is endless, so the number of batches is decided
// entirely by `FitPlan`.
//
// RMSprop keeps a running mean of squared gradients per weight:
//   v = α*v + (1-α)*g²
//   θ = θ - lr * g / (√v + ε)
//
// Reference: Burn Book §5 (Training), Hinton lecture 6e (RMSprop)

use std::time::Instant;

use anyhow::{Context, Result};
use burn::{
    optim::{GradientsParams, Optimizer, RmsPropConfig},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::callbacks::CallbackList;
use crate::data::{batcher::ImageBatcher, synthetic::SyntheticBatch};
use crate::domain::progress::{EpochSummary, TrainContext};
use crate::ml::model::ResNet;

/// RMSprop defaults as used by Keras
const LEARNING_RATE: f64 = 1e-3;
const RMS_ALPHA:     f32 = 0.9;
const RMS_EPSILON:   f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitPlan {
    /// Number of passes; each one calls on_epoch_begin/on_epoch_end once
    pub epochs:          usize,

    /// Batches drawn from the stream per epoch
    pub steps_per_epoch: usize,

    /// Items per batch. Informational only: the generator was already
    /// built with it, and callbacks see it through TrainContext.
    pub batch_size:      usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    /// One summary per finished epoch, in order
    pub epochs:  Vec<EpochSummary>,

    /// Optimizer steps taken over the whole run
    pub batches: usize,
}

impl FitReport {
    pub fn final_loss(&self) -> Option<f64> {
        self.epochs.last().map(|e| e.mean_loss)
    }
}

pub fn fit<B, I>(
    mut model: ResNet<B>,
    data:      &mut I,
    plan:      &FitPlan,
    callbacks: &mut CallbackList,
    device:    &B::Device,
) -> Result<(ResNet<B>, FitReport)>
where
    B: AutodiffBackend,
    I: Iterator<Item = SyntheticBatch>,
{
    let mut optim = RmsPropConfig::new()
        .with_alpha(RMS_ALPHA)
        .with_epsilon(RMS_EPSILON)
        .init();
    let batcher = ImageBatcher::<B>::new(device.clone());

    let ctx = TrainContext {
        epochs:          plan.epochs,
        steps_per_epoch: plan.steps_per_epoch,
        batch_size:      plan.batch_size,
        layer_names:     model.layer_names(),
    };
    callbacks.on_train_begin(&ctx)?;
    tracing::info!(
        "Training for {} epochs x {} steps (batch size {})",
        plan.epochs, plan.steps_per_epoch, plan.batch_size,
    );

    let mut report = FitReport { epochs: Vec::with_capacity(plan.epochs), batches: 0 };

    for epoch in 0..plan.epochs {
        callbacks.on_epoch_begin(epoch)?;
        let started      = Instant::now();
        let mut loss_sum = 0.0f64;

        for step in 0..plan.steps_per_epoch {
            callbacks.on_batch_begin(epoch, step)?;

            let sample = data
                .next()
                .context("synthetic data stream ended unexpectedly")?;
            let batch = batcher.batch(sample);

            let loss = model.forward_loss(batch.images, batch.targets);
            let loss_val: f64 = loss.clone().into_scalar().elem::<f64>();
            loss_sum += loss_val;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(LEARNING_RATE, model, grads);

            report.batches += 1;
            callbacks.on_batch_end(epoch, step, loss_val)?;
            tracing::debug!("epoch {} step {} loss={:.4}", epoch + 1, step, loss_val);
        }

        let summary = EpochSummary::new(epoch, loss_sum, plan.steps_per_epoch, started.elapsed());
        println!(
            "Epoch {:>3}/{} | loss={:.4} | {:.2}s",
            epoch + 1, plan.epochs, summary.mean_loss, summary.elapsed.as_secs_f64(),
        );
        callbacks.on_epoch_end(&summary)?;
        report.epochs.push(summary);
    }

    callbacks.on_train_end()?;
    tracing::info!("Training complete!");
    Ok((model, report))
}
