use std::time::Duration;

/// What a callback learns about the run before the first batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainContext {
    pub epochs:          usize,
    pub steps_per_epoch: usize,
    pub batch_size:      usize,
    /// Layer names of the model in forward order
    pub layer_names:     Vec<String>,
}

/// Aggregated result of one epoch. `epoch` is 0-based.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    pub epoch:     usize,
    pub mean_loss: f64,
    pub batches:   usize,
    pub elapsed:   Duration,
}

impl EpochSummary {
    pub fn new(epoch: usize, loss_sum: f64, batches: usize, elapsed: Duration) -> Self {
        let mean_loss = if batches > 0 { loss_sum / batches as f64 } else { f64::NAN };
        Self { epoch, mean_loss, batches, elapsed }
    }
}
