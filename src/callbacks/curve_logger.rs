// ============================================================
// Training Curve Logger
// ============================================================
// Records every batch loss and every epoch summary through a
// MetricsLogger so the run can be plotted afterwards.

use anyhow::Result;

use crate::domain::{progress::EpochSummary, traits::TrainingCallback};
use crate::infra::metrics::MetricsLogger;

pub struct CurveLogger {
    logger: MetricsLogger,
}

impl CurveLogger {
    pub fn new(logger: MetricsLogger) -> Self {
        Self { logger }
    }
}

impl TrainingCallback for CurveLogger {
    fn name(&self) -> &str {
        "curve_logger"
    }

    fn on_batch_end(&mut self, epoch: usize, batch: usize, loss: f64) -> Result<()> {
        self.logger.log_batch(epoch, batch, loss)
    }

    fn on_epoch_end(&mut self, summary: &EpochSummary) -> Result<()> {
        self.logger.log_epoch(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, time::Duration};

    use super::*;

    #[test]
    fn test_logs_batches_and_epochs() {
        let tmp = tempfile::tempdir().unwrap();
        let run_dir = {
            let logger = MetricsLogger::create_named(tmp.path(), "curve").unwrap();
            let dir    = logger.run_dir().to_path_buf();
            let mut cb = CurveLogger::new(logger);
            for b in 0..3 {
                cb.on_batch_end(0, b, 1.0 + b as f64).unwrap();
            }
            cb.on_epoch_end(&EpochSummary::new(0, 6.0, 3, Duration::ZERO)).unwrap();
            dir
        };

        let batches = fs::read_to_string(run_dir.join("batch_metrics.csv")).unwrap();
        assert_eq!(batches.lines().count(), 4);
        let epochs = fs::read_to_string(run_dir.join("epoch_metrics.csv")).unwrap();
        assert!(epochs.lines().nth(1).unwrap().starts_with("1,2.000000,3,"));
    }
}
