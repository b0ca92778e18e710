// ============================================================
// Layer 6 - Metrics Logger
// ============================================================
// Writes training curves to CSV files inside a timestamped run
// directory so several runs can be compared side by side:
//
//   logs/fit/20261015-142301/
//     batch_metrics.csv   epoch,batch,loss
//     epoch_metrics.csv   epoch,mean_loss,batches,seconds
//     run_config.json     the configuration of the run
//
// Epoch numbers in the files are 1-based, batch numbers 0-based,
// matching what the console prints.
//
// Reference: Rust Book §12 (An I/O Project), serde_json docs

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::progress::EpochSummary;

const BATCH_FILE:  &str = "batch_metrics.csv";
const EPOCH_FILE:  &str = "epoch_metrics.csv";
const CONFIG_FILE: &str = "run_config.json";

pub struct MetricsLogger {
    /// `<root>/fit/<run name>/`, created up front with both CSV headers
    run_dir: PathBuf,
}

impl MetricsLogger {
    /// Create `<root>/fit/<YYYYmmdd-HHMMSS>/` and write the CSV headers.
    pub fn create(root: impl AsRef<Path>) -> Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        Self::create_named(root, &stamp)
    }

    /// Same as `create` with an explicit run name.
    pub fn create_named(root: impl AsRef<Path>, run_name: &str) -> Result<Self> {
        let run_dir = root.as_ref().join("fit").join(run_name);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("Cannot create log directory '{}'", run_dir.display()))?;

        let mut f = File::create(run_dir.join(BATCH_FILE))?;
        writeln!(f, "epoch,batch,loss")?;
        let mut f = File::create(run_dir.join(EPOCH_FILE))?;
        writeln!(f, "epoch,mean_loss,batches,seconds")?;

        tracing::info!("Logging training curves to '{}'", run_dir.display());
        Ok(Self { run_dir })
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// `epoch` is 0-based here and stored 1-based.
    pub fn log_batch(&self, epoch: usize, batch: usize, loss: f64) -> Result<()> {
        let mut f = self.append(BATCH_FILE)?;
        writeln!(f, "{},{},{:.6}", epoch + 1, batch, loss)?;
        Ok(())
    }

    pub fn log_epoch(&self, m: &EpochSummary) -> Result<()> {
        let mut f = self.append(EPOCH_FILE)?;
        writeln!(
            f,
            "{},{:.6},{},{:.3}",
            m.epoch + 1,
            m.mean_loss,
            m.batches,
            m.elapsed.as_secs_f64(),
        )?;
        tracing::debug!("Logged epoch {} mean_loss={:.4}", m.epoch + 1, m.mean_loss);
        Ok(())
    }

    pub fn save_config<T: Serialize>(&self, config: &T) -> Result<()> {
        let path = self.run_dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write config to '{}'", path.display()))?;
        Ok(())
    }

    fn append(&self, file: &str) -> Result<File> {
        let path = self.run_dir.join(file);
        OpenOptions::new()
            .append(true)
            .open(&path)
            .with_context(|| format!("Cannot append to '{}'", path.display()))
    }
}
