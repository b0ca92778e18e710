// ============================================================
// Layer 6 - Tracing Profiler
// ============================================================
// Marks the profiling window in the log stream and reports how
// long it lasted. An external sampling profiler attached to the
// process can be lined up against these events by timestamp.

use std::time::Instant;

use anyhow::{bail, Result};

use crate::domain::traits::Profiler;

#[derive(Debug, Default)]
pub struct TracingProfiler {
    started: Option<Instant>,
}

impl TracingProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }
}

impl Profiler for TracingProfiler {
    fn start(&mut self) -> Result<()> {
        if self.is_running() {
            bail!("profiler is already running");
        }
        tracing::info!("Profile window open");
        self.started = Some(Instant::now());
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let Some(started) = self.started.take() else {
            bail!("profiler was never started");
        };
        let elapsed = started.elapsed();
        tracing::info!("Profile window closed after {:.3}s", elapsed.as_secs_f64());
        Ok(())
    }
}
