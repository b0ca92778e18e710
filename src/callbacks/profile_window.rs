// ============================================================
// Profiling Window Callback
// ============================================================
// Switches an external profiler on at the beginning of batch
// `start` and off at the beginning of batch `stop`, both inside a
// single chosen epoch. Batches outside that window run
// unprofiled, so the profile only covers steady-state steps.
//
// The epoch is given 1-based (as on the command line); batches
// are 0-based.

use anyhow::Result;

use crate::domain::traits::{Profiler, TrainingCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowState {
    Waiting,
    Running,
    Done,
}

pub struct ProfileWindow {
    epoch:    usize,
    start:    usize,
    stop:     usize,
    state:    WindowState,
    profiler: Box<dyn Profiler>,
}

impl ProfileWindow {
    /// `epoch` is 1-based; `start` and `stop` are 0-based batch indices.
    pub fn new(epoch: usize, start: usize, stop: usize, profiler: Box<dyn Profiler>) -> Self {
        Self {
            epoch: epoch.saturating_sub(1),
            start,
            stop,
            state: WindowState::Waiting,
            profiler,
        }
    }
}

impl TrainingCallback for ProfileWindow {
    fn name(&self) -> &str {
        "profile_window"
    }

    fn on_batch_begin(&mut self, epoch: usize, batch: usize) -> Result<()> {
        if epoch != self.epoch {
            return Ok(());
        }
        if batch == self.start && self.state == WindowState::Waiting {
            tracing::info!("Starting profiler at epoch {} batch {}", epoch + 1, batch);
            self.profiler.start()?;
            self.state = WindowState::Running;
        }
        if batch == self.stop && self.state == WindowState::Running {
            tracing::info!("Stopping profiler at epoch {} batch {}", epoch + 1, batch);
            self.profiler.stop()?;
            self.state = WindowState::Done;
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    /// Profiler that appends "start"/"stop" to a shared log
    struct Spy(Rc<RefCell<Vec<&'static str>>>);

    impl Profiler for Spy {
        fn start(&mut self) -> Result<()> {
            self.0.borrow_mut().push("start");
            Ok(())
        }
        fn stop(&mut self) -> Result<()> {
            self.0.borrow_mut().push("stop");
            Ok(())
        }
    }

    /// Drive the callback through a full run and collect where each
    /// profiler call happened.
    fn run(
        window: (usize, usize, usize),
        epochs: usize,
        steps:  usize,
    ) -> Vec<(&'static str, usize, usize)> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (epoch, start, stop) = window;
        let mut cb = ProfileWindow::new(epoch, start, stop, Box::new(Spy(log.clone())));

        let mut seen = Vec::new();
        for e in 0..epochs {
            cb.on_epoch_begin(e).unwrap();
            for b in 0..steps {
                let before = log.borrow().len();
                cb.on_batch_begin(e, b).unwrap();
                cb.on_batch_end(e, b, 0.0).unwrap();
                for &event in &log.borrow()[before..] {
                    seen.push((event, e, b));
                }
            }
        }
        seen
    }

    #[test]
    fn test_default_window() {
        // defaults: epoch 1, batches 4..9
        assert_eq!(run((1, 4, 9), 1, 10), vec![("start", 0, 4), ("stop", 0, 9)]);
    }

    #[test]
    fn test_window_in_later_epoch_fires_once() {
        assert_eq!(run((3, 2, 5), 5, 8), vec![("start", 2, 2), ("stop", 2, 5)]);
    }

    #[test]
    fn test_epoch_never_reached() {
        assert!(run((4, 0, 1), 3, 5).is_empty());
    }

    #[test]
    fn test_no_stop_without_start() {
        // start batch is beyond the last step, so stop must not fire either
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut cb = ProfileWindow::new(1, 7, 3, Box::new(Spy(log.clone())));
        for b in 0..5 {
            cb.on_batch_begin(0, b).unwrap();
        }
        assert!(log.borrow().is_empty());
    }
}
