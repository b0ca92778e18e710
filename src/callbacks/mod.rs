// ============================================================
// Training Callbacks
// ============================================================
// The optional extras of a training run, each an independent
// TrainingCallback that can be combined with the others:
//
//   curve_logger.rs   - per-batch / per-epoch loss curves on disk
//   profile_window.rs - toggles a profiler around a batch range
//   lms.rs            - hands large model support tunables to a swapper
//
// CallbackList is what the fit loop talks to. It forwards each
// hook to every callback in the order they were added.

use anyhow::{Context, Result};

use crate::domain::{
    progress::{EpochSummary, TrainContext},
    traits::TrainingCallback,
};

pub mod curve_logger;
pub mod lms;
pub mod profile_window;

#[derive(Default)]
pub struct CallbackList {
    callbacks: Vec<Box<dyn TrainingCallback>>,
}

impl CallbackList {
    pub fn push(&mut self, callback: impl TrainingCallback + 'static) {
        tracing::debug!("Registered callback '{}'", callback.name());
        self.callbacks.push(Box::new(callback));
    }

    pub fn names(&self) -> Vec<&str> {
        self.callbacks.iter().map(|c| c.name()).collect()
    }

    /// Run `hook` on every callback, stopping at the first error.
    fn each(
        &mut self,
        hook: &str,
        mut f: impl FnMut(&mut dyn TrainingCallback) -> Result<()>,
    ) -> Result<()> {
        for cb in self.callbacks.iter_mut() {
            let name = cb.name().to_string();
            f(cb.as_mut()).with_context(|| format!("callback '{name}' failed in {hook}"))?;
        }
        Ok(())
    }

    pub fn on_train_begin(&mut self, ctx: &TrainContext) -> Result<()> {
        self.each("on_train_begin", |cb| cb.on_train_begin(ctx))
    }

    pub fn on_epoch_begin(&mut self, epoch: usize) -> Result<()> {
        self.each("on_epoch_begin", |cb| cb.on_epoch_begin(epoch))
    }

    pub fn on_batch_begin(&mut self, epoch: usize, batch: usize) -> Result<()> {
        self.each("on_batch_begin", |cb| cb.on_batch_begin(epoch, batch))
    }

    pub fn on_batch_end(&mut self, epoch: usize, batch: usize, loss: f64) -> Result<()> {
        self.each("on_batch_end", |cb| cb.on_batch_end(epoch, batch, loss))
    }

    pub fn on_epoch_end(&mut self, summary: &EpochSummary) -> Result<()> {
        self.each("on_epoch_end", |cb| cb.on_epoch_end(summary))
    }

    pub fn on_train_end(&mut self) -> Result<()> {
        self.each("on_train_end", |cb| cb.on_train_end())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    struct Tagged {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        fail_on_epoch: Option<usize>,
    }

    impl TrainingCallback for Tagged {
        fn name(&self) -> &str {
            self.tag
        }

        fn on_epoch_begin(&mut self, epoch: usize) -> Result<()> {
            if self.fail_on_epoch == Some(epoch) {
                anyhow::bail!("boom");
            }
            self.log.borrow_mut().push(format!("{}:{}", self.tag, epoch));
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_in_insertion_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CallbackList::default();
        list.push(Tagged { tag: "a", log: log.clone(), fail_on_epoch: None });
        list.push(Tagged { tag: "b", log: log.clone(), fail_on_epoch: None });

        list.on_epoch_begin(0).unwrap();
        list.on_epoch_begin(1).unwrap();

        assert_eq!(list.names(), vec!["a", "b"]);
        assert_eq!(*log.borrow(), vec!["a:0", "b:0", "a:1", "b:1"]);
    }

    #[test]
    fn test_first_error_stops_dispatch() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CallbackList::default();
        list.push(Tagged { tag: "a", log: log.clone(), fail_on_epoch: Some(0) });
        list.push(Tagged { tag: "b", log: log.clone(), fail_on_epoch: None });

        let err = list.on_epoch_begin(0).unwrap_err();
        assert!(format!("{err:#}").contains("callback 'a' failed in on_epoch_begin"));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_default_hooks_are_noops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut list = CallbackList::default();
        list.push(Tagged { tag: "a", log: log.clone(), fail_on_epoch: None });

        list.on_batch_begin(0, 0).unwrap();
        list.on_batch_end(0, 0, 1.0).unwrap();
        list.on_train_end().unwrap();
        assert!(log.borrow().is_empty());
    }
}
