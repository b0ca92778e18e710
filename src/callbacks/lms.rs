// ============================================================
// Large Model Support Callback
// ============================================================
// Large model support (LMS) moves intermediate tensors between
// device and host memory so inputs larger than device memory
// allows can still be trained. This callback does not swap
// anything itself: at the start of training it hands the user's
// tunables and the model's layer list to a MemorySwapper.

use anyhow::Result;

use crate::domain::{
    progress::TrainContext,
    traits::{LmsConfig, MemorySwapper, TrainingCallback},
};

/// Layer at which swap analysis starts unless told otherwise.
/// Found from earlier runs; skipping the stem speeds up analysis.
pub const DEFAULT_STARTING_OP: &str = "conv1_bn";

impl LmsConfig {
    pub fn new(n_tensors: i64, lb: usize) -> Self {
        Self {
            n_tensors,
            lb,
            starting_op_names: vec![DEFAULT_STARTING_OP.to_string()],
        }
    }
}

pub struct LmsCallback {
    config:  LmsConfig,
    swapper: Box<dyn MemorySwapper>,
}

impl LmsCallback {
    pub fn new(config: LmsConfig, swapper: Box<dyn MemorySwapper>) -> Self {
        Self { config, swapper }
    }
}

impl TrainingCallback for LmsCallback {
    fn name(&self) -> &str {
        "lms"
    }

    fn on_train_begin(&mut self, ctx: &TrainContext) -> Result<()> {
        tracing::info!(
            "Enabling LMS: n_tensors={}, lb={}, starting at {:?}",
            self.config.n_tensors, self.config.lb, self.config.starting_op_names,
        );
        self.swapper.install(&self.config, &ctx.layer_names)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    struct Spy(Rc<RefCell<Vec<(LmsConfig, usize)>>>);

    impl MemorySwapper for Spy {
        fn install(&mut self, config: &LmsConfig, layer_names: &[String]) -> Result<()> {
            self.0.borrow_mut().push((config.clone(), layer_names.len()));
            Ok(())
        }
    }

    #[test]
    fn test_default_starting_hint() {
        let cfg = LmsConfig::new(-1, 1);
        assert_eq!(cfg.starting_op_names, vec!["conv1_bn"]);
    }

    #[test]
    fn test_installs_once_at_train_begin() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut cb = LmsCallback::new(LmsConfig::new(20, 30), Box::new(Spy(calls.clone())));

        let ctx = TrainContext {
            epochs:          2,
            steps_per_epoch: 3,
            batch_size:      1,
            layer_names:     vec!["conv1_conv".into(), "conv1_bn".into(), "predictions".into()],
        };
        cb.on_train_begin(&ctx).unwrap();
        cb.on_epoch_begin(0).unwrap();
        cb.on_batch_begin(0, 0).unwrap();
        cb.on_train_end().unwrap();

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.n_tensors, 20);
        assert_eq!(calls[0].0.lb, 30);
        assert_eq!(calls[0].1, 3);
    }
}
