// ============================================================
// Layer 2 - RunUseCase
// ============================================================
// Orchestrates one run end to end:
//
//   Step 1: Validate the configuration       (before anything is allocated)
//   Step 2: Apply the backend memory policy  (Layer 5 - ml::backend)
//   Step 3: Build the synthetic generator    (Layer 4 - data)
//   Step 4: Build ResNet-50                  (Layer 5 - ml::model)
//   Step 5a: Inference - predict one batch   (Layer 5 - ml::inferencer)
//   Step 5b: Training  - assemble callbacks and fit
//
// Training always uses a batch size of 1; the batch size flag only
// applies to inference. Enabling LMS forces the checkpointing
// backend, since that is where its memory relief comes from.

use std::path::PathBuf;

use anyhow::Result;
use burn::tensor::backend::AutodiffBackend;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::callbacks::{
    curve_logger::CurveLogger,
    lms::LmsCallback,
    profile_window::ProfileWindow,
    CallbackList,
};
use crate::data::synthetic::{buffer_len, SyntheticImages};
use crate::domain::{error::ConfigError, traits::LmsConfig};
use crate::infra::{lms::CheckpointSwapper, metrics::MetricsLogger, profiler::TracingProfiler};
use crate::ml::{
    backend::{self, CheckpointBackend, MemoryOptimization, TrainBackend},
    inferencer::{predict, Predictions},
    model::{ResNet, ResNetConfig, MIN_IMAGE_SIZE},
    trainer::{fit, FitPlan, FitReport},
};

const TRAIN_BATCH_SIZE: usize = 1;
const INFERENCE_STEPS:  usize = 1;
const CHANNELS:         usize = 3;

// ─── Run Configuration ───────────────────────────────────────────────────────
// Everything a run needs. Serialisable so the curve logger can store
// it next to the curves it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Full passes over `steps` batches (training only)
    pub epochs:               usize,

    /// Batches per epoch. The generator is endless, so this alone
    /// decides how long an epoch is.
    pub steps:                usize,

    /// Height and width of the square RGB images, e.g. 500 → [3, 500, 500]
    pub image_size:           usize,

    /// Output classes of the dense head and range of generated labels
    pub num_classes:          usize,

    /// Large model support: swap activations out of device memory
    pub lms:                  bool,

    /// Number of tensors LMS may swap; -1 means every candidate
    pub n_tensors:            i64,

    /// LMS lowerbound: swap a tensor back in at least `lb` layers
    /// before backward needs it
    pub lb:                   usize,

    /// Open a profiling window during training
    pub nvprof:               bool,

    /// Epoch (1-based) that contains the profiling window
    pub nvprof_epoch:         usize,

    /// Batch (0-based) at which the window opens
    pub nvprof_start:         usize,

    /// Batch (0-based) at which the window closes
    pub nvprof_stop:          usize,

    /// Write per-batch and per-epoch loss curves to `log_dir`
    pub tensorboard:          bool,

    /// Root of the curve logs; runs land in `<log_dir>/fit/<timestamp>/`
    pub log_dir:              PathBuf,

    /// Predict one batch and skip training entirely
    pub inference_only:       bool,

    /// Images per batch in inference mode
    pub inference_batch_size: usize,

    /// Generator seed; `None` draws one at random and logs it
    pub seed:                 Option<u64>,

    /// Requested backend memory policy (LMS overrides `Off`)
    pub memory_optimization:  MemoryOptimization,

    /// Channels of the first bottleneck stage; 64 is standard ResNet-50
    pub base_width:           usize,

    /// Bottleneck blocks per stage; [3, 4, 6, 3] is standard ResNet-50
    pub stage_blocks:         [usize; 4],
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            epochs:               1,
            steps:                10,
            image_size:           500,
            num_classes:          15,
            lms:                  false,
            n_tensors:            -1,
            lb:                   1,
            nvprof:               false,
            nvprof_epoch:         1,
            nvprof_start:         4,
            nvprof_stop:          9,
            tensorboard:          false,
            log_dir:              PathBuf::from("logs"),
            inference_only:       false,
            inference_batch_size: 1,
            seed:                 None,
            memory_optimization:  MemoryOptimization::default(),
            base_width:           64,
            stage_blocks:         [3, 4, 6, 3],
        }
    }
}

impl RunConfig {
    /// Check every user-supplied number. Training-only settings are
    /// ignored in inference mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_size < MIN_IMAGE_SIZE {
            return Err(ConfigError::ImageTooSmall { size: self.image_size, min: MIN_IMAGE_SIZE });
        }
        if self.num_classes == 0 {
            return Err(ConfigError::NoClasses);
        }
        if self.base_width == 0 {
            return Err(ConfigError::NotPositive { name: "base width" });
        }
        if self.stage_blocks.contains(&0) {
            return Err(ConfigError::NotPositive { name: "blocks per stage" });
        }
        // one template per class must fit in host memory
        buffer_len(self.image_shape(), self.num_classes)?;

        if self.inference_only {
            if self.inference_batch_size == 0 {
                return Err(ConfigError::NotPositive { name: "inference batch size" });
            }
            buffer_len(self.image_shape(), self.inference_batch_size)?;
            return Ok(());
        }

        if self.epochs == 0 {
            return Err(ConfigError::NotPositive { name: "epochs" });
        }
        if self.steps == 0 {
            return Err(ConfigError::NotPositive { name: "steps per epoch" });
        }
        if self.lms && self.n_tensors != -1 && self.n_tensors <= 0 {
            return Err(ConfigError::SwapCount(self.n_tensors));
        }
        if self.nvprof {
            if !(1..=self.epochs).contains(&self.nvprof_epoch) {
                return Err(ConfigError::ProfileWindow(format!(
                    "epoch {} is outside 1..={}",
                    self.nvprof_epoch, self.epochs
                )));
            }
            if self.nvprof_start >= self.nvprof_stop {
                return Err(ConfigError::ProfileWindow(format!(
                    "start batch {} must come before stop batch {}",
                    self.nvprof_start, self.nvprof_stop
                )));
            }
            if self.nvprof_stop >= self.steps {
                return Err(ConfigError::ProfileWindow(format!(
                    "stop batch {} is beyond the last step {}",
                    self.nvprof_stop,
                    self.steps - 1
                )));
            }
        }
        Ok(())
    }

    /// The memory policy a run actually uses. LMS relies on the
    /// checkpointing backend, so it overrides `Off`.
    pub fn memory_policy(&self) -> MemoryOptimization {
        if self.lms && !self.inference_only {
            MemoryOptimization::SchedulingHeuristics
        } else {
            self.memory_optimization
        }
    }

    fn image_shape(&self) -> [usize; 3] {
        [CHANNELS, self.image_size, self.image_size]
    }

    fn model_config(&self) -> ResNetConfig {
        ResNetConfig::new(self.num_classes)
            .with_in_channels(CHANNELS)
            .with_stage_blocks(self.stage_blocks)
            .with_base_width(self.base_width)
    }
}

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Trained  { report: FitReport, batches_drawn: usize },
    Inferred { predictions: Predictions, batches_drawn: usize },
}

// ─── RunUseCase ──────────────────────────────────────────────────────────────
pub struct RunUseCase {
    config: RunConfig,
    seed:   u64,
}

impl RunUseCase {
    /// Validate `config` and fix the generator seed. Fails with a
    /// `ConfigError` before any model or device is touched.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
        tracing::info!("Synthetic data seed: {}", seed);
        Ok(Self { config, seed })
    }

    /// Run on the default GPU device with the configured memory policy.
    pub fn execute(&self) -> Result<RunOutcome> {
        let device = backend::default_device();
        tracing::info!("Using WGPU device: {:?}", device);

        let policy = self.config.memory_policy();
        if policy != self.config.memory_optimization {
            tracing::info!(
                "LMS enabled: memory policy {:?} instead of {:?}",
                policy, self.config.memory_optimization,
            );
        }
        match policy {
            MemoryOptimization::Off => self.execute_on::<TrainBackend>(device),
            MemoryOptimization::SchedulingHeuristics => {
                self.execute_on::<CheckpointBackend>(device)
            }
        }
    }

    /// Run on backend `B`. Inference uses `B`'s inner (non-autodiff) backend.
    pub fn execute_on<B: AutodiffBackend>(&self, device: B::Device) -> Result<RunOutcome> {
        let cfg   = &self.config;
        let shape = cfg.image_shape();
        tracing::info!(
            "Memory optimization: {:?}, input shape {:?}, {} classes",
            cfg.memory_policy(), shape, cfg.num_classes,
        );

        if cfg.inference_only {
            let mut data =
                SyntheticImages::new(cfg.inference_batch_size, cfg.num_classes, shape, self.seed)?;
            let model: ResNet<B::InnerBackend> = cfg.model_config().init(&device);
            let predictions = predict(&model, &mut data, INFERENCE_STEPS, &device)?;
            return Ok(RunOutcome::Inferred {
                predictions,
                batches_drawn: data.batches_drawn(),
            });
        }

        let mut callbacks = self.build_callbacks()?;
        let mut data = SyntheticImages::new(TRAIN_BATCH_SIZE, cfg.num_classes, shape, self.seed)?;
        let model: ResNet<B> = cfg.model_config().init(&device);

        let plan = FitPlan {
            epochs:          cfg.epochs,
            steps_per_epoch: cfg.steps,
            batch_size:      TRAIN_BATCH_SIZE,
        };
        let (_, report) = fit(model, &mut data, &plan, &mut callbacks, &device)?;
        Ok(RunOutcome::Trained { report, batches_drawn: data.batches_drawn() })
    }

    /// Curve logger, profiling window, LMS; each only when enabled.
    fn build_callbacks(&self) -> Result<CallbackList> {
        let cfg = &self.config;
        let mut callbacks = CallbackList::default();

        if cfg.tensorboard {
            let logger = MetricsLogger::create(&cfg.log_dir)?;
            logger.save_config(cfg)?;
            callbacks.push(CurveLogger::new(logger));
        }

        if cfg.nvprof {
            callbacks.push(ProfileWindow::new(
                cfg.nvprof_epoch,
                cfg.nvprof_start,
                cfg.nvprof_stop,
                Box::new(TracingProfiler::new()),
            ));
        }

        if cfg.lms {
            callbacks.push(LmsCallback::new(
                LmsConfig::new(cfg.n_tensors, cfg.lb),
                Box::new(CheckpointSwapper::new()),
            ));
        }

        tracing::info!("Callbacks: {:?}", callbacks.names());
        Ok(callbacks)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::Autodiff;
    use burn_ndarray::NdArray;

    type TestBackend = Autodiff<NdArray<f32>>;

    /// Smallest configuration that still builds a real network
    fn tiny() -> RunConfig {
        RunConfig {
            epochs:       1,
            steps:        2,
            image_size:   32,
            num_classes:  3,
            seed:         Some(5),
            base_width:   2,
            stage_blocks: [1, 1, 1, 1],
            ..RunConfig::default()
        }
    }

    fn config_error(cfg: RunConfig) -> ConfigError {
        let err = RunUseCase::new(cfg).err().expect("config should be rejected");
        err.downcast_ref::<ConfigError>().cloned().expect("not a ConfigError")
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_small_image() {
        let cfg = RunConfig { image_size: 0, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::ImageTooSmall { size: 0, min: 32 });
    }

    #[test]
    fn test_rejects_zero_classes() {
        let cfg = RunConfig { num_classes: 0, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::NoClasses);
    }

    #[test]
    fn test_rejects_zero_epochs_and_steps() {
        let cfg = RunConfig { epochs: 0, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::NotPositive { name: "epochs" });
        let cfg = RunConfig { steps: 0, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::NotPositive { name: "steps per epoch" });
    }

    #[test]
    fn test_rejects_zero_inference_batch() {
        let cfg = RunConfig {
            inference_only:       true,
            inference_batch_size: 0,
            ..RunConfig::default()
        };
        assert_eq!(config_error(cfg), ConfigError::NotPositive { name: "inference batch size" });
    }

    #[test]
    fn test_inference_ignores_training_settings() {
        let cfg = RunConfig { inference_only: true, epochs: 0, steps: 0, ..RunConfig::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_swap_count_checked_only_with_lms() {
        let cfg = RunConfig { n_tensors: 0, ..RunConfig::default() };
        assert!(cfg.validate().is_ok());
        let cfg = RunConfig { lms: true, n_tensors: 0, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::SwapCount(0));
        let cfg = RunConfig { lms: true, n_tensors: -2, ..RunConfig::default() };
        assert_eq!(config_error(cfg), ConfigError::SwapCount(-2));
    }

    #[test]
    fn test_profile_window_checks() {
        let base = RunConfig { nvprof: true, epochs: 2, steps: 10, ..RunConfig::default() };
        assert!(base.validate().is_ok());

        for bad in [
            RunConfig { nvprof_epoch: 0, ..base.clone() },
            RunConfig { nvprof_epoch: 3, ..base.clone() },
            RunConfig { nvprof_start: 5, nvprof_stop: 5, ..base.clone() },
            RunConfig { nvprof_stop: 10, ..base.clone() },
        ] {
            assert!(matches!(config_error(bad), ConfigError::ProfileWindow(_)));
        }
    }

    #[test]
    fn test_inference_draws_one_batch_and_skips_training() {
        let tmp = tempfile::tempdir().unwrap();
        let log_dir = tmp.path().join("logs");
        let cfg = RunConfig {
            inference_only:       true,
            inference_batch_size: 4,
            tensorboard:          true,
            nvprof:               true,
            lms:                  true,
            log_dir:              log_dir.clone(),
            ..tiny()
        };

        let outcome = RunUseCase::new(cfg)
            .unwrap()
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        match outcome {
            RunOutcome::Inferred { predictions, batches_drawn } => {
                assert_eq!(batches_drawn, 1);
                assert_eq!(predictions.rows(), 4);
                assert_eq!(predictions.num_classes, 3);
            }
            other => panic!("expected inference, got {other:?}"),
        }
        // no callback was built, so no curve directory either
        assert!(!log_dir.exists());
    }

    #[test]
    fn test_training_with_all_callbacks() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = RunConfig {
            epochs:       2,
            steps:        3,
            tensorboard:  true,
            log_dir:      tmp.path().to_path_buf(),
            nvprof:       true,
            nvprof_epoch: 2,
            nvprof_start: 0,
            nvprof_stop:  2,
            lms:          true,
            n_tensors:    10,
            lb:           2,
            ..tiny()
        };

        let outcome = RunUseCase::new(cfg)
            .unwrap()
            .execute_on::<TestBackend>(Default::default())
            .unwrap();

        match outcome {
            RunOutcome::Trained { report, batches_drawn } => {
                assert_eq!(batches_drawn, 6);
                assert_eq!(report.batches, 6);
                assert_eq!(report.epochs.len(), 2);
            }
            other => panic!("expected training, got {other:?}"),
        }

        let runs: Vec<_> = std::fs::read_dir(tmp.path().join("fit")).unwrap().collect();
        assert_eq!(runs.len(), 1);
        let run_dir = runs[0].as_ref().unwrap().path();
        assert!(run_dir.join("run_config.json").exists());
        let batches = std::fs::read_to_string(run_dir.join("batch_metrics.csv")).unwrap();
        assert_eq!(batches.lines().count(), 7);
    }

    #[test]
    fn test_rejects_oversized_image() {
        let cfg = RunConfig { image_size: 1 << 32, ..RunConfig::default() };
        assert_eq!(
            config_error(cfg),
            ConfigError::ImageTooLarge { shape: [3, 1 << 32, 1 << 32], items: 15 }
        );

        // templates fit, a large inference batch does not
        let cfg = RunConfig {
            image_size:           1 << 28,
            num_classes:          1,
            inference_only:       true,
            inference_batch_size: 1 << 8,
            ..RunConfig::default()
        };
        assert_eq!(
            config_error(cfg),
            ConfigError::ImageTooLarge { shape: [3, 1 << 28, 1 << 28], items: 1 << 8 }
        );
    }

    #[test]
    fn test_lms_selects_checkpointing_backend() {
        let cfg = RunConfig {
            lms:                 true,
            memory_optimization: MemoryOptimization::Off,
            ..RunConfig::default()
        };
        assert_eq!(cfg.memory_policy(), MemoryOptimization::SchedulingHeuristics);

        let cfg = RunConfig { lms: false, ..cfg };
        assert_eq!(cfg.memory_policy(), MemoryOptimization::Off);

        // inference never builds a training graph, so LMS has nothing to relieve
        let cfg = RunConfig { lms: true, inference_only: true, ..cfg };
        assert_eq!(cfg.memory_policy(), MemoryOptimization::Off);
    }

    #[test]
    fn test_seed_is_kept_when_given() {
        let uc = RunUseCase::new(tiny()).unwrap();
        assert_eq!(uc.seed, 5);
        assert_eq!(uc.config.seed, Some(5));
    }
}
