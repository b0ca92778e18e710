// ============================================================
// Layer 1 - CLI Arguments
// ============================================================
// Every flag of a run, grouped the way they are used: the run
// shape, large model support, the profiling window, and output.
// Underscore spellings (`--image_size`) are accepted as aliases.

use std::path::PathBuf;

use clap::Args;

use crate::application::run_use_case::RunConfig;
use crate::ml::backend::MemoryOptimization;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Number of epochs to run
    #[arg(long, default_value_t = 1)]
    pub epochs: usize,

    /// Number of steps per epoch
    #[arg(long, default_value_t = 10)]
    pub steps: usize,

    /// Side length of the square images to generate
    #[arg(long, alias = "image_size", default_value_t = 500)]
    pub image_size: usize,

    /// Number of image classes
    #[arg(long, alias = "num_classes", default_value_t = 15)]
    pub num_classes: usize,

    /// Only run inference on one batch, no training
    #[arg(long = "inference")]
    pub inference_only: bool,

    /// Batch size used in inference mode
    #[arg(long, alias = "inference_batch_size", default_value_t = 1)]
    pub inference_batch_size: usize,

    /// Seed for the synthetic data; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Backend memory optimization policy
    #[arg(long, value_enum, default_value_t = MemoryOptimization::SchedulingHeuristics)]
    pub memory_optimization: MemoryOptimization,

    /// Width of the first ResNet stage (64 for the standard ResNet-50)
    #[arg(long, default_value_t = 64)]
    pub base_width: usize,

    #[command(flatten)]
    pub lms: LmsArgs,

    #[command(flatten)]
    pub profile: ProfileArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Large model support
#[derive(Args, Debug)]
pub struct LmsArgs {
    /// Enable large model support (implies the checkpointing backend)
    #[arg(long, conflicts_with = "no_lms")]
    pub lms: bool,

    /// Disable large model support (default)
    #[arg(long = "no-lms")]
    pub no_lms: bool,

    /// Number of tensors to swap, -1 for all
    #[arg(long, alias = "n_tensors", default_value_t = -1, allow_negative_numbers = true)]
    pub n_tensors: i64,

    /// Lowerbound: a tensor is swapped in during the backward phase
    /// at least this many layers before it is needed
    #[arg(long, default_value_t = 1)]
    pub lb: usize,
}

/// Profiling window
#[derive(Args, Debug)]
pub struct ProfileArgs {
    /// Enable the profiling window
    #[arg(long, conflicts_with = "no_nvprof")]
    pub nvprof: bool,

    /// Disable the profiling window (default)
    #[arg(long = "no-nvprof")]
    pub no_nvprof: bool,

    /// Epoch (1-based) in which to profile
    #[arg(long, alias = "nvprof_epoch", default_value_t = 1)]
    pub nvprof_epoch: usize,

    /// Batch at which profiling starts
    #[arg(long, alias = "nvprof_start", default_value_t = 4)]
    pub nvprof_start: usize,

    /// Batch at which profiling stops
    #[arg(long, alias = "nvprof_stop", default_value_t = 9)]
    pub nvprof_stop: usize,
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// Log per-batch and per-epoch training curves
    #[arg(long = "tb")]
    pub tensorboard: bool,

    /// Root directory for training curves
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,
}

/// The boundary between Layer 1 and Layer 2: the application layer
/// never sees clap types.
impl From<RunArgs> for RunConfig {
    fn from(a: RunArgs) -> Self {
        RunConfig {
            epochs:               a.epochs,
            steps:                a.steps,
            image_size:           a.image_size,
            num_classes:          a.num_classes,
            lms:                  a.lms.lms,
            n_tensors:            a.lms.n_tensors,
            lb:                   a.lms.lb,
            nvprof:               a.profile.nvprof,
            nvprof_epoch:         a.profile.nvprof_epoch,
            nvprof_start:         a.profile.nvprof_start,
            nvprof_stop:          a.profile.nvprof_stop,
            tensorboard:          a.output.tensorboard,
            log_dir:              a.output.log_dir,
            inference_only:       a.inference_only,
            inference_batch_size: a.inference_batch_size,
            seed:                 a.seed,
            memory_optimization:  a.memory_optimization,
            base_width:           a.base_width,
            ..RunConfig::default()
        }
    }
}
