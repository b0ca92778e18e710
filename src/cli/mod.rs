// ============================================================
// Layer 1 - CLI / Presentation Layer
// ============================================================
// Parses the command line with clap and hands a RunConfig to the
// application layer. Results are printed here and nowhere else.
//
// Examples:
//   lms-resnet50 --image-size 2300
//   lms-resnet50 --image-size 3900 --lms
//   lms-resnet50 --image-size 2400 --lms --n-tensors 20 --lb 30
//   lms-resnet50 --inference --inference-batch-size 8

pub mod args;

use anyhow::Result;
use clap::Parser;

use crate::application::run_use_case::{RunOutcome, RunUseCase};
use args::RunArgs;

#[derive(Parser, Debug)]
#[command(
    name = "lms-resnet50",
    version,
    about = "Train or run inference on ResNet-50 with synthetic images, \
             optionally with large model support and a profiling window."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: RunArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let use_case = RunUseCase::new(self.args.into())?;

        match use_case.execute()? {
            RunOutcome::Trained { report, .. } => {
                match report.final_loss() {
                    Some(loss) => println!(
                        "Training complete: {} batches, final epoch loss {:.4}",
                        report.batches, loss
                    ),
                    None => println!("Training complete: {} batches", report.batches),
                }
            }
            RunOutcome::Inferred { predictions, .. } => {
                println!("Predicted classes: {:?}", predictions.classes);
            }
        }
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::run_use_case::RunConfig;
    use crate::ml::backend::MemoryOptimization;

    fn parse(args: &[&str]) -> Result<RunConfig, clap::Error> {
        let argv = std::iter::once("lms-resnet50").chain(args.iter().copied());
        Cli::try_parse_from(argv).map(|cli| cli.args.into())
    }

    #[test]
    fn test_defaults_match_run_config() {
        assert_eq!(parse(&[]).unwrap(), RunConfig::default());
    }

    #[test]
    fn test_lms_flags() {
        let cfg = parse(&["--image-size", "2400", "--lms", "--n-tensors", "20", "--lb", "30"]).unwrap();
        assert!(cfg.lms);
        assert_eq!(cfg.image_size, 2400);
        assert_eq!(cfg.n_tensors, 20);
        assert_eq!(cfg.lb, 30);
    }

    #[test]
    fn test_underscore_aliases() {
        let cfg = parse(&["--image_size", "64", "--nvprof", "--nvprof_start", "1"]).unwrap();
        assert_eq!(cfg.image_size, 64);
        assert!(cfg.nvprof);
        assert_eq!(cfg.nvprof_start, 1);
    }

    #[test]
    fn test_lms_and_no_lms_conflict() {
        assert!(parse(&["--lms", "--no-lms"]).is_err());
        assert!(parse(&["--nvprof", "--no-nvprof"]).is_err());
        assert!(!parse(&["--no-lms"]).unwrap().lms);
    }

    #[test]
    fn test_negative_swap_count() {
        assert_eq!(parse(&["--n-tensors", "-1"]).unwrap().n_tensors, -1);
    }

    #[test]
    fn test_inference_and_policy() {
        let cfg = parse(&[
            "--inference",
            "--inference-batch-size", "8",
            "--memory-optimization", "off",
            "--tb",
        ])
        .unwrap();
        assert!(cfg.inference_only);
        assert!(cfg.tensorboard);
        assert_eq!(cfg.inference_batch_size, 8);
        assert_eq!(cfg.memory_optimization, MemoryOptimization::Off);
    }

    #[test]
    fn test_negative_image_size_rejected_by_parser() {
        assert!(parse(&["--image-size", "-5"]).is_err());
    }
}
