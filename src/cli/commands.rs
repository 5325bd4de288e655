// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Four subcommands: `train`, `eval`, `count`, `best`.
// clap's derive macros generate --help, validation, and parsing.

use clap::{Args, Subcommand};

use crate::application::eval_use_case::EvalConfig;
use crate::application::train_use_case::{CheckpointPolicy, TrainConfig};
use crate::data::ground_truth::GroundTruthFormat;
use crate::domain::part::DatasetPart;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the density network on one dataset part
    Train(TrainArgs),

    /// Report MAE / RMSE of the best checkpoint on the test split
    Eval(EvalArgs),

    /// Estimate the number of people in a single image
    Count(CountArgs),

    /// Show or clear the best recorded MAE per part
    Best(BestArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Dataset part to train on (A or B)
    #[arg(long)]
    pub part: DatasetPart,

    /// Number of full passes through the training split
    #[arg(long, default_value_t = 10)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,

    /// Root holding part_A_final/ and part_B_final/
    #[arg(long, default_value = "data/ShanghaiTech")]
    pub data_root: String,

    /// Directory for weights, configs and metrics
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// JSON file with the best MAE recorded per part
    #[arg(long, default_value = "best_vals.txt")]
    pub best_vals: String,

    /// Format of the files in ground-truth/
    #[arg(long, value_enum, default_value_t = GroundTruthFormat::Npy)]
    pub gt_format: GroundTruthFormat,

    /// Divide every channel count of the network by this
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub width_divisor: u64,

    /// Seed for the per-epoch shuffle of the training split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Background threads decoding images (0 = load on the main thread)
    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,

    /// Compare against the best MAE after the last epoch only, or after every epoch
    #[arg(long, value_enum, default_value_t = CheckpointPolicy::Final)]
    pub checkpoint_policy: CheckpointPolicy,
}

impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            part:              a.part,
            data_root:         a.data_root,
            checkpoint_dir:    a.checkpoint_dir,
            best_vals_path:    a.best_vals,
            gt_format:         a.gt_format,
            epochs:            a.epochs,
            lr:                a.lr,
            width_divisor:     a.width_divisor as usize,
            seed:              a.seed,
            num_workers:       a.num_workers,
            checkpoint_policy: a.checkpoint_policy,
        }
    }
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Dataset part to evaluate (A or B)
    #[arg(long)]
    pub part: DatasetPart,

    #[arg(long, default_value = "data/ShanghaiTech")]
    pub data_root: String,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, value_enum, default_value_t = GroundTruthFormat::Npy)]
    pub gt_format: GroundTruthFormat,

    #[arg(long, default_value_t = 2)]
    pub num_workers: usize,
}

impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            part:        a.part,
            data_root:   a.data_root,
            gt_format:   a.gt_format,
            num_workers: a.num_workers,
        }
    }
}

#[derive(Args, Debug)]
pub struct CountArgs {
    /// JPEG to count
    #[arg(long)]
    pub image: String,

    /// Whose best checkpoint to use (A or B)
    #[arg(long)]
    pub part: DatasetPart,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Also write the predicted density map as a PNG
    #[arg(long)]
    pub density_out: Option<String>,
}

#[derive(Args, Debug)]
pub struct BestArgs {
    #[arg(long, default_value = "best_vals.txt")]
    pub best_vals: String,

    /// Clear the recorded MAE of this part
    #[arg(long)]
    pub reset: Option<DatasetPart>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_args_into_config() {
        let cli = Cli::try_parse_from([
            "crowdcount", "train", "--part", "B", "--epochs", "3",
            "--checkpoint-policy", "every-epoch", "--width-divisor", "4",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.part, DatasetPart::B);
        assert_eq!(cfg.epochs, 3);
        assert_eq!(cfg.lr, 1e-4);
        assert_eq!(cfg.width_divisor, 4);
        assert_eq!(cfg.checkpoint_policy, CheckpointPolicy::EveryEpoch);
    }

    #[test]
    fn test_unknown_part_rejected() {
        assert!(Cli::try_parse_from(["crowdcount", "train", "--part", "C"]).is_err());
    }

    #[test]
    fn test_zero_width_divisor_rejected() {
        assert!(Cli::try_parse_from(["crowdcount", "train", "--part", "A", "--width-divisor", "0"]).is_err());
    }
}
