// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap and routes each subcommand to its
// use case in Layer 2. Results are printed here and nowhere else.
//
//   train — fit a part, checkpoint when test MAE beats the record
//   eval  — MAE / RMSE of the best checkpoint on the test split
//   count — head count (and optional heatmap) for one image
//   best  — show or clear best_vals.txt

pub mod commands;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use commands::{BestArgs, Commands, CountArgs, EvalArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "crowdcount",
    version,
    about = "Train a crowd density network and checkpoint it on held-out MAE."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn fmt_mae(mae: Option<f64>) -> String {
    mae.map(|v| format!("{v:.5}")).unwrap_or_else(|| "none".to_string())
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args) => run_train(args),
            Commands::Eval(args)  => run_eval(args),
            Commands::Count(args) => run_count(args),
            Commands::Best(args)  => run_best(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Training part {} from '{}'", args.part, args.data_root);

    let outcome = TrainUseCase::new(args.into()).execute()?;
    match outcome.saved {
        Some(best) => println!("New best MAE {:.5}; checkpoint '{}' saved.", best.mae, best.stem),
        None => println!("Best MAE not improved; no checkpoint saved."),
    }
    Ok(())
}

fn run_eval(args: EvalArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let use_case = EvalUseCase::new(&args.checkpoint_dir, args.part)?;
    let ckpt = use_case.inferencer().checkpoint();
    tracing::info!("Evaluating '{}' (MAE {:.5} at training time)", ckpt.stem, ckpt.mae);

    let metrics = use_case.evaluate(&args.into())?;
    println!(
        "Test MAE = {:.5}  RMSE = {:.5}  ({} images)",
        metrics.mae, metrics.rmse, metrics.samples
    );
    Ok(())
}

fn run_count(args: CountArgs) -> Result<()> {
    use crate::application::eval_use_case::EvalUseCase;

    let use_case = EvalUseCase::new(&args.checkpoint_dir, args.part)?;
    let report = use_case.count(Path::new(&args.image), args.density_out.as_deref().map(Path::new))?;
    println!("Estimated count: {:.1}", report.count);
    Ok(())
}

fn run_best(args: BestArgs) -> Result<()> {
    use crate::application::best_use_case::BestUseCase;

    let use_case = BestUseCase::new(&args.best_vals);
    let vals = match args.reset {
        Some(part) => use_case.reset(part)?,
        None => use_case.show()?,
    };
    println!("best_mae_a = {}", fmt_mae(vals.best_mae_a));
    println!("best_mae_b = {}", fmt_mae(vals.best_mae_b));
    Ok(())
}
