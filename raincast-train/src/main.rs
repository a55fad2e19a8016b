//! Offline trainer for the raincast precipitation model.
//!
//! Reads a historical Open-Meteo CSV export, fits a random-forest regressor
//! on the 13 dashboard features, reports error metrics on a chronological
//! hold-out, and writes the model artifact the dashboard loads at startup.

use std::path::PathBuf;

use clap::Parser;

use raincast_core::RainfallModel;

mod dataset;

#[derive(Debug, Parser)]
#[command(name = "raincast-train", version, about = "Train the raincast precipitation model")]
struct Args {
    /// Historical weather CSV (Open-Meteo export with a header row).
    #[arg(long)]
    data: PathBuf,

    /// Where to write the trained model artifact.
    #[arg(long)]
    out: PathBuf,

    /// Number of trees in the forest.
    #[arg(long, default_value_t = 70)]
    trees: usize,

    /// Random seed for reproducible fits.
    #[arg(long, default_value_t = 80)]
    seed: u64,

    /// Fraction of rows held out (chronologically) for evaluation.
    #[arg(long, default_value_t = 0.3)]
    test_fraction: f64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let full = dataset::load_csv(&args.data)?;
    println!("Loaded {} rows from {}", full.len(), args.data.display());

    let (train, test) = dataset::train_test_split(&full, args.test_fraction)?;
    println!("Training on {} rows, holding out {}", train.len(), test.len());

    let model = RainfallModel::fit(&train.rows, &train.targets, args.trees, args.seed)?;

    if test.is_empty() {
        println!("Hold-out is empty; skipping evaluation");
    } else {
        let predicted = model.predict_batch(&test.rows)?;
        println!(
            "MSE: {:.4}",
            dataset::mean_squared_error(&test.targets, &predicted)
        );
        println!("R²: {:.4}", dataset::r2_score(&test.targets, &predicted));
    }

    model.save(&args.out)?;
    println!("Saved model to {}", args.out.display());

    Ok(())
}
