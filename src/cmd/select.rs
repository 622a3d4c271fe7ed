use crate::reports::{self, PixelMapping};
use clap::Args;
use gridpick::api::{select_targets_with, TargetPlan};
use gridpick::config::Config;
use gridpick::error::GpResult;
use gridpick::loader;
use gridpick::optimizer::{BestResult, ProgressCallback};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    #[command(flatten)]
    pub config: Config,

    /// Class score grid (.csv or .json)
    #[arg(short, long)]
    pub input: PathBuf,

    #[arg(short = 'S', long)]
    pub seed: Option<u64>,

    /// Write the result as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pixel size of one grid cell, for the pixel column of the report
    #[arg(long, default_value_t = 64)]
    pub patch_size: usize,

    /// Pixel offset of the first cell's centre
    #[arg(long, default_value_t = 46)]
    pub patch_offset: usize,
}

struct CliLogger;
impl ProgressCallback for CliLogger {
    fn on_progress(&self, completed: usize, total: usize, best_score: f64) -> bool {
        info!("Trials {:>6}/{} | Best: {:.3}", completed, total, best_score);
        true
    }
}

#[derive(Serialize)]
struct SelectionReport<'a> {
    seed: u64,
    best: &'a BestResult,
    plan: &'a TargetPlan,
}

pub fn run(args: &SelectArgs, config: &Config) -> GpResult<()> {
    info!("📂 Loading Scores: {}", args.input.display());
    let grid = loader::load_grid(&args.input)?;

    // Always log the seed so any run can be replayed
    let seed = args.seed.unwrap_or_else(|| fastrand::u64(..));
    info!("🎲 Seed: {}", seed);

    let (fused, best) = select_targets_with(&grid, config, seed, CliLogger)?;
    let plan = TargetPlan::from(&best);

    reports::print_quality_map("QUALITY (picks marked)", &fused.quality, &best.points);
    reports::print_plan(
        &plan,
        &PixelMapping {
            patch_size: args.patch_size,
            patch_offset: args.patch_offset,
        },
    );

    info!("=== 🏆 FINAL RESULT ===");
    println!("Score: {:.4}", best.total_score);
    println!(
        "Points: {}",
        best.points
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    );

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(
            writer,
            &SelectionReport {
                seed,
                best: &best,
                plan: &plan,
            },
        )?;
        info!("💾 Result written to {}", path.display());
    }

    Ok(())
}
