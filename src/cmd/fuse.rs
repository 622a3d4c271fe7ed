use crate::reports;
use clap::Args;
use gridpick::config::Config;
use gridpick::error::GpResult;
use gridpick::fusion::ScoreFuser;
use gridpick::loader;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct FuseArgs {
    #[command(flatten)]
    pub config: Config,

    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the quality map and candidates as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &FuseArgs, config: &Config) -> GpResult<()> {
    info!("📂 Loading Scores: {}", args.input.display());
    let grid = loader::load_grid(&args.input)?;

    let fused = ScoreFuser::from_params(&config.fusion)?.run(&grid);

    reports::print_quality_map("QUALITY", &fused.quality, &[]);
    reports::print_candidates(&fused.candidates);

    if let Some(path) = &args.output {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(
            writer,
            &serde_json::json!({
                "quality": fused.quality,
                "candidates": fused.candidates,
            }),
        )?;
        info!("💾 Fusion written to {}", path.display());
    }

    Ok(())
}
