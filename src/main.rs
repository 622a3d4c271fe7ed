use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use gridpick::config::Config;
use std::process;
use tracing::{error, info, Level};

mod cmd;
mod reports;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// JSON file with fusion and search settings
    #[arg(global = true, long)]
    config: Option<String>,

    #[arg(global = true, long, default_value_t = false)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Pick a focus point and acquisition points for one score grid
    Select(cmd::select::SelectArgs),
    /// Show the fused quality map and carbon candidates
    Fuse(cmd::fuse::FuseArgs),
}

fn main() {
    let matches = Cli::command().get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    // Config flags live inside the subcommand's matches, not the root.
    let (cli_config, sub_matches) = match &cli.command {
        Commands::Select(args) => (&args.config, matches.subcommand_matches("select")),
        Commands::Fuse(args) => (&args.config, matches.subcommand_matches("fuse")),
    };

    let config = match &cli.config {
        Some(path) => {
            info!("⚖️  Loading Config from: {}", path);
            let mut file_config = Config::load_from_file(path).unwrap_or_else(|e| {
                error!("{}", e);
                process::exit(1);
            });
            if let Some(sub) = sub_matches {
                file_config.merge_from_cli(cli_config, sub);
            }
            file_config
        }
        None => cli_config.clone(),
    };

    let outcome = match &cli.command {
        Commands::Select(args) => cmd::select::run(args, &config),
        Commands::Fuse(args) => cmd::fuse::run(args, &config),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}
