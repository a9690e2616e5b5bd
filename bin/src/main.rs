//! cima CLI binary.
//!
//! Ranks configured universes by multi-horizon momentum and inspects the
//! ranking history.

mod cmd;
mod data;
mod report;
mod settings;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use cima_history::Tier;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use cmd::rank::RankArgs;
use settings::Settings;

#[derive(Parser)]
#[command(name = "cima")]
#[command(about = "Cascading multi-horizon momentum ranking", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file (defaults to ./cima.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank universes and record the result
    Rank {
        /// Price file (.csv or .json) or directory of per-asset files
        #[arg(short, long)]
        prices: Option<PathBuf>,

        /// Universe ids to rank (default: all configured)
        #[arg(short, long, value_delimiter = ',')]
        universe: Vec<String>,

        /// History date for this run (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Rank and print without writing history or the report
        #[arg(long)]
        dry_run: bool,
    },

    /// Show recorded history
    History {
        /// Only this universe (id or name)
        #[arg(short, long)]
        universe: Option<String>,

        /// Number of dates to show
        #[arg(short = 'n', long, default_value = "10")]
        limit: usize,
    },

    /// Show position changes between the two latest runs
    Changes {
        /// Only this universe (id or name)
        #[arg(short, long)]
        universe: Option<String>,

        /// Tier to compare
        #[arg(short, long, value_enum, default_value_t = TierArg::Ultra)]
        tier: TierArg,

        /// Positions to compare (defaults to the tier size)
        #[arg(long)]
        depth: Option<usize>,
    },

    /// List configured universes
    Universes {
        /// Show members
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TierArg {
    /// ultraTop5
    Ultra,
    /// top10
    Top,
}

impl From<TierArg> for Tier {
    fn from(arg: TierArg) -> Self {
        match arg {
            TierArg::Ultra => Self::UltraTop5,
            TierArg::Top => Self::Top10,
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank {
            prices,
            universe,
            date,
            dry_run,
        } => {
            let args = RankArgs {
                prices,
                universes: universe,
                date,
                dry_run,
            };
            cmd::rank::run_rank(&settings, args).await?;
        }
        Commands::History { universe, limit } => {
            cmd::history::show_history(&settings, universe, limit).await?;
        }
        Commands::Changes {
            universe,
            tier,
            depth,
        } => {
            cmd::changes::show_changes(&settings, universe, tier.into(), depth).await?;
        }
        Commands::Universes { verbose } => {
            cmd::universes::list_universes(&settings, verbose).await?;
        }
    }

    Ok(())
}
