//! RiceLink operations CLI: database seeding and matching-engine debug
//! commands.

mod query;
mod seed;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ricelink", about = "RiceLink operations CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed facilities, shipping companies, and demo accounts from the
    /// configured YAML file. Skips tables that already have rows.
    Seed {
        /// Print what would be inserted without writing anything.
        #[arg(long)]
        dry_run: bool,
    },
    /// Resolve an address through the geocoding fallback chain.
    Geocode { address: String },
    /// Run a facility match for an address and requested capacity.
    Match {
        address: String,
        /// Requested drying capacity in tons/day; 0 disables the filter.
        #[arg(default_value_t = 0.0)]
        capacity: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = ricelink_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Seed { dry_run } => seed::run(&config, dry_run).await,
        Commands::Geocode { address } => query::geocode(&config, &address).await,
        Commands::Match { address, capacity } => {
            query::run_match(&config, &address, capacity).await
        }
    }
}
