mod score;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "astrospot-cli")]
#[command(about = "Find and rank dark-sky observing spots")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one clustered search around a point and print the clusters as JSON
    Search {
        #[arg(long, allow_negative_numbers = true)]
        latitude: f64,

        #[arg(long, allow_negative_numbers = true)]
        longitude: f64,

        #[arg(long)]
        radius_km: f64,

        /// Override the configured recursion depth
        #[arg(long)]
        max_depth: Option<u32>,
    },
    /// Score a saved cluster list (or `search` output) against the weather forecast
    Score {
        /// JSON file holding `[{"locations": [...]}, ...]` or `{"clusters": [...]}`
        #[arg(long)]
        input: PathBuf,

        /// IANA timezone for the forecast; defaults to the configured one
        #[arg(long)]
        timezone: Option<String>,

        #[arg(long)]
        hour_from: Option<u32>,

        #[arg(long)]
        hour_to: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = astrospot_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    // stdout carries the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Search {
            latitude,
            longitude,
            radius_km,
            max_depth,
        } => {
            search::run_search(
                &config,
                search::SearchArgs {
                    latitude,
                    longitude,
                    radius_km,
                    max_depth,
                },
            )
            .await
        }
        Commands::Score {
            input,
            timezone,
            hour_from,
            hour_to,
        } => {
            score::run_score(
                &config,
                score::ScoreArgs {
                    input,
                    timezone,
                    hour_from,
                    hour_to,
                },
            )
            .await
        }
    }
}
