mod reviews;
mod search;

use std::time::Duration;

use clap::{Parser, Subcommand};
use idmap_places::category::{fallbacks_for, normalize, FALLBACKS, SYNONYMS};
use idmap_places::{GeoapifyClient, PlacesBackend};
use tracing_subscriber::EnvFilter;

use crate::reviews::ReviewsCommands;
use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "idmap")]
#[command(about = "Find places and record accessibility-challenge reviews")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Progressive place search around a city/state/country
    Search(SearchArgs),
    /// Resolve a location description to a point or bounding box
    Geocode {
        /// Free-text location, e.g. "College Park, MD, USA"
        text: String,
    },
    /// Read or add reviews in the local review store
    Reviews {
        /// Review store file
        #[arg(
            long,
            global = true,
            env = "IDMAP_REVIEWS_PATH",
            default_value = "./reviews.json"
        )]
        path: std::path::PathBuf,
        #[command(subcommand)]
        command: ReviewsCommands,
    },
    /// List category synonyms and fallback categories
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search(args) => {
            let config = idmap_core::load_app_config()?;
            search::run_search(&config, &args).await?;
        }
        Commands::Geocode { text } => {
            let config = idmap_core::load_app_config()?;
            run_geocode(&config, &text).await?;
        }
        Commands::Reviews { path, command } => reviews::run_reviews(&path, command).await?,
        Commands::Categories => print_categories(),
    }

    Ok(())
}

async fn run_geocode(config: &idmap_core::AppConfig, text: &str) -> anyhow::Result<()> {
    let client = GeoapifyClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Geoapify client: {e}"))?;
    let area = tokio::time::timeout(
        Duration::from_secs(config.request_timeout_secs),
        client.geocode(text),
    )
    .await
    .map_err(|_| anyhow::anyhow!("geocode timed out after {}s", config.request_timeout_secs))??;
    println!("{}", serde_json::to_string_pretty(&area)?);
    Ok(())
}

fn print_categories() {
    println!("{:<20} CATEGORY", "PHRASE");
    for (phrase, canonical) in SYNONYMS {
        println!("{phrase:<20} {canonical}");
    }

    println!();
    println!("Fallbacks (tried in order when a category search comes back empty):");
    for (key, _) in FALLBACKS {
        let Some(token) = normalize(key) else {
            continue;
        };
        let alts: Vec<_> = fallbacks_for(&token).iter().map(ToString::to_string).collect();
        println!("  {token} -> {}", alts.join(", "));
    }
}
