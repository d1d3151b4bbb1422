//! CLI binary for unisearch.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use unisearch::{AppConfig, Credentials, render};

/// Unisearch: one query across climate-risk, news and sanctions sources.
#[derive(Parser)]
#[command(name = "unisearch", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search every configured source and print the ranked results.
    Search {
        /// Search query.
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Print results as a JSON array.
        #[arg(long)]
        json: bool,

        /// Aggregate deadline in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the effective configuration as TOML.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for --json.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("unisearch=info,unisearch_engine=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?.with_env_overrides();

    match cli.command {
        Command::Search {
            query,
            json,
            timeout,
        } => run_search(config, &query.join(" "), json, timeout).await,
        Command::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn run_search(
    mut config: AppConfig,
    query: &str,
    json: bool,
    timeout: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(secs) = timeout {
        config.search.search_timeout_seconds = secs;
    }

    let credentials = Credentials::from_env();
    let aggregator = unisearch::build_aggregator(&config, &credentials)?;

    let results = aggregator.search(query).await;
    tracing::info!(count = results.len(), "search complete");

    if json {
        println!("{}", render::render_json(&results)?);
    } else {
        print!("{}", render::render_text(&results, &aggregator.rate_limit_info()));
    }
    Ok(())
}
