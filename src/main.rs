mod api_types;
mod config;
mod fetch;
mod ledger;
mod models;
mod orchestrator;
mod overlap;
mod relevance;
mod render;
mod retry;
mod reviews;
mod sentiment;
mod topics;
mod urlclean;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::orchestrator::{run, RunOptions};

/// Insurance company news monitor: filters fetched articles for true
/// relevance, keeps a stable article ledger, and renders a topic-overlap
/// report for the three tracked companies.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Output directory for the report and renderer inputs
    #[arg(short, long, default_value = "results")]
    output_dir: PathBuf,

    /// Path to a TOML config with the entity rule table (built-in default
    /// covers the three tracked companies)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to the article ledger CSV
    #[arg(short, long, default_value = "url_analysis.csv")]
    ledger: PathBuf,

    /// Skip all network fetches and rebuild the report from the ledger
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    debug!(
        "Args - output_dir={}, ledger={}, offline={}",
        args.output_dir.display(),
        args.ledger.display(),
        args.offline
    );

    let cfg = AppConfig::load(args.config.as_deref())?;
    info!(
        "Config loaded - companies={:?}",
        cfg.companies.iter().map(|c| c.name.as_str()).collect::<Vec<_>>()
    );

    let opts = RunOptions {
        output_dir: args.output_dir,
        ledger_path: args.ledger,
        offline: args.offline,
        api_key: std::env::var("NEWS_API_KEY").ok(),
    };

    run(&cfg, &opts).await
}
