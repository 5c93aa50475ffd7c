//! Bestiary CLI - scrape the animal list, resolve images, write the report.

use anyhow::{Context, Result};
use bestiary_core::{BestiaryConfig, Pipeline};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "bestiary")]
#[command(about = "Build an illustrated HTML index of animal collateral adjectives")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for downloaded images and the fallback
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Maximum number of concurrent resolutions
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// User agent sent with every request
    #[arg(long)]
    user_agent: Option<String>,

    /// Page holding the animal tables
    #[arg(long)]
    source_url: Option<String>,

    /// Report destination (defaults to index.html in the output directory)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Download the source page even if a cached copy exists
    #[arg(long)]
    refresh_source: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

impl Args {
    /// Config file (or defaults) with command-line overrides applied.
    fn build_config(&self) -> Result<BestiaryConfig> {
        let mut config = match &self.config {
            Some(path) => BestiaryConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => BestiaryConfig::default(),
        };

        if let Some(dir) = &self.output_dir {
            config = config.with_output_directory(dir);
        }
        if let Some(width) = self.concurrency {
            config = config.with_concurrency_width(width);
        }
        if let Some(secs) = self.timeout {
            config = config.with_request_timeout(secs);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent);
        }
        if let Some(url) = &self.source_url {
            config.source_url = url.clone();
        }
        if let Some(report) = &self.report {
            config.report_path = Some(report.clone());
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --debug
    let default_level = if args.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    let config = args.build_config()?;
    info!("Writing images to {}", config.output_directory.display());

    let summary = Pipeline::new(config)?
        .refresh_source(args.refresh_source)
        .run()
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{} records, {} images, {} fallbacks",
            summary.records, summary.batch.resolved, summary.batch.fallbacks
        );
        println!("Report: {}", summary.report_path.display());
    }

    Ok(())
}
