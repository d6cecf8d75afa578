// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::process;
use std::time::Duration;
use tracing::{error, info};

mod blob;
mod catalog;
mod config;
mod fetch;
mod hashing;
mod imaging;
mod logging;
mod pipeline;
mod ratelimit;
#[cfg(test)]
mod test_utils;
mod vision;

use crate::blob::S3BlobStore;
use crate::catalog::PostgresCatalog;
use crate::fetch::HttpFetcher;
use crate::pipeline::{ImageJob, ProcessStatus, Processor};
use crate::ratelimit::RateLimiter;
use crate::vision::OpenRouterChecker;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.toml",
        global = true
    )]
    config: String,

    /// Path to the log file
    #[arg(
        long,
        value_name = "FILE",
        default_value = "logs/worker.log",
        global = true
    )]
    log_file: String,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a single image job
    Process {
        /// Card the fetched image belongs to
        #[arg(long)]
        card_id: String,

        /// URL to fetch the image from
        #[arg(long)]
        url: String,

        /// Source id to resolve rate limits and trust tier
        #[arg(long)]
        source_id: Option<String>,

        /// Source name, used when no source id is given
        #[arg(long)]
        source_name: Option<String>,

        /// Fallback trust tier (1-3) when no source resolves
        #[arg(long)]
        trust_tier: Option<i16>,

        /// Card number, forwarded to the vision check
        #[arg(long)]
        card_number: Option<String>,

        /// Set code, forwarded to the vision check
        #[arg(long)]
        set_code: Option<String>,
    },
    /// Process jobs from a JSON-lines file
    Batch {
        /// Path to a file with one job object per line
        #[arg(value_name = "FILE")]
        jobs: String,
    },
}

type WorkerProcessor = Processor<PostgresCatalog, S3BlobStore, HttpFetcher, OpenRouterChecker>;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init_logging(&cli.log_file, cli.verbose)?;

    info!("Bourdain Image Worker v{}", env!("CARGO_PKG_VERSION"));
    info!("Loading configuration from: {}", cli.config);

    let config = match config::load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Process {
            card_id,
            url,
            source_id,
            source_name,
            trust_tier,
            card_number,
            set_code,
        } => {
            let job = ImageJob {
                card_id,
                source_url: url,
                source_id,
                source_name,
                trust_tier,
                card_number,
                set_code,
                priority: None,
            };
            run_single(config, job).await
        }
        Commands::Batch { jobs } => run_batch(config, &jobs).await,
    }
}

/// Process one job and print the structured result
async fn run_single(config: config::Config, job: ImageJob) -> Result<()> {
    let processor = initialize_processor(config).await?;

    let result = processor.process(job).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if result.status == ProcessStatus::Failed {
        process::exit(1);
    }
    Ok(())
}

/// Process a JSON-lines file of jobs sequentially
async fn run_batch(config: config::Config, path: &str) -> Result<()> {
    let processor = initialize_processor(config).await?;

    let contents = std::fs::read_to_string(path)
        .context(format!("Failed to read jobs file: {}", path))?;

    let mut processed = 0_usize;
    let mut failed = 0_usize;
    for (line_no, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let job: ImageJob = match serde_json::from_str(line) {
            Ok(job) => job,
            Err(e) => {
                error!("Skipping malformed job on line {}: {}", line_no + 1, e);
                failed += 1;
                continue;
            }
        };
        if job.card_id.is_empty() || job.source_url.is_empty() {
            error!(
                "Skipping job on line {}: cardId and sourceUrl are required",
                line_no + 1
            );
            failed += 1;
            continue;
        }

        let card_id = job.card_id.clone();
        let result = processor.process(job).await;
        info!("card {}: {}", card_id, serde_json::to_string(&result)?);

        processed += 1;
        if result.status == ProcessStatus::Failed {
            failed += 1;
        }
    }

    info!("Batch finished: {} processed, {} failed", processed, failed);
    Ok(())
}

async fn initialize_processor(config: config::Config) -> Result<WorkerProcessor> {
    let catalog = PostgresCatalog::new(&config.catalog.url, config.catalog.max_connections).await?;
    let blob_store = S3BlobStore::new(&config.blob).await?;
    let fetcher = HttpFetcher::new(Duration::from_secs(config.pipeline.fetch_timeout_secs))?;
    let vision = OpenRouterChecker::new(&config.vision);

    let rate_limiter = RateLimiter::new();
    rate_limiter.spawn_sweeper(Duration::from_secs(config.pipeline.bucket_gc_interval_secs));

    let processor = Processor::new(
        catalog,
        blob_store,
        fetcher,
        vision,
        rate_limiter,
        config.pipeline.clone(),
    );

    info!("Processor initialized successfully");
    Ok(processor)
}
