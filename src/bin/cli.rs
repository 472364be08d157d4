//! wikigram CLI
//!
//! Batch pipeline entry point: crawl a corpus, build the n-gram model,
//! and generate text.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::watch;

use wikigram::{
    error::Result,
    models::{Config, Normalization},
    pipeline,
    services::HttpFetcher,
    storage::{CheckpointStore, LocalCheckpoint},
};

/// wikigram - link crawler and n-gram text generator
#[derive(Parser, Debug)]
#[command(
    name = "wikigram",
    version,
    about = "Crawls outbound links from a seed page and generates text from an n-gram model"
)]
struct Cli {
    /// Path to storage directory containing config and checkpoint files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the seed page's outbound links into a corpus checkpoint
    Crawl {
        /// Ignore any existing checkpoint and recrawl from scratch
        #[arg(long)]
        fresh: bool,
    },

    /// Generate text from the checkpointed corpus
    Generate {
        /// Maximum number of generated words
        #[arg(long)]
        max_length: Option<usize>,

        /// N-gram width (>= 2)
        #[arg(long)]
        width: Option<usize>,

        /// Normalization scheme: unique_count or standard_score
        #[arg(long)]
        normalization: Option<Normalization>,

        /// Seed for the start-selection RNG, for reproducible runs
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Run full pipeline: Crawl (or resume) then Generate
    Pipeline {
        /// Ignore any existing checkpoint and recrawl from scratch
        #[arg(long)]
        fresh: bool,

        /// Seed for the start-selection RNG, for reproducible runs
        #[arg(long)]
        rng_seed: Option<u64>,
    },

    /// Validate the configuration file
    Validate,

    /// Show checkpoint info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Install a Ctrl-C handler that flips the cancellation flag, letting
/// the crawl write its final checkpoint before exit.
fn install_cancel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received; finishing with a final checkpoint...");
            let _ = tx.send(true);
        }
    });
    rx
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn report(generation: &pipeline::Generation) {
    log::info!(
        "Generated {} words ({:?})",
        generation.words.len(),
        generation.stop_reason
    );
    println!("{}", generation.text());
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    let store = LocalCheckpoint::new(cli.storage_dir.join("corpus.json"));

    match cli.command {
        Command::Crawl { fresh } => {
            config.validate()?;
            let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
            let cancel = install_cancel();
            let corpus =
                pipeline::acquire_corpus(&config, &store, fetcher, cancel, fresh).await?;
            log::info!(
                "Corpus ready: {} documents, {} tokens",
                corpus.len(),
                corpus.token_count()
            );
        }

        Command::Generate {
            max_length,
            width,
            normalization,
            rng_seed,
        } => {
            if let Some(max_length) = max_length {
                config.generation.max_length = max_length;
            }
            if let Some(width) = width {
                config.model.width = width;
            }
            if let Some(normalization) = normalization {
                config.model.normalization = normalization;
            }
            config.validate()?;

            let corpus = store.load().await.map_err(|e| {
                log::error!("Could not load corpus; run 'wikigram crawl' first");
                e
            })?;
            let mut rng = make_rng(rng_seed);
            let generation = pipeline::run_generation(&corpus, &config, &mut rng)?;
            report(&generation);
        }

        Command::Pipeline { fresh, rng_seed } => {
            config.validate()?;
            let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
            let cancel = install_cancel();
            let corpus =
                pipeline::acquire_corpus(&config, &store, fetcher, cancel, fresh).await?;
            let mut rng = make_rng(rng_seed);
            let generation = pipeline::run_generation(&corpus, &config, &mut rng)?;
            report(&generation);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("Config OK");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());
            if store.exists().await {
                match store.load().await {
                    Ok(corpus) => log::info!(
                        "Checkpoint: {} documents, {} tokens",
                        corpus.len(),
                        corpus.token_count()
                    ),
                    Err(e) => log::warn!("Checkpoint present but unreadable: {e}"),
                }
            } else {
                log::info!("No checkpoint found yet.");
            }
        }
    }

    Ok(())
}
