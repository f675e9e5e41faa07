//! Pagescope command-line interface
//!
//! Each subcommand maps onto one Dispatcher operation.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pagescope::config::{load_config_with_hash, Config};
use pagescope::dispatch::{ExportFile, ExportFormat};
use pagescope::render::ChromeRenderer;
use pagescope::store::DEFAULT_LIST_LIMIT;
use pagescope::{Dispatcher, JobStore, SqliteJobStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Pagescope: render a page and extract a structured profile of it
///
/// Jobs are stored in a SQLite database so results can be listed,
/// inspected, exported or re-run later.
#[derive(Parser, Debug)]
#[command(name = "pagescope")]
#[command(version)]
#[command(about = "Render a page and extract a structured profile of it", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a URL and wait for the job to finish
    Scrape {
        url: String,

        /// CSS selector whose matches are captured separately
        #[arg(short, long)]
        selector: Option<String>,
    },

    /// List recent jobs, newest first
    Jobs {
        #[arg(short, long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,
    },

    /// Show one job with its stored payload
    Show { id: i64 },

    /// Delete a job
    Delete { id: i64 },

    /// Scrape the URL of an existing job again as a new job
    Rescrape { id: i64 },

    /// Export a job's payload to a file
    Export {
        id: i64,

        /// json or csv
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Output path (defaults to scrape_<id>.<format>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download one image of a job (zero-based index)
    Image {
        id: i64,
        index: usize,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download every image of a job into a ZIP archive
    Images {
        id: i64,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(cli.config.as_deref())?;

    let store: Arc<dyn JobStore> = Arc::new(
        SqliteJobStore::new(Path::new(&config.storage.database_path)).with_context(|| {
            format!("Failed to open job store at {}", config.storage.database_path)
        })?,
    );
    let renderer = Arc::new(ChromeRenderer::new(config.browser.clone()));
    let dispatcher = Dispatcher::new(store, renderer, &config)?;

    let outcome = run_command(&dispatcher, cli.command).await;

    // Drain the pool even when the command failed so no run is cut short
    dispatcher.shutdown().await;
    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagescope=info,warn"),
            1 => EnvFilter::new("pagescope=debug,info"),
            2 => EnvFilter::new("pagescope=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_configuration(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

async fn run_command(dispatcher: &Dispatcher, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Scrape { url, selector } => {
            let id = dispatcher.trigger_scrape(&url, selector.as_deref())?;
            println!("Queued job {}", id);
            await_job(dispatcher, id).await
        }

        Command::Jobs { limit } => {
            let jobs = dispatcher.list_jobs(limit)?;
            if jobs.is_empty() {
                println!("No jobs yet");
            }
            for job in jobs {
                println!(
                    "{:>6}  {:<9}  {}  {}{}",
                    job.id,
                    job.status,
                    job.created_at,
                    job.url,
                    if job.has_data { "" } else { "  (no data)" }
                );
            }
            Ok(())
        }

        Command::Show { id } => {
            let job = dispatcher.get_job(id)?;
            println!("Job {}", job.id);
            println!("  URL:     {}", job.url);
            println!("  Status:  {}", job.status);
            println!("  Created: {}", job.created_at);

            if let Some(data) = job.data.as_deref() {
                let pretty = serde_json::from_str::<serde_json::Value>(data)
                    .and_then(|value| serde_json::to_string_pretty(&value))
                    .unwrap_or_else(|_| data.to_string());
                println!("{}", pretty);
            }
            Ok(())
        }

        Command::Delete { id } => {
            dispatcher.delete_job(id)?;
            println!("Deleted job {}", id);
            Ok(())
        }

        Command::Rescrape { id } => {
            let new_id = dispatcher.rescrape(id)?;
            println!("Queued job {} (re-scrape of {})", new_id, id);
            await_job(dispatcher, new_id).await
        }

        Command::Export { id, format, output } => {
            let file = dispatcher.export(id, format)?;
            write_file(&file, output)
        }

        Command::Image { id, index, output } => {
            let image = dispatcher.fetch_image(id, index).await?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(format!("scrape_{}_image_{:03}.{}", id, index + 1, image.extension()))
            });
            std::fs::write(&path, &image.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Saved {} ({}, {} bytes) to {}",
                image.url,
                image.content_type,
                image.bytes.len(),
                path.display()
            );
            Ok(())
        }

        Command::Images { id, output } => {
            let file = dispatcher.download_all_images(id).await?;
            write_file(&file, output)
        }
    }
}

/// Waits for the pool to finish the job, then reports its final status
async fn await_job(dispatcher: &Dispatcher, id: i64) -> anyhow::Result<()> {
    dispatcher.shutdown().await;

    let job = dispatcher.get_job(id)?;
    println!("Job {} {}", id, job.status);
    if let Some(summary) = job.data.as_deref().and_then(error_summary) {
        println!("  {}", summary);
    }
    Ok(())
}

/// `error_type: error` line for a failed job's payload
fn error_summary(data: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    let error = value.get("error")?.as_str()?;
    let error_type = value.get("error_type").and_then(|t| t.as_str()).unwrap_or("Error");
    Some(format!("{}: {}", error_type, error))
}

fn write_file(file: &ExportFile, output: Option<PathBuf>) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(&file.filename));
    std::fs::write(&path, &file.body)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!(
        "Wrote {} ({}, {} bytes)",
        path.display(),
        file.content_type,
        file.body.len()
    );
    Ok(())
}
