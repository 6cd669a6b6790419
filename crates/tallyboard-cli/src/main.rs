//! Tallyboard CLI - preview and apply column formulas on a work board

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tallyboard::prelude::*;
use tallyboard::{FetchProgress, FetchStage, ProcessingProgress};
use tracing_subscriber::EnvFilter;

type Client = BoardClient<HttpTransport>;

#[derive(Parser)]
#[command(name = "tally")]
#[command(
    author,
    version,
    about = "Preview and apply column formulas across a work board"
)]
struct Cli {
    #[command(flatten)]
    remote: RemoteArgs,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RemoteArgs {
    /// API token for the board service
    #[arg(long, env = "TALLYBOARD_API_TOKEN", hide_env_values = true)]
    token: String,

    /// Source board id
    #[arg(long, env = "TALLYBOARD_BOARD_ID")]
    board: String,

    /// GraphQL endpoint (default: monday.com v2 API)
    #[arg(long, env = "TALLYBOARD_ENDPOINT")]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,
}

impl RemoteArgs {
    fn client(&self) -> Result<Client> {
        let credentials =
            Credentials::new(&self.token, &self.board).context("Invalid credentials")?;

        let mut config = RemoteConfig::default().with_timeout(Duration::from_secs(self.timeout));
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }

        Ok(BoardClient::new(HttpTransport::new(&config), credentials))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the board's columns
    Columns,

    /// Evaluate a formula against one record without writing
    Preview {
        /// Formula file (JSON token array)
        formula: PathBuf,

        /// Record id to preview against (default: first item)
        #[arg(short, long)]
        item: Option<String>,
    },

    /// Evaluate a formula for every record and write the results
    Apply {
        /// Formula file (JSON token array)
        formula: PathBuf,

        /// Target column, by id or title
        #[arg(short, long)]
        target: String,

        /// Evaluate and report without writing
        #[arg(long)]
        dry_run: bool,

        /// Only process top-level items
        #[arg(long)]
        no_subitems: bool,

        /// Number of example results in the report
        #[arg(long, default_value = "5")]
        examples: usize,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let client = cli.remote.client()?;

    match cli.command {
        Commands::Columns => list_columns(&client).await,
        Commands::Preview { formula, item } => {
            preview_formula(&client, &formula, item.as_deref()).await
        }
        Commands::Apply {
            formula,
            target,
            dry_run,
            no_subitems,
            examples,
            json,
        } => {
            let options = ProcessingOptions {
                example_limit: examples,
                dry_run,
            };
            apply_formula(&client, &formula, &target, !no_subitems, options, json).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

fn load_formula(path: &Path) -> Result<Formula> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    let formula: Formula = serde_json::from_str(&text)
        .with_context(|| format!("'{}' is not a formula token array", path.display()))?;
    if formula.is_empty() {
        bail!("Formula in '{}' has no tokens", path.display());
    }
    Ok(formula)
}

async fn list_columns(client: &Client) -> Result<()> {
    let columns = client
        .columns()
        .await
        .context("Failed to list board columns")?;

    for column in columns {
        println!("{}\t{}\t{}", column.id, column.title, column.kind);
    }
    Ok(())
}

fn resolve_target(columns: &[TargetColumn], wanted: &str) -> Result<TargetColumn> {
    columns
        .iter()
        .find(|c| c.id == wanted)
        .or_else(|| columns.iter().find(|c| c.title.eq_ignore_ascii_case(wanted)))
        .cloned()
        .with_context(|| format!("No column with id or title '{}' on this board", wanted))
}

/// Fetch the board's records, keeping whatever arrived before a failure.
async fn fetch_records(client: &Client, include_subitems: bool) -> Result<Vec<Record>> {
    let fetcher = RecordFetcher::new(client);
    let outcome = if include_subitems {
        fetcher.fetch_board(report_fetch_progress).await
    } else {
        fetcher.fetch_all_records(report_fetch_progress).await
    };
    eprintln!();

    match outcome.error {
        Some(e) if outcome.records.is_empty() => {
            Err(e).context("Failed to fetch board records")
        }
        Some(e) => {
            tracing::warn!(
                records = outcome.records.len(),
                "fetch stopped early ({}); continuing with the records received",
                e
            );
            Ok(outcome.records)
        }
        None => Ok(outcome.records),
    }
}

async fn preview_formula(client: &Client, path: &Path, item: Option<&str>) -> Result<()> {
    let formula = load_formula(path)?;

    let record = match item {
        Some(id) => fetch_records(client, true)
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .with_context(|| format!("Record {} not found on the board", id))?,
        None => client
            .items_page(None, 1)
            .await
            .context("Failed to fetch a sample record")?
            .items
            .into_iter()
            .next()
            .context("The board has no records")?,
    };

    println!("{}", preview(&formula, &record));
    Ok(())
}

async fn apply_formula(
    client: &Client,
    path: &Path,
    target: &str,
    include_subitems: bool,
    options: ProcessingOptions,
    json: bool,
) -> Result<()> {
    let formula = load_formula(path)?;

    let columns = client
        .columns()
        .await
        .context("Failed to list board columns")?;
    let target = resolve_target(&columns, target)?;

    let records = fetch_records(client, include_subitems).await?;
    eprintln!("Applying \"{}\" to {} records -> {}", formula, records.len(), target);

    let cancel = CancellationFlag::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nCancelling after the current record...");
            on_interrupt.cancel();
        }
    });

    let processor = BatchProcessor::with_options(client, options);
    let summary = processor
        .process_board_with_cancel(&records, &formula, &target, report_progress, || {
            cancel.is_cancelled()
        })
        .await;
    eprintln!();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
        );
    } else {
        println!("{}", summary);
    }
    Ok(())
}

fn report_progress(p: ProcessingProgress) {
    eprint!(
        "\rProcessed {}/{} ({} ok, {} failed, {} skipped)",
        p.processed, p.total, p.success, p.failure, p.skipped
    );
}

fn report_fetch_progress(p: FetchProgress) {
    eprint!("\r{}", fetch_progress_line(p));
}

fn fetch_progress_line(p: FetchProgress) -> String {
    match (p.stage, p.total_batches) {
        (FetchStage::Items, _) => format!("Fetched {} items ({} pages)", p.fetched, p.batches),
        (FetchStage::Subitems, Some(total)) => {
            format!("Fetched {} sub-items (chunk {}/{})", p.fetched, p.batches, total)
        }
        (FetchStage::Subitems, None) => {
            format!("Fetched {} sub-items (chunk {})", p.fetched, p.batches)
        }
    }
}
