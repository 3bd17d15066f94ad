use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};

use job_ingest::apis::jsearch::JSearchClient;
use job_ingest::config::Config;
use job_ingest::db::SqliteStore;
use job_ingest::logging;
use job_ingest::pipeline::{BatchReport, Pipeline, RecordOutcome};
use job_ingest::server;
use job_ingest::storage::JobStore;

#[derive(Parser)]
#[command(name = "job_ingest")]
#[command(about = "Job-listing ingestion pipeline and query service")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch job listings from the upstream source and ingest one batch
    Ingest {
        /// Override the search query from config.toml
        #[arg(long)]
        query: Option<String>,
    },
    /// Serve stored listings over HTTP
    Serve {
        /// Port to bind the read-side service on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// Ingest one batch, then serve stored listings
    Run {
        /// Override the search query from config.toml
        #[arg(long)]
        query: Option<String>,

        /// Port to bind the read-side service on
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
}

fn print_report(report: &BatchReport) {
    println!("\nBatch report (run {}):", report.run_id);
    println!("   Total records:      {}", report.total_records);
    println!("   Inserted:           {}", report.inserted);
    println!("   Skipped (invalid):  {}", report.skipped_invalid);
    println!("   Skipped (duplicate): {}", report.skipped_duplicate);

    for outcome in &report.outcomes {
        if let RecordOutcome::SkippedInvalid { index, reason } = outcome {
            println!("   - record {index}: {reason}");
        }
    }
}

async fn run_ingest(
    config: &Config,
    query: Option<String>,
    store: Arc<dyn JobStore>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut source_config = config.source.clone();
    if let Some(query) = query {
        source_config.query = query;
    }

    let api_key = Config::api_key()?;
    let client = JSearchClient::new(&source_config, api_key);

    match Pipeline::run_for_source(&client, store).await {
        Ok(report) => {
            info!("Ingestion batch finished");
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            error!("Ingestion batch failed: {}", e);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;

    let store: Arc<dyn JobStore> = Arc::new(SqliteStore::open(&config.database.path)?);

    match cli.command {
        Commands::Ingest { query } => {
            println!("Running ingestion batch...");
            run_ingest(&config, query, store).await?;
        }
        Commands::Serve { port } => {
            println!("Starting read-side query service...");
            server::start_server(store, port).await?;
        }
        Commands::Run { query, port } => {
            println!("Running ingestion batch, then serving...");
            run_ingest(&config, query, store.clone()).await?;
            server::start_server(store, port).await?;
        }
    }
    Ok(())
}
