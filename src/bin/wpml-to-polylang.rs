//! # WPML to Polylang migration
//!
//! Command-line entry point: run a migration against a WordPress database,
//! inspect the persisted status, or reset it.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use wpml_to_polylang::config::MigrationConfig;
use wpml_to_polylang::database::{
    DatabaseConnection, SqlxSourceStore, SqlxStatusStore, SqlxTargetStore,
};
use wpml_to_polylang::logging::init_structured_logging;
use wpml_to_polylang::migration::{MigrationRunner, MigrationScheduler, RunOutcome};
use wpml_to_polylang::status::StatusStore;

#[derive(Parser)]
#[command(name = "wpml-to-polylang")]
#[command(about = "Migrate WPML translation metadata to Polylang")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Configuration file (default: ./w2p.{toml,yaml,json} when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the migration
    Migrate {
        /// Schedule the run as a background job and wait for it
        #[arg(long)]
        background: bool,

        /// Rows fetched per page
        #[arg(long)]
        batch_size: Option<u32>,

        /// Execution budget in seconds
        #[arg(long)]
        time_budget: Option<u64>,
    },

    /// Print the persisted migration status
    Status,

    /// Delete the persisted migration status
    Reset,
}

#[tokio::main]
async fn main() {
    init_structured_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "wpml-to-polylang failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = MigrationConfig::load_from(cli.config.as_deref())
        .context("failed to load configuration")?;

    if let Commands::Migrate {
        batch_size,
        time_budget,
        ..
    } = &cli.command
    {
        if let Some(batch_size) = batch_size {
            config = config.with_batch_size(*batch_size);
        }
        if let Some(secs) = time_budget {
            config = config.with_time_budget(*secs);
        }
        config.validate().context("invalid command line overrides")?;
    }

    let db = DatabaseConnection::connect(&config)
        .await
        .context("failed to connect to the WordPress database")?;
    let pool = db.pool().clone();
    let status_store = Arc::new(SqlxStatusStore::new(pool.clone(), &config.table_prefix));

    match cli.command {
        Commands::Migrate { background, .. } => {
            let runner = MigrationRunner::new(
                config.clone(),
                Arc::new(SqlxSourceStore::new(pool.clone(), &config.table_prefix)),
                Arc::new(SqlxTargetStore::new(pool.clone(), &config.table_prefix)),
                status_store.clone(),
            );
            let scheduler = MigrationScheduler::new(runner);

            if background {
                scheduler.schedule().await?;
                scheduler.wait().await?;
            } else {
                match scheduler.run_interactive().await? {
                    RunOutcome::Completed => info!("Migration completed"),
                    RunOutcome::Interrupted { stage } => {
                        info!(stage = %stage, "Migration interrupted, run it again to resume")
                    }
                }
            }
            print_status(status_store.as_ref()).await?;
        }
        Commands::Status => print_status(status_store.as_ref()).await?,
        Commands::Reset => {
            status_store.clear().await?;
            println!("Migration status cleared");
        }
    }

    db.close().await;
    Ok(())
}

async fn print_status(store: &dyn StatusStore) -> Result<()> {
    match store.read().await? {
        Some(record) => {
            println!("{}", record.to_json()?);
            println!("{}", record.message());
        }
        None => println!("No migration has been run"),
    }
    Ok(())
}
