use crate::{
    conn::PostgresConnectionPinger, env::EnvManager, error::CliError, input::BatchFile,
};
use clap::Parser;
use commands::Commands;
use connectors::sql::postgres::adapter::PgAdapter;
use engine_core::upsert::{Upserter, prepare};
use planner::query::builder::upsert::UpsertStatementBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod conn;
mod env;
mod error;
mod input;
mod output;

#[derive(Parser)]
#[command(
    name = "pgupsert",
    version = "0.1.0",
    about = "Conflict-resolving bulk upserts for PostgreSQL"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Initialize logger
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            batch,
            url,
            env_file,
            output,
        } => {
            let env = EnvManager::with_env_file(env_file.as_deref())?;
            let url = env.database_url(url)?;
            let (target, batch) = BatchFile::load(&batch).await?.into_parts();

            info!(table = %target.table, rows = batch.len(), "Running upsert batch");
            let adapter = PgAdapter::connect(&url).await?;
            let result = Upserter::new(adapter, target).execute(batch).await?;

            output::write_json(&output::result_json(&result), output).await?;
        }
        Commands::Render { batch } => {
            let (target, batch) = BatchFile::load(&batch).await?.into_parts();
            let statement = prepare(&UpsertStatementBuilder::new(target), &batch)?;
            output::write_json(&output::statement_json(&statement), None).await?;
        }
        Commands::TestConn { url, env_file } => {
            let env = EnvManager::with_env_file(env_file.as_deref())?;
            let url = env.database_url(url)?;
            PostgresConnectionPinger { url }.ping().await?;
        }
    }

    Ok(())
}
