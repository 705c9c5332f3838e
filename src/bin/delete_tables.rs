//! Administrative script: drops the vector store table. Destructive —
//! prints a warning and waits before acting.

use std::time::Duration;

use clap::Parser;
use retrieval_middleware::config::Config;
use retrieval_middleware::vectordb::drop_table_sql;
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;

const WARNING_DELAY: Duration = Duration::from_secs(5);

/// Drops the vector store table. Destructive.
#[derive(Parser)]
struct Args {
    /// Skip the warning delay (for scripted/CI use).
    #[arg(short, long)]
    yes: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    println!("WARNING: this will drop the vector store table and all rows in it.");
    println!("ctrl-C now to abort.");
    if !args.yes {
        tokio::time::sleep(WARNING_DELAY).await;
    }

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_size)
        .connect(&config.sqlx_db_url())
        .await?;

    pool.execute(drop_table_sql().as_str()).await?;

    println!("table dropped.");
    Ok(())
}
