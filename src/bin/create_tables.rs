//! Administrative script: bootstraps the `pgvector`/`pg_trgm` extensions and
//! the vector store table. Safe to run repeatedly — every statement is
//! idempotent.

use std::time::Duration;

use clap::Parser;
use retrieval_middleware::config::Config;
use retrieval_middleware::constants::DEFAULT_EMBEDDING_DIM;
use retrieval_middleware::vectordb::{CREATE_EXTENSIONS_SQL, create_table_sql};
use sqlx::Executor;
use sqlx::postgres::PgPoolOptions;

const WARNING_DELAY: Duration = Duration::from_secs(4);

/// Bootstraps the `pgvector`/`pg_trgm` extensions and the vector store table.
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
    println!("about to create the vector store schema. ctrl-C now to abort.");
    if !args.yes {
        tokio::time::sleep(WARNING_DELAY).await;
    }

    let config = Config::from_env()?;
    let pool = PgPoolOptions::new()
        .max_connections(config.db_pool_size)
        .connect(&config.sqlx_db_url())
        .await?;

    for statement in CREATE_EXTENSIONS_SQL {
        pool.execute(*statement).await?;
    }
    pool.execute(create_table_sql(DEFAULT_EMBEDDING_DIM).as_str())
        .await?;

    println!("schema created.");
    Ok(())
}
