//! PostgreSQL + pgvector implementation of [`super::VectorStore`].

use async_trait::async_trait;
use pgvector::Vector as PgVector;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{StoredRow, VectorDbError, VectorStore};
use crate::config::Config;

/// Name of the table backing the vector store.
pub const TABLE_NAME: &str = "vector_db";

/// PostgreSQL-backed vector store, using the `pgvector` extension's `<=>`
/// cosine-distance operator for ordering.
#[derive(Clone)]
pub struct PostgresVectorStore {
    pool: PgPool,
    dimension: usize,
}

impl PostgresVectorStore {
    /// Opens a connection pool sized from `config`'s pool settings.
    pub async fn connect(config: &Config, dimension: usize) -> Result<Self, VectorDbError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_pool_size + config.db_max_overflow)
            .acquire_timeout(std::time::Duration::from_secs(config.db_pool_timeout_secs))
            .max_lifetime(std::time::Duration::from_secs(
                config.db_pool_recycle_secs,
            ))
            .connect(&config.sqlx_db_url())
            .await
            .map_err(|e| VectorDbError::Unavailable(e.to_string()))?;

        Ok(Self { pool, dimension })
    }

    /// Wraps an already-open pool (used by tests and the admin CLI).
    pub fn from_pool(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// The underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl VectorStore for PostgresVectorStore {
    async fn store(&self, vector: Vec<f32>, text: String) -> Result<StoredRow, VectorDbError> {
        if vector.len() != self.dimension {
            return Err(VectorDbError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let row: (i64,) = sqlx::query_as(&format!(
            "INSERT INTO {TABLE_NAME} (vector, text) VALUES ($1, $2) RETURNING id"
        ))
        .bind(PgVector::from(vector.clone()))
        .bind(&text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| VectorDbError::Unavailable(e.to_string()))?;

        Ok(StoredRow {
            id: row.0,
            vector,
            text,
        })
    }

    async fn find_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<String>, VectorDbError> {
        let rows: Vec<(String,)> = sqlx::query_as(&format!(
            "SELECT text FROM {TABLE_NAME} ORDER BY vector <=> $1 LIMIT $2"
        ))
        .bind(PgVector::from(query_vector.to_vec()))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| VectorDbError::Unavailable(e.to_string()))?;

        Ok(rows.into_iter().map(|(text,)| text).collect())
    }
}
