//! DDL for the vector store table, shared between the admin CLI binaries.

use super::postgres::TABLE_NAME;

/// Extensions the table depends on, one statement per entry since sqlx
/// executes a single statement per call. Idempotent to run repeatedly.
pub const CREATE_EXTENSIONS_SQL: &[&str] = &[
    "CREATE EXTENSION IF NOT EXISTS vector",
    "CREATE EXTENSION IF NOT EXISTS pg_trgm",
];

/// `CREATE TABLE` statement for a store configured at `dimension`.
pub fn create_table_sql(dimension: usize) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (\n    id bigserial PRIMARY KEY,\n    vector vector({dimension}) NOT NULL,\n    text text NOT NULL\n)"
    )
}

/// `DROP TABLE` statement.
pub fn drop_table_sql() -> String {
    format!("DROP TABLE IF EXISTS {TABLE_NAME}")
}
