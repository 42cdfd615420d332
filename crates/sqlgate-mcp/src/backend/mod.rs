//! Query execution backends.
//!
//! The tool handler only needs three things from a database layer: the name
//! of the default connection, the table prefix configured for a connection,
//! and a way to run an admitted statement and get rows back. [`QueryBackend`]
//! captures exactly that so the handler can be driven by Postgres in
//! production and by [`MemoryBackend`] in tests.

mod memory;
mod postgres;

pub use memory::{ExecutedQuery, MemoryBackend};
pub use postgres::PgBackend;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

/// One result row, keyed by column name in select-list order.
pub type Row = Map<String, Value>;

/// Errors raised while executing an admitted statement.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Database connection [{0}] not configured.")]
    UnknownConnection(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("Column `{column}` has unsupported type {type_name}; cast it to text.")]
    UnsupportedType { column: String, type_name: String },

    #[error("{0}")]
    Failed(String),
}

/// A source of connections that can run read-only statements.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// Connection used when the caller does not name one.
    fn default_connection(&self) -> String;

    /// Table prefix for `connection`, empty when none is configured or the
    /// connection is unknown.
    fn prefix(&self, connection: &str) -> String;

    /// Run `sql` on `connection` and return every row.
    async fn select(&self, connection: &str, sql: &str) -> Result<Vec<Row>, BackendError>;
}
