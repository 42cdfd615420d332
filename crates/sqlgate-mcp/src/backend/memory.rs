//! In-memory backend with canned results.

use super::{BackendError, QueryBackend, Row};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError, RwLock};

/// A statement that reached [`MemoryBackend::select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedQuery {
    pub connection: String,
    pub sql: String,
}

#[derive(Debug, Clone)]
struct MemoryConnection {
    prefix: String,
    outcome: Result<Vec<Row>, String>,
}

impl MemoryConnection {
    fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            outcome: Ok(Vec::new()),
        }
    }
}

/// Backend that answers every statement with preconfigured rows or an error
/// and records what it was asked to run.
///
/// ```
/// use serde_json::json;
/// use sqlgate_mcp::backend::{MemoryBackend, QueryBackend};
///
/// let backend = MemoryBackend::new("main")
///     .with_connection("main", "arpg_")
///     .with_rows("main", vec![json!({"id": 1}).as_object().unwrap().clone()]);
/// assert_eq!(backend.prefix("main"), "arpg_");
/// ```
#[derive(Debug)]
pub struct MemoryBackend {
    default_connection: String,
    connections: RwLock<HashMap<String, MemoryConnection>>,
    executed: Mutex<Vec<ExecutedQuery>>,
}

impl MemoryBackend {
    /// An empty backend whose default connection is `default_connection`.
    ///
    /// The default connection is not registered; add it with
    /// [`with_connection`](Self::with_connection).
    pub fn new(default_connection: impl Into<String>) -> Self {
        Self {
            default_connection: default_connection.into(),
            connections: RwLock::new(HashMap::new()),
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Register a connection with the given table prefix. It returns no rows
    /// until [`with_rows`](Self::with_rows) says otherwise.
    pub fn with_connection(self, name: &str, prefix: &str) -> Self {
        self.connections_mut()
            .insert(name.to_string(), MemoryConnection::new(prefix));
        self
    }

    /// Rows returned by every statement run on `name`. Registers the
    /// connection without a prefix if needed.
    pub fn with_rows(self, name: &str, rows: Vec<Row>) -> Self {
        self.connections_mut()
            .entry(name.to_string())
            .or_insert_with(|| MemoryConnection::new(""))
            .outcome = Ok(rows);
        self
    }

    /// Make every statement run on `name` fail with `message`.
    pub fn with_failure(self, name: &str, message: &str) -> Self {
        self.connections_mut()
            .entry(name.to_string())
            .or_insert_with(|| MemoryConnection::new(""))
            .outcome = Err(message.to_string());
        self
    }

    /// Change the prefix of a registered connection, as a configuration
    /// reload would.
    pub fn set_prefix(&self, name: &str, prefix: &str) {
        if let Some(connection) = self.connections_mut().get_mut(name) {
            connection.prefix = prefix.to_string();
        }
    }

    /// Every statement executed so far, oldest first.
    pub fn executed(&self) -> Vec<ExecutedQuery> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn connections_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, MemoryConnection>> {
        self.connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl QueryBackend for MemoryBackend {
    fn default_connection(&self) -> String {
        self.default_connection.clone()
    }

    fn prefix(&self, connection: &str) -> String {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(connection)
            .map(|c| c.prefix.clone())
            .unwrap_or_default()
    }

    async fn select(&self, connection: &str, sql: &str) -> Result<Vec<Row>, BackendError> {
        let outcome = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(connection)
            .map(|c| c.outcome.clone())
            .ok_or_else(|| BackendError::UnknownConnection(connection.to_string()))?;

        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ExecutedQuery {
                connection: connection.to_string(),
                sql: sql.to_string(),
            });

        outcome.map_err(BackendError::Failed)
    }
}
