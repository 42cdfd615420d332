//! The `database-query` tool.
//!
//! Every call goes through the same steps: parse arguments, pick the
//! connection, admit and rewrite the query, execute it. Failures at any step
//! are returned as tool results flagged `isError`, never as protocol errors.

use crate::backend::QueryBackend;
use crate::protocol::{CallToolResponse, ToolAnnotations, ToolDefinition};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlgate_guard::QueryGate;
use std::sync::Arc;

/// Name the tool is registered under.
pub const TOOL_NAME: &str = "database-query";

/// Arguments accepted by the tool.
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseQueryArgs {
    /// Missing is treated like blank.
    #[serde(default)]
    pub query: Option<String>,

    /// Connection name; the backend default when absent or empty.
    #[serde(default)]
    pub database: Option<String>,

    /// Bare table names to prefix.
    #[serde(default)]
    pub tables: Option<Vec<String>>,
}

/// Executes read-only SQL against a [`QueryBackend`].
#[derive(Clone)]
pub struct DatabaseQueryTool {
    backend: Arc<dyn QueryBackend>,
}

impl DatabaseQueryTool {
    pub fn new(backend: Arc<dyn QueryBackend>) -> Self {
        Self { backend }
    }

    /// The definition advertised by `tools/list`.
    pub fn definition() -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: Some(
                "Execute a read-only SQL query against the configured database.".to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The SQL query to execute. Only read-only queries are allowed (i.e. SELECT, SHOW, EXPLAIN, DESCRIBE)."
                    },
                    "database": {
                        "type": "string",
                        "description": "Optional database connection name to use. Defaults to the default connection."
                    },
                    "tables": {
                        "type": "array",
                        "items": {
                            "type": "string",
                            "description": "Table name to prefix (without the prefix, case-sensitive)"
                        },
                        "description": "Array of table names in the query that should be prefixed. These tables will have the database prefix added automatically. Only works when a database prefix is configured. Table names should be provided without the prefix."
                    }
                },
                "required": ["query"]
            }),
            annotations: Some(ToolAnnotations {
                title: Some("Database Query".to_string()),
                read_only_hint: Some(true),
                destructive_hint: Some(false),
            }),
        }
    }

    /// Handle a `tools/call` for this tool.
    pub async fn call(&self, arguments: Value) -> CallToolResponse {
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };

        let args: DatabaseQueryArgs = match serde_json::from_value(arguments) {
            Ok(args) => args,
            Err(e) => return CallToolResponse::error(format!("Invalid arguments: {}", e)),
        };

        let connection = args
            .database
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.backend.default_connection());
        let tables = args.tables.unwrap_or_default();
        let prefix = self.backend.prefix(&connection);

        let sql = match QueryGate::prepare(args.query.as_deref().unwrap_or(""), &tables, &prefix)
        {
            Ok(sql) => sql,
            Err(rejection) => return CallToolResponse::error(rejection.to_string()),
        };

        tracing::info!(connection = %connection, "Executing read-only query");
        tracing::debug!(sql = %sql, "Query text");

        match self.backend.select(&connection, &sql).await {
            Ok(rows) => {
                tracing::debug!(connection = %connection, rows = rows.len(), "Query succeeded");
                CallToolResponse::text(serde_json::to_string_pretty(&rows).unwrap_or_default())
            }
            Err(e) => {
                tracing::warn!(connection = %connection, error = %e, "Query failed");
                CallToolResponse::error(format!("Query failed: {}", e))
            }
        }
    }
}
