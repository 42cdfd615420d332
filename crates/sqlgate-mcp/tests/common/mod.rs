//! Shared fixtures for the tool tests.

#![allow(dead_code)]

use serde_json::{Value, json};
use sqlgate_mcp::{CallToolResponse, DatabaseQueryTool, MemoryBackend, Row};
use std::sync::Arc;

/// A tool wired to an in-memory backend, plus the backend for inspection.
pub struct TestContext {
    pub backend: Arc<MemoryBackend>,
    pub tool: DatabaseQueryTool,
}

impl TestContext {
    pub fn new(backend: MemoryBackend) -> Self {
        let backend = Arc::new(backend);
        Self {
            tool: DatabaseQueryTool::new(backend.clone()),
            backend,
        }
    }

    /// Default connection `mysql` with the given prefix.
    pub fn with_prefix(prefix: &str) -> Self {
        Self::new(MemoryBackend::new("mysql").with_connection("mysql", prefix))
    }

    pub async fn call(&self, arguments: Value) -> CallToolResponse {
        self.tool.call(arguments).await
    }

    /// Call with `query` and `tables`, assert success and return the SQL
    /// that reached the backend.
    pub async fn executed_sql(&self, query: &str, tables: &[&str]) -> String {
        let response = self.call(json!({"query": query, "tables": tables})).await;
        assert_success(&response);
        self.last_sql()
    }

    pub fn last_sql(&self) -> String {
        self.backend
            .executed()
            .last()
            .map(|q| q.sql.clone())
            .unwrap_or_default()
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

pub fn assert_success(response: &CallToolResponse) {
    assert!(
        !response.is_error,
        "expected success, got: {:?}",
        response.first_text()
    );
}

pub fn assert_error_contains(response: &CallToolResponse, needle: &str) {
    assert!(response.is_error, "expected an error result");
    let text = response.first_text().unwrap_or_default();
    assert!(text.contains(needle), "{:?} does not contain {:?}", text, needle);
}
