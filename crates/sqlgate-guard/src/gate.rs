//! Admission of caller queries.
//!
//! [`admit`] trims the query, classifies it and hands back an
//! [`AdmittedQuery`] that can then be rewritten for the selected connection's
//! table prefix. A query can only be rewritten (and so executed) after it has
//! been admitted. [`QueryGate::prepare`] does both steps at once.

use crate::classifier::{Classification, ReadOnlyKeyword, classify};
use crate::error::Rejection;
use crate::rewriter::rewrite;

/// A query that passed read-only classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedQuery {
    sql: String,
    keyword: ReadOnlyKeyword,
}

impl AdmittedQuery {
    /// The leading keyword the query was admitted under.
    pub fn keyword(&self) -> ReadOnlyKeyword {
        self.keyword
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn into_sql(self) -> String {
        self.sql
    }

    /// Prefix the declared tables. A no-op when `prefix` or `tables` is empty.
    pub fn with_table_prefix<S: AsRef<str>>(mut self, tables: &[S], prefix: &str) -> Self {
        if prefix.is_empty() || tables.is_empty() {
            return self;
        }

        let rewritten = rewrite(&self.sql, tables, prefix);
        if rewritten != self.sql {
            tracing::debug!(
                prefix,
                tables = tables.len(),
                sql = %rewritten,
                "Prefixed table names"
            );
        }
        self.sql = rewritten;
        self
    }
}

/// Trim and classify `query`.
pub fn admit(query: &str) -> Result<AdmittedQuery, Rejection> {
    let sql = query.trim();

    match classify(sql) {
        Classification::Accepted(keyword) => Ok(AdmittedQuery {
            sql: sql.to_string(),
            keyword,
        }),
        Classification::Rejected(rejection) => {
            tracing::debug!(reason = ?rejection, "Query rejected");
            Err(rejection)
        }
    }
}

/// Admission and prefix rewriting in one call.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryGate;

impl QueryGate {
    /// Trim and classify `query`, then prefix the declared `tables` when
    /// `prefix` is non-empty. Returns the SQL to execute.
    pub fn prepare<S: AsRef<str>>(
        query: &str,
        tables: &[S],
        prefix: &str,
    ) -> Result<String, Rejection> {
        Ok(admit(query)?.with_table_prefix(tables, prefix).into_sql())
    }
}
