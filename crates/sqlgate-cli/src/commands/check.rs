//! `sqlgate check` command implementation.
//!
//! Runs a query through the same admission and rewriting steps as the
//! `database-query` tool, prints the outcome and never touches a database.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use sqlgate_guard::admit;
use std::path::PathBuf;

use super::load_config;

/// Arguments for `sqlgate check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// SQL to check.
    pub query: String,

    /// Table names to prefix (repeat the flag or separate with commas).
    #[arg(short, long, value_delimiter = ',')]
    pub tables: Vec<String>,

    /// Table prefix. Defaults to the prefix of the selected connection.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Connection whose prefix is used. Defaults to the configured default.
    #[arg(short, long)]
    pub database: Option<String>,

    /// Configuration file path.
    #[arg(short, long, default_value = "sqlgate.yaml", env = "SQLGATE_CONFIG")]
    pub config: PathBuf,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome of a check.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CheckReport {
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the check command. Returns whether the query was accepted.
pub fn execute(args: CheckArgs) -> Result<bool> {
    let prefix = match &args.prefix {
        Some(prefix) => prefix.clone(),
        None => {
            let config = load_config(&args.config)?;
            let connection = args.database.as_deref().unwrap_or(&config.database.default);
            config.database.prefix(connection).to_string()
        }
    };

    let report = check(&args.query, &args.tables, &prefix);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let (Some(keyword), Some(sql)) = (&report.keyword, &report.sql) {
        println!("ACCEPTED ({})", keyword);
        println!("{}", sql);
    } else {
        println!("REJECTED: {}", report.error.as_deref().unwrap_or_default());
    }

    Ok(report.accepted)
}

/// Classify and rewrite `query` the way the tool does.
pub fn check(query: &str, tables: &[String], prefix: &str) -> CheckReport {
    match admit(query) {
        Ok(admitted) => {
            let keyword = admitted.keyword().to_string();
            CheckReport {
                accepted: true,
                keyword: Some(keyword),
                sql: Some(admitted.with_table_prefix(tables, prefix).into_sql()),
                error: None,
            }
        }
        Err(rejection) => CheckReport {
            accepted: false,
            keyword: None,
            sql: None,
            error: Some(rejection.to_string()),
        },
    }
}
