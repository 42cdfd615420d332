//! `sqlgate serve` command implementation.

use anyhow::{Context, Result};
use clap::Args;
use sqlgate_core::{GateConfig, SharedDatabaseConfig, Transport};
use sqlgate_mcp::{McpServer, PgBackend};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};
use tracing::{info, warn};

use super::load_config;

/// Arguments for `sqlgate serve`.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "sqlgate.yaml", env = "SQLGATE_CONFIG")]
    pub config: PathBuf,

    /// Transport type (stdio or http). Overrides config file.
    #[arg(long, env = "SQLGATE_TRANSPORT")]
    pub transport: Option<Transport>,

    /// HTTP host (only for http transport). Overrides config file.
    #[arg(long)]
    pub host: Option<String>,

    /// HTTP port (only for http transport). Overrides config file.
    #[arg(long)]
    pub port: Option<u16>,
}

/// Execute the serve command.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    apply_overrides(&mut config, &args);

    if config.database.connections.is_empty() {
        warn!("No database connections configured; every query will fail");
    }

    let database = config.shared_database();

    #[cfg(unix)]
    reload_on_hangup(args.config.clone(), database.clone())?;

    info!(
        transport = ?config.mcp.transport,
        address = %config.mcp.bind_address(),
        default_connection = %config.database.default,
        connections = config.database.connections.len(),
        "Starting sqlgate MCP server"
    );

    let backend = PgBackend::new(database);
    McpServer::new(config.mcp, Arc::new(backend))
        .run()
        .await
        .context("MCP server failed")
}

/// Command line flags win over the config file.
fn apply_overrides(config: &mut GateConfig, args: &ServeArgs) {
    if let Some(transport) = args.transport {
        config.mcp.transport = transport;
    }
    if let Some(host) = &args.host {
        config.mcp.host = host.clone();
    }
    if let Some(port) = args.port {
        config.mcp.port = port;
    }
}

/// Re-read the database section of the config file on every SIGHUP.
#[cfg(unix)]
fn reload_on_hangup(path: PathBuf, database: SharedDatabaseConfig) -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            reload_database_config(&path, &database);
        }
    });

    Ok(())
}

/// Swap in the database section from `path`. A file that fails to load or
/// validate leaves the current configuration in place.
#[cfg_attr(not(unix), allow(dead_code))]
fn reload_database_config(path: &Path, database: &SharedDatabaseConfig) -> bool {
    match GateConfig::from_file(path) {
        Ok(config) => {
            let connections = config.database.connections.len();
            *database.write().unwrap_or_else(PoisonError::into_inner) = config.database;
            info!(config = %path.display(), connections, "Reloaded database configuration");
            true
        }
        Err(e) => {
            warn!(config = %path.display(), error = %e, "Reload failed, keeping previous database configuration");
            false
        }
    }
}
