//! Configuration types for sqlgate.
//!
//! Configuration is loaded from a single YAML file (`sqlgate.yaml` by
//! default) with two sections:
//!
//! - **database**: the default connection name and the named connections,
//!   each with its own table prefix
//! - **mcp**: transport settings for the MCP server
//!
//! ```yaml
//! database:
//!   default: pgsql
//!   connections:
//!     pgsql:
//!       database_url_env: DATABASE_URL
//!       prefix: arpg_
//! mcp:
//!   transport: stdio
//! ```

pub mod database;
pub mod mcp;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::{Arc, RwLock};

pub use database::{ConnectionConfig, ConnectionPoolConfig, DatabaseConfig, SslMode};
pub use mcp::{McpConfig, Transport};

/// Database configuration shared between the config loader and the request
/// path. Readers take the lock per request and never hold it across an await.
pub type SharedDatabaseConfig = Arc<RwLock<DatabaseConfig>>;

/// Complete sqlgate configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GateConfig {
    /// Named database connections.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// MCP server configuration.
    #[serde(default)]
    pub mcp: McpConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GateConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()
    }

    /// Wrap the database section in a shared handle for the request path.
    pub fn shared_database(&self) -> SharedDatabaseConfig {
        Arc::new(RwLock::new(self.database.clone()))
    }
}
