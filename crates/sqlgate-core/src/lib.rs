//! # sqlgate-core
//!
//! Configuration types shared by the sqlgate crates.
//!
//! The gate itself never owns configuration: it looks up the default
//! connection name and the per-connection table prefix on every request
//! through a [`SharedDatabaseConfig`] handle, so a reload is visible to the
//! next request without any cache invalidation.

// Configuration types shared across all sqlgate crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    ConfigError, ConnectionConfig, ConnectionPoolConfig, DatabaseConfig, GateConfig, McpConfig,
    SharedDatabaseConfig, SslMode, Transport,
};
