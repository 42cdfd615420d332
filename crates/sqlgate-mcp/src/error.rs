//! Error types for the MCP crate.

use thiserror::Error;

/// Errors that stop the MCP server itself.
///
/// Problems with individual requests never surface here: they are answered
/// with JSON-RPC errors or tool results flagged `isError`.
#[derive(Debug, Error)]
pub enum McpError {
    /// Failed to start the server.
    #[error("failed to start MCP server: {0}")]
    StartupFailed(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
