//! # sqlgate-mcp
//!
//! MCP (Model Context Protocol) server exposing a single read-only
//! `database-query` tool to AI agents.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (tools/list, tools/call)
//!       ▼
//! ┌──────────────────────┐
//! │  sqlgate MCP Server  │
//! │  1. Parse arguments  │
//! │  2. Admit query      │  ← sqlgate-guard (classify)
//! │  3. Prefix tables    │  ← sqlgate-guard (rewrite) + connection prefix
//! │  4. Execute          │  ← QueryBackend
//! │  5. Return JSON rows │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!     Postgres (read-only session)
//! ```
//!
//! ## Example Usage
//!
//! ```ignore
//! use sqlgate_core::GateConfig;
//! use sqlgate_mcp::{McpServer, PgBackend};
//! use std::sync::Arc;
//!
//! let config = GateConfig::from_file("sqlgate.yaml")?;
//! let backend = PgBackend::new(config.shared_database());
//!
//! McpServer::new(config.mcp, Arc::new(backend)).run().await?;
//! ```

pub mod backend;
pub mod error;
pub mod http_transport;
pub mod protocol;
pub mod server;
pub mod tool;

// Re-export main types
pub use backend::{BackendError, ExecutedQuery, MemoryBackend, PgBackend, QueryBackend, Row};
pub use error::McpError;
pub use protocol::{
    CallToolParams, CallToolResponse, JsonRpcRequest, JsonRpcResponse, ToolAnnotations,
    ToolContent, ToolDefinition,
};
pub use server::McpServer;
pub use tool::{DatabaseQueryTool, TOOL_NAME};
