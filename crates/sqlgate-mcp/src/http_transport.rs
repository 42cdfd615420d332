//! HTTP transport for MCP server.
//!
//! JSON-RPC requests are accepted as `POST /mcp` bodies and answered in the
//! response body. Notifications are acknowledged with `202 Accepted` and an
//! empty body.

use crate::error::McpError;
use crate::protocol::{JsonRpcResponse, PARSE_ERROR};
use crate::server::McpServer;
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the HTTP router for MCP.
pub fn create_router(server: Arc<McpServer>) -> Router {
    Router::new()
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// Handle POST requests to /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(State(server): State<Arc<McpServer>>, body: Bytes) -> Response {
    let Ok(message) = std::str::from_utf8(&body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                "Parse error: body is not valid UTF-8",
            )),
        )
            .into_response();
    };

    match server.handle_message(message).await {
        Some(response) => {
            let status = match &response.error {
                Some(error) if error.code == PARSE_ERROR => StatusCode::BAD_REQUEST,
                _ => StatusCode::OK,
            };
            (status, Json(response)).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sqlgate",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    server: Arc<McpServer>,
}

impl HttpServer {
    /// Create a new HTTP server bound to `address` (`host:port`).
    pub fn new(address: impl Into<String>, server: Arc<McpServer>) -> Self {
        Self {
            address: address.into(),
            server,
        }
    }

    /// Run the HTTP server until Ctrl-C.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to {}: {}", self.address, e))
            })?;

        tracing::info!(address = %self.address, "MCP HTTP server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        Ok(())
    }
}
