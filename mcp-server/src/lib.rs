//! MCP (Model Context Protocol) server exposing MoviePilot as LLM tools.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      MCP Client                              │
//! │              (Claude Desktop, etc.)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ MCP Protocol (JSON-RPC)
//!                       │ via Stdio or Streamable HTTP
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 mcp-server crate                             │
//! │  McpHandler (rmcp::ServerHandler)                            │
//! │   └ Dispatcher: resolve → validate args → run → check output │
//! │      └ ToolCatalog: search, details, subscribe, download ... │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ AuthSession::get_authenticated
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                moviepilot-client crate                       │
//! │  bearer token cache + refresh, reqwest RemoteApi             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use mcp_server::{ApiKeyStore, McpHandler, McpServerConfig};
//! use moviepilot_client::MoviePilotConfig;
//!
//! let config = McpServerConfig::from_env()?;
//! let handler = McpHandler::connect(&MoviePilotConfig::from_env()?, &config)?;
//! mcp_server::boot_streamable_http_server(
//!     move || Ok(handler.clone()),
//!     &config.addr,
//!     ApiKeyStore::from_config(&config)?,
//!     None,
//! ).await?;
//! ```
//!
//! ## Environment Variables
//!
//! - `MOVIEPILOT_BASE_URL`, `MOVIEPILOT_USERNAME`, `MOVIEPILOT_PASSWORD`: MoviePilot server and login
//! - `MOVIEPILOT_TIMEOUT_SEC`: per-request timeout (default: 30)
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_TIMEOUT_SEC`: deadline for one tool call (default: 60)
//! - `MCP_API_KEYS`: accepted api keys, comma-separated (default: none, guard disabled)
//! - `MCP_API_KEY_HEADER`: header carrying the api key (default: X-API-Key)
//! - `LOG_LEVEL`, `LOG_FORMAT`, `LOG_USE_STDOUT`: logging

pub mod catalog;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod logging;
pub mod schema;
pub mod server;
pub mod tools;

pub use catalog::{ToolCatalog, ToolDefinition};
pub use config::McpServerConfig;
pub use dispatcher::{Dispatcher, ToolInvocation, ToolResult};
pub use error::ToolError;
pub use handler::McpHandler;
pub use server::{boot_stdio_server, boot_streamable_http_server, router, ApiKeyStore};
