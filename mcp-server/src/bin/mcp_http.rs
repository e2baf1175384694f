//! MCP Server with HTTP transport (Streamable HTTP).
//!
//! Serves MCP at `POST /mcp` for HTTP based MCP clients and proxies. Set
//! `MCP_API_KEYS` to require an api key on `/mcp`.
//!
//! # Environment Variables
//!
//! - `MCP_ADDR`: HTTP server bind address (default: 127.0.0.1:8000)
//! - `MCP_API_KEYS`: accepted api keys, comma-separated
//! - `MCP_API_KEY_HEADER`: header carrying the key (default: X-API-Key)
//! - See `MoviePilotConfig` and `McpServerConfig` for the rest.

use anyhow::Result;
use dotenvy::dotenv;
use mcp_server::logging;
use mcp_server::{ApiKeyStore, McpHandler, McpServerConfig};
use moviepilot_client::MoviePilotConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let conf = logging::load_logging_config_from_env().unwrap_or_default();
    logging::tracing_init(conf)?;

    tracing::info!("Starting MoviePilot MCP HTTP Server");

    let moviepilot = MoviePilotConfig::from_env()?;
    let mcp_config = McpServerConfig::from_env()?;
    let api_keys = ApiKeyStore::from_config(&mcp_config)?;

    // one handler (and so one token cache) shared by every request
    let handler = McpHandler::connect(&moviepilot, &mcp_config)?;
    let handler_factory = move || Ok(handler.clone());

    mcp_server::boot_streamable_http_server(handler_factory, &mcp_config.addr, api_keys, None)
        .await?;

    tracing::info!("MoviePilot MCP HTTP Server shutdown");
    Ok(())
}
