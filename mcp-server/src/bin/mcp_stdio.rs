//! MCP Server with stdio transport.
//!
//! Suitable for MCP clients like Claude Desktop that spawn the server and talk
//! over standard input/output.
//!
//! # Usage
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "moviepilot": {
//!       "command": "/path/to/mcp-stdio",
//!       "env": {
//!         "MOVIEPILOT_BASE_URL": "http://localhost:3000",
//!         "MOVIEPILOT_USERNAME": "admin",
//!         "MOVIEPILOT_PASSWORD": "password"
//!       }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use dotenvy::dotenv;
use mcp_server::logging::{self, LoggingConfig};
use mcp_server::{McpHandler, McpServerConfig};
use moviepilot_client::MoviePilotConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    // stdout carries the MCP protocol
    let conf = logging::load_logging_config_from_env().unwrap_or_default();
    logging::tracing_init(LoggingConfig {
        use_stdout: false,
        ..conf
    })?;

    tracing::info!("Starting MoviePilot MCP Stdio Server");

    let moviepilot = MoviePilotConfig::from_env()?;
    let mcp_config = McpServerConfig::from_env()?;
    let handler = McpHandler::connect(&moviepilot, &mcp_config)?;

    mcp_server::boot_stdio_server(handler).await?;

    tracing::info!("MoviePilot MCP Stdio Server shutdown");
    Ok(())
}
