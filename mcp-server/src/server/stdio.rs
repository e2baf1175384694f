use crate::handler::McpHandler;
use anyhow::{anyhow, Result};
use rmcp::{transport::stdio, ServiceExt};

/// Serves the MoviePilot tools to one MCP client over stdin/stdout, the mode
/// an agent host uses when it spawns the bridge as a subprocess.
///
/// Returns once the client closes its end. stdout carries JSON-RPC frames
/// only, so logging has to be initialized with `use_stdout: false` first.
pub async fn boot_stdio_server(handler: McpHandler) -> Result<()> {
    tracing::info!(
        "serving {} MoviePilot tools over stdio",
        handler.tools().len()
    );

    let running = handler.serve(stdio()).await.map_err(|e| {
        tracing::error!("MCP stdio handshake failed: {:?}", e);
        anyhow!("MCP stdio handshake failed: {e}")
    })?;

    let reason = running.waiting().await?;
    tracing::info!("MCP stdio client disconnected: {:?}", reason);
    Ok(())
}
