use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";
const MAX_TIMEOUT_SEC: u64 = 600;

fn default_addr() -> String {
    DEFAULT_ADDR.to_string()
}
fn default_timeout_sec() -> u64 {
    60
}
fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

/// Configuration for MCP Server
#[derive(Clone, Debug, Deserialize)]
pub struct McpServerConfig {
    /// HTTP server bind address (http transport only)
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Deadline for a whole tool call in seconds
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    /// Accepted API keys for the http transport; empty disables the check
    #[serde(default)]
    pub api_keys: Vec<String>,
    /// Header carrying the API key
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            timeout_sec: default_timeout_sec(),
            api_keys: Vec::new(),
            api_key_header: default_api_key_header(),
        }
    }
}

impl McpServerConfig {
    /// Create configuration from `MCP_*` environment variables
    /// (`MCP_ADDR`, `MCP_TIMEOUT_SEC`, `MCP_API_KEYS` comma-separated, `MCP_API_KEY_HEADER`)
    pub fn from_env() -> Result<Self> {
        let mut config = envy::prefixed("MCP_")
            .from_env::<McpServerConfig>()
            .map_err(|e| anyhow!("cannot load MCP_* env: {e}"))?;
        config.api_keys = config
            .api_keys
            .into_iter()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.addr
            .parse::<SocketAddr>()
            .map_err(|e| anyhow!("invalid MCP_ADDR '{}': {e}", self.addr))?;
        if self.timeout_sec == 0 || self.timeout_sec > MAX_TIMEOUT_SEC {
            return Err(anyhow!(
                "MCP_TIMEOUT_SEC must be between 1 and {MAX_TIMEOUT_SEC}, got {}",
                self.timeout_sec
            ));
        }
        if self.api_key_header.trim().is_empty() {
            return Err(anyhow!("MCP_API_KEY_HEADER must not be empty"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_sec)
    }
}
