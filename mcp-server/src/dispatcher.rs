use crate::catalog::ToolCatalog;
use crate::error::ToolError;
use crate::schema::JsonObject;
use moviepilot_client::{AuthSession, TransportErrorKind};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A tool call as received from the MCP runtime.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    /// `None` is treated as an empty object
    pub arguments: Option<JsonObject>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Option<JsonObject>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

pub type ToolResult = Result<Value, ToolError>;

/// Resolves, validates and runs tool invocations against one shared session.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    catalog: Arc<ToolCatalog>,
    session: Arc<AuthSession>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(catalog: Arc<ToolCatalog>, session: Arc<AuthSession>, timeout: Duration) -> Self {
        Self {
            catalog,
            session,
            timeout,
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Arguments are checked before any request reaches MoviePilot; the
    /// handler output is checked against the declared output schema.
    pub async fn dispatch(&self, invocation: ToolInvocation) -> ToolResult {
        let ToolInvocation { name, arguments } = invocation;
        let Some(tool) = self.catalog.resolve(&name) else {
            tracing::warn!("unknown tool requested: {name}");
            return Err(ToolError::NotFound(name));
        };
        let arguments = Value::Object(arguments.unwrap_or_default());
        tool.validate_input(&arguments).inspect_err(|e| {
            tracing::info!("rejected arguments for {name}: {e}");
        })?;

        let started = Instant::now();
        tracing::debug!("calling tool {name}: {arguments}");
        let output = tokio::time::timeout(self.timeout, tool.invoke(arguments, self.session.clone()))
            .await
            .map_err(|_| ToolError::Transport {
                kind: TransportErrorKind::Timeout,
                message: format!("{name} did not complete within {:?}", self.timeout),
            })?
            .inspect_err(|e| tracing::warn!("tool {name} failed: {e}"))?;
        tool.validate_output(&output)
            .inspect_err(|e| tracing::error!("{e}"))?;
        tracing::info!("tool {name} completed in {:?}", started.elapsed());
        Ok(output)
    }
}
