use crate::catalog::{ToolCatalog, ToolDefinition};
use crate::config::McpServerConfig;
use crate::dispatcher::{Dispatcher, ToolInvocation};
use crate::error::ToolError;
use crate::schema::JsonObject;
use anyhow::Result;
use moviepilot_client::{AuthSession, MoviePilotConfig};
use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
        ToolAnnotations,
    },
    service::RequestContext,
    ErrorData, RoleServer, ServerHandler,
};
use std::future::Future;
use std::sync::Arc;

const INSTRUCTIONS: &str = "MoviePilot MCP Server: tools to search, explore and recommend movies \
and series, manage subscriptions and downloads, and read media library statistics. \
Failed calls return {\"error\": {\"kind\", \"message\"}}.";

/// `rmcp::ServerHandler` over the MoviePilot tool dispatcher.
#[derive(Debug, Clone)]
pub struct McpHandler {
    dispatcher: Arc<Dispatcher>,
}

impl McpHandler {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Wires the reqwest backed session, the MoviePilot catalog and the dispatcher.
    pub fn connect(moviepilot: &MoviePilotConfig, config: &McpServerConfig) -> Result<Self> {
        let session = Arc::new(AuthSession::connect(moviepilot)?);
        let catalog = Arc::new(ToolCatalog::moviepilot()?);
        tracing::info!(
            "serving {} tools for MoviePilot at {}",
            catalog.len(),
            moviepilot.base_url
        );
        Ok(Self::new(Dispatcher::new(catalog, session, config.timeout())))
    }

    pub fn tools(&self) -> Vec<Tool> {
        self.dispatcher.catalog().iter().map(to_tool).collect()
    }

    /// Runs one tool; failures become a structured error result, never a protocol error.
    pub async fn call(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        match self
            .dispatcher
            .dispatch(ToolInvocation::new(name, arguments))
            .await
        {
            Ok(value) => CallToolResult::structured(value),
            Err(e) => CallToolResult::structured_error(e.to_payload()),
        }
    }

    /// [`McpHandler::call`], abandoned with a `cancelled` error once `cancelled` resolves.
    pub async fn call_or_cancel(
        &self,
        name: &str,
        arguments: Option<JsonObject>,
        cancelled: impl Future<Output = ()>,
    ) -> CallToolResult {
        tokio::select! {
            result = self.call(name, arguments) => result,
            _ = cancelled => {
                tracing::info!("tool call {name} cancelled by client");
                CallToolResult::structured_error(ToolError::Cancelled.to_payload())
            }
        }
    }
}

fn to_tool(def: &ToolDefinition) -> Tool {
    let mut tool = Tool::new(def.name(), def.description(), def.input_schema().clone());
    tool.output_schema = Some(def.output_schema().clone());
    tool.annotations = Some(ToolAnnotations {
        title: None,
        read_only_hint: Some(def.is_read_only()),
        destructive_hint: Some(!def.is_read_only()),
        idempotent_hint: None,
        open_world_hint: Some(true),
    });
    tool
}

impl ServerHandler for McpHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    #[allow(clippy::manual_async_fn)]
    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, ErrorData>> + Send + '_ {
        async move { Ok(ListToolsResult::with_all_items(self.tools())) }
    }

    #[allow(clippy::manual_async_fn)]
    fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, ErrorData>> + Send + '_ {
        async move {
            let name = request.name.to_string();
            Ok(self
                .call_or_cancel(&name, request.arguments, context.ct.cancelled())
                .await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> McpHandler {
        let moviepilot = MoviePilotConfig::new("http://127.0.0.1:3001", "admin", "secret");
        McpHandler::connect(&moviepilot, &McpServerConfig::default()).unwrap()
    }

    #[test]
    fn test_tools_carry_schemas_and_hints() {
        let tools = handler().tools();
        assert_eq!(tools.len(), 11);
        let add = tools.iter().find(|t| t.name == "add_subscribe").unwrap();
        assert!(add.output_schema.is_some());
        let hints = add.annotations.as_ref().unwrap();
        assert_eq!(hints.read_only_hint, Some(false));
        let search = tools.iter().find(|t| t.name == "search_media").unwrap();
        assert_eq!(search.input_schema["type"], "object");
        assert_eq!(search.annotations.as_ref().unwrap().read_only_hint, Some(true));
    }

    #[tokio::test]
    async fn test_call_unknown_tool_is_error_result() {
        let result = handler().call("nope", None).await;
        assert_eq!(result.is_error, Some(true));
        let payload = result.structured_content.unwrap();
        assert_eq!(payload["error"]["kind"], "not_found");
    }
}
