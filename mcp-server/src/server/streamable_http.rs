use crate::config::McpServerConfig;
use crate::handler::McpHandler;
use anyhow::{anyhow, Result};
use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, HeaderName, Request, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>MoviePilot MCP Server</title></head>
<body>
    <h1>MoviePilot MCP Server</h1>
    <p>MCP endpoint: <code>POST /mcp</code></p>
    <p>Health check: <code>GET /api/health</code></p>
</body>
</html>"#;

/// API keys accepted on `/mcp`, read from a configurable header.
///
/// A key may also be sent as `Authorization: Bearer <key>`. With no keys
/// configured the check is disabled.
#[derive(Debug, Clone)]
pub struct ApiKeyStore {
    header: HeaderName,
    keys: Vec<String>,
}

impl ApiKeyStore {
    pub fn new(header: &str, keys: Vec<String>) -> Result<Self> {
        let header = HeaderName::from_bytes(header.trim().as_bytes())
            .map_err(|e| anyhow!("invalid api key header '{header}': {e}"))?;
        Ok(Self { header, keys })
    }

    pub fn from_config(config: &McpServerConfig) -> Result<Self> {
        Self::new(&config.api_key_header, config.api_keys.clone())
    }

    pub fn disabled() -> Self {
        Self {
            header: HeaderName::from_static("x-api-key"),
            keys: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    pub fn is_valid(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    fn extract<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .or_else(|| {
                headers
                    .get(AUTHORIZATION)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|auth| auth.strip_prefix("Bearer "))
                    .map(str::trim)
            })
    }
}

async fn api_key_middleware(
    State(store): State<Arc<ApiKeyStore>>,
    headers: HeaderMap,
    request: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if !store.is_enabled() {
        return next.run(request).await;
    }
    match store.extract(&headers) {
        Some(key) if store.is_valid(key) => next.run(request).await,
        _ => {
            tracing::warn!("rejected MCP request without a valid api key");
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "detail": format!(
                        "missing or invalid api key, send a valid key in the {} header",
                        store.header
                    )
                })),
            )
                .into_response()
        }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check() -> &'static str {
    "OK"
}

/// `/mcp` (streamable http, behind the api key guard), `/api/health` and `/`.
pub fn router<F>(handler_factory: F, api_keys: ApiKeyStore) -> Router
where
    F: Fn() -> Result<McpHandler, std::io::Error> + Send + Sync + 'static,
{
    // stateless: every request is served by a fresh handler from the factory
    let config = StreamableHttpServerConfig {
        stateful_mode: false,
        ..Default::default()
    };
    let mcp_service: StreamableHttpService<McpHandler, LocalSessionManager> =
        StreamableHttpService::new(
            handler_factory,
            LocalSessionManager::default().into(),
            config,
        );

    let api_routes = Router::new().route("/health", get(health_check));

    let protected_mcp = Router::new()
        .nest_service("/mcp", mcp_service)
        .layer(middleware::from_fn_with_state(
            Arc::new(api_keys),
            api_key_middleware,
        ));

    Router::new()
        .route("/", get(index))
        .nest("/api", api_routes)
        .merge(protected_mcp)
}

/// Boot the MCP Server with Streamable HTTP transport.
///
/// # Arguments
/// * `handler_factory` - creates the McpHandler serving a request (handlers share one session)
/// * `bind_addr` - e.g. "127.0.0.1:8000"
/// * `api_keys` - keys accepted on `/mcp`
/// * `shutdown_signal` - external shutdown signal; ctrl-c when None
pub async fn boot_streamable_http_server<F>(
    handler_factory: F,
    bind_addr: &str,
    api_keys: ApiKeyStore,
    shutdown_signal: Option<Pin<Box<dyn Future<Output = ()> + Send>>>,
) -> Result<()>
where
    F: Fn() -> Result<McpHandler, std::io::Error> + Send + Sync + 'static,
{
    if !api_keys.is_enabled() {
        tracing::warn!("no MCP_API_KEYS configured, /mcp is not protected");
    }
    let app = router(handler_factory, api_keys);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("MoviePilot MCP Streamable HTTP Server started on {}", bind_addr);

    let shutdown_future: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_signal {
        Some(signal) => signal,
        None => Box::pin(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => tracing::info!("Shutting down MCP server..."),
                Err(e) => tracing::error!("failed to listen for ctrl_c: {:?}", e),
            }
        }),
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_future)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_store() {
        let store =
            ApiKeyStore::new("X-API-Key", vec!["key1".to_string(), "key2".to_string()]).unwrap();
        assert!(store.is_enabled());
        assert!(store.is_valid("key1"));
        assert!(store.is_valid("key2"));
        assert!(!store.is_valid("invalid"));
        assert!(!ApiKeyStore::disabled().is_enabled());
        assert!(ApiKeyStore::new("bad header", vec![]).is_err());
    }

    #[test]
    fn test_extract_key() {
        let store = ApiKeyStore::new("X-API-Key", vec!["k".to_string()]).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", " test-key ".parse().unwrap());
        assert_eq!(store.extract(&headers), Some("test-key"));

        let mut bearer = HeaderMap::new();
        bearer.insert("Authorization", "Bearer test-token".parse().unwrap());
        assert_eq!(store.extract(&bearer), Some("test-token"));

        let mut basic = HeaderMap::new();
        basic.insert("Authorization", "Basic xyz".parse().unwrap());
        assert_eq!(store.extract(&basic), None);

        assert_eq!(store.extract(&HeaderMap::new()), None);
    }
}
