//! Integration tests for the MCP handler and the HTTP transport.
//!
//! - ServerInfo generation
//! - tool listing and structured call results
//! - api key guard on `/mcp`
//! - configuration from environment

mod common;

use common::{args, handler, FakeMoviePilot};
use mcp_server::{ApiKeyStore, McpServerConfig};
use reqwest::Method;
use rmcp::ServerHandler;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_get_info() {
    let handler = handler(&FakeMoviePilot::new());
    let info = handler.get_info();

    assert_eq!(info.protocol_version, rmcp::model::ProtocolVersion::LATEST);
    assert!(info.capabilities.tools.is_some());
    assert!(info
        .instructions
        .as_ref()
        .unwrap()
        .contains("MoviePilot MCP Server"));
}

#[test]
fn test_tools_listing() {
    let tools = handler(&FakeMoviePilot::new()).tools();
    assert_eq!(tools.len(), 11);
    for tool in &tools {
        assert!(tool.description.is_some(), "{} has no description", tool.name);
        assert_eq!(tool.input_schema["type"], "object");
        let output = tool.output_schema.as_ref().unwrap();
        assert_eq!(output["type"], "object");
    }
    let details = tools.iter().find(|t| t.name == "get_media_details").unwrap();
    let required = details.input_schema["required"].as_array().unwrap();
    assert!(required.contains(&json!("id_value")));
}

#[tokio::test]
async fn test_call_returns_structured_content() {
    let fake = FakeMoviePilot::new();
    fake.route_json(
        Method::GET,
        "/api/v1/tmdb/1399/1",
        json!([{"episode_number": 1, "name": "凛冬将至", "runtime": 62}]),
    );
    let handler = handler(&fake);

    let result = handler
        .call(
            "get_season_episodes",
            args(json!({"tmdb_id": 1399, "season_number": 1})),
        )
        .await;
    assert_ne!(result.is_error, Some(true));
    let content = result.structured_content.unwrap();
    assert_eq!(content["episodes"][0]["name"], "凛冬将至");
    assert_eq!(content["season_number"], 1);
}

#[tokio::test]
async fn test_call_error_envelope() {
    let fake = FakeMoviePilot::new();
    let handler = handler(&fake);

    let result = handler
        .call("search_person", args(json!({"page": 2})))
        .await;
    assert_eq!(result.is_error, Some(true));
    let payload = result.structured_content.unwrap();
    assert_eq!(
        payload["error"]["kind"], "validation_error",
        "unexpected payload {payload}"
    );
    assert_eq!(payload["error"]["field"], "name");
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn test_cancelled_call_returns_cancelled_kind() {
    let fake = FakeMoviePilot::new();
    fake.route_json(Method::GET, "/api/v1/dashboard/statistic", json!({}));
    fake.set_delay(Duration::from_secs(5));
    let handler = handler(&fake);

    let result = handler
        .call_or_cancel(
            "get_library_statistics",
            None,
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;
    assert_eq!(result.is_error, Some(true));
    assert_eq!(result.structured_content.unwrap()["error"]["kind"], "cancelled");
    // the request went out but its answer was never awaited
    assert_eq!(fake.call_count(), 1);
}

#[tokio::test]
async fn test_http_api_key_guard() -> anyhow::Result<()> {
    let handler = handler(&FakeMoviePilot::new());
    let keys = ApiKeyStore::new("X-API-Key", vec!["secret-key".to_string()])?;
    let app = mcp_server::router(move || Ok(handler.clone()), keys);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let client = reqwest::Client::new();
    let health = client
        .get(format!("http://{addr}/api/health"))
        .send()
        .await?;
    assert_eq!(health.status(), 200);
    assert_eq!(health.text().await?, "OK");

    let initialize = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2025-03-26",
            "capabilities": {},
            "clientInfo": {"name": "test", "version": "0.1.0"}
        }
    });

    let denied = client
        .post(format!("http://{addr}/mcp"))
        .header("Accept", "application/json, text/event-stream")
        .json(&initialize)
        .send()
        .await?;
    assert_eq!(denied.status(), 401);

    let wrong = client
        .post(format!("http://{addr}/mcp"))
        .header("X-API-Key", "guess")
        .json(&initialize)
        .send()
        .await?;
    assert_eq!(wrong.status(), 401);

    for (header, value) in [("X-API-Key", "secret-key"), ("Authorization", "Bearer secret-key")] {
        let allowed = client
            .post(format!("http://{addr}/mcp"))
            .header("Accept", "application/json, text/event-stream")
            .header(header, value)
            .json(&initialize)
            .send()
            .await?;
        assert_ne!(allowed.status(), 401, "{header} should be accepted");
    }

    server.abort();
    Ok(())
}

#[test]
fn test_config_default() {
    let config = McpServerConfig::default();
    assert_eq!(config.addr, "127.0.0.1:8000");
    assert_eq!(config.timeout_sec, 60);
    assert!(config.api_keys.is_empty());
    assert_eq!(config.api_key_header, "X-API-Key");
    assert!(!ApiKeyStore::from_config(&config).unwrap().is_enabled());
}

#[test]
fn test_config_from_env() {
    std::env::set_var("MCP_ADDR", "0.0.0.0:9000");
    std::env::set_var("MCP_TIMEOUT_SEC", "120");
    std::env::set_var("MCP_API_KEYS", "key-a, key-b,");
    std::env::set_var("MCP_API_KEY_HEADER", "X-MoviePilot-Key");

    let config = McpServerConfig::from_env().unwrap();

    assert_eq!(config.addr, "0.0.0.0:9000");
    assert_eq!(config.timeout_sec, 120);
    assert_eq!(config.api_keys, vec!["key-a".to_string(), "key-b".to_string()]);
    assert_eq!(config.api_key_header, "X-MoviePilot-Key");
    let store = ApiKeyStore::from_config(&config).unwrap();
    assert!(store.is_valid("key-b"));

    std::env::remove_var("MCP_ADDR");
    std::env::remove_var("MCP_TIMEOUT_SEC");
    std::env::remove_var("MCP_API_KEYS");
    std::env::remove_var("MCP_API_KEY_HEADER");
}
