//! MoviePilot tool definitions.
//!
//! Each submodule declares its tools with [`ToolDefinition::new`]; handlers are
//! plain async functions over typed arguments and share the helpers below for
//! turning MoviePilot responses into typed outputs.

pub mod dashboard;
pub mod download;
pub mod media;
pub mod models;
pub mod recommend;
pub mod subscribe;

use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest, ResponseBody};
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

pub fn all() -> Result<Vec<ToolDefinition>> {
    Ok(vec![
        media::search_media_tool()?,
        media::search_person_tool()?,
        media::get_media_details_tool()?,
        media::get_season_episodes_tool()?,
        recommend::list_recommendations_tool()?,
        subscribe::add_subscribe_tool()?,
        subscribe::list_subscribes_tool()?,
        subscribe::delete_subscribe_tool()?,
        download::list_downloads_tool()?,
        download::control_download_tool()?,
        dashboard::get_library_statistics_tool()?,
    ])
}

/// Arguments of tools that take none.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct NoArgs {}

/// Result of a MoviePilot action endpoint (subscribe, delete, start, stop).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ActionOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `{"success": bool, "message": ..., "data": ...}` envelope.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl From<ActionResponse> for ActionOutput {
    fn from(res: ActionResponse) -> Self {
        Self {
            success: res.success,
            message: res.message.filter(|m| !m.is_empty()),
        }
    }
}

/// Authenticated call whose 2xx body must decode into `T`.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    session: &AuthSession,
    request: RemoteRequest,
) -> Result<T, ToolError> {
    let endpoint = format!("{} {}", request.method, request.path);
    let value = fetch_value(session, request, &endpoint).await?;
    serde_json::from_value(value)
        .map_err(|e| ToolError::Schema(format!("unexpected response from {endpoint}: {e}")))
}

async fn fetch_value(
    session: &AuthSession,
    request: RemoteRequest,
    endpoint: &str,
) -> Result<Value, ToolError> {
    let res = session.get_authenticated(request).await?;
    if !res.is_success() {
        tracing::warn!("{endpoint} answered {}", res.status);
        return Err(ToolError::Upstream {
            status: Some(res.status),
            message: format!("{endpoint} failed with {}: {}", res.status, res.detail()),
        });
    }
    match res.body {
        ResponseBody::Json(value) => Ok(value),
        ResponseBody::Empty => Ok(Value::Null),
        ResponseBody::Text(_) => Err(ToolError::Schema(format!(
            "{endpoint} returned a non-json body"
        ))),
    }
}

/// Like [`fetch_json`] for action endpoints: `success: false` is an upstream error.
pub(crate) async fn perform_action(
    session: &AuthSession,
    request: RemoteRequest,
) -> Result<ActionResponse, ToolError> {
    let res: ActionResponse = fetch_json(session, request).await?;
    if !res.success {
        return Err(ToolError::Upstream {
            status: None,
            message: res
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "MoviePilot reported a failure".to_string()),
        });
    }
    Ok(res)
}

/// Checks a value interpolated into a request path: ascii letters, digits, `-` and `_` only.
pub(crate) fn path_segment<'a>(field: &str, value: &'a str) -> Result<&'a str, ToolError> {
    let value = value.trim();
    if value.is_empty()
        || !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ToolError::validation(
            field,
            format!("{field} must consist of ascii letters, digits, '-' or '_'"),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_segment() {
        assert_eq!(path_segment("hash", " abc123 ").unwrap(), "abc123");
        assert_eq!(path_segment("id", "tt-01_a").unwrap(), "tt-01_a");
        for bad in ["", "a/b", "..", "a b", "x?y=1", "%2F"] {
            match path_segment("hash", bad) {
                Err(ToolError::Validation { field, .. }) => {
                    assert_eq!(field.as_deref(), Some("hash"))
                }
                other => panic!("{bad}: unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_action_output() {
        let res: ActionResponse =
            serde_json::from_value(json!({"success": true, "message": "", "data": {"id": 3}}))
                .unwrap();
        assert_eq!(res.data, Some(json!({"id": 3})));
        let out = ActionOutput::from(res);
        assert!(out.success);
        assert!(out.message.is_none());
        assert_eq!(serde_json::to_value(&out).unwrap(), json!({"success": true}));
    }

    #[test]
    fn test_all_tools_build() {
        let tools = all().unwrap();
        assert_eq!(tools.len(), 11);
        let no_args = crate::schema::schema_object_for::<NoArgs>().unwrap();
        assert_eq!(no_args["type"], "object");
    }
}
