//! Subscriptions: MoviePilot watches for releases of subscribed media and
//! downloads them automatically.

use super::models::{MediaType, Subscription};
use super::{fetch_json, perform_action, ActionOutput};
use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const SUBSCRIBE_PATH: &str = "/api/v1/subscribe/";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AddSubscribeArgs {
    /// Media title
    #[schemars(length(min = 1))]
    pub name: String,
    pub media_type: MediaType,
    #[serde(default)]
    pub year: Option<String>,
    /// At least one of tmdbid, doubanid and bangumiid is required
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub tmdbid: Option<i64>,
    #[serde(default)]
    pub doubanid: Option<String>,
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub bangumiid: Option<i64>,
    /// Season to subscribe (series only)
    #[serde(default)]
    pub season: Option<u32>,
    /// Keep upgrading to better releases after the first download
    #[serde(default)]
    pub best_version: Option<bool>,
    /// Restrict to these site ids
    #[serde(default)]
    pub sites: Option<Vec<i64>>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct AddSubscribeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribe_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListSubscribesArgs {
    #[serde(default)]
    pub media_type: Option<MediaType>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SubscriptionList {
    pub items: Vec<Subscription>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteSubscribeArgs {
    #[schemars(range(min = 1))]
    pub subscribe_id: i64,
}

pub fn add_subscribe_tool() -> Result<ToolDefinition> {
    Ok(ToolDefinition::new(
        "add_subscribe",
        "Subscribe to a movie or series so MoviePilot downloads it when released. \
         Needs at least one of tmdbid, doubanid or bangumiid",
        add_subscribe,
    )?
    .mutating())
}

pub fn list_subscribes_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "list_subscribes",
        "List current subscriptions, optionally only movies or series",
        list_subscribes,
    )
}

pub fn delete_subscribe_tool() -> Result<ToolDefinition> {
    Ok(ToolDefinition::new(
        "delete_subscribe",
        "Delete a subscription by id",
        delete_subscribe,
    )?
    .mutating())
}

/// JSON body for `POST /api/v1/subscribe/`.
pub(crate) fn subscribe_body(args: &AddSubscribeArgs) -> Result<Value, ToolError> {
    let doubanid = args
        .doubanid
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if args.tmdbid.is_none() && doubanid.is_none() && args.bangumiid.is_none() {
        return Err(ToolError::validation(
            "tmdbid",
            "one of tmdbid, doubanid or bangumiid is required",
        ));
    }
    let name = args.name.trim();
    if name.is_empty() {
        return Err(ToolError::validation("name", "name must not be blank"));
    }

    let mut body = Map::new();
    body.insert("name".to_string(), json!(name));
    body.insert("type".to_string(), json!(args.media_type.label()));
    let optional = [
        ("year", args.year.as_deref().map(str::trim).map(Value::from)),
        ("tmdbid", args.tmdbid.map(Value::from)),
        ("doubanid", doubanid.map(Value::from)),
        ("bangumiid", args.bangumiid.map(Value::from)),
        ("season", args.season.map(Value::from)),
        ("best_version", args.best_version.map(|b| json!(u8::from(b)))),
        ("sites", args.sites.as_ref().map(|s| json!(s))),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            body.insert(key.to_string(), value);
        }
    }
    Ok(Value::Object(body))
}

async fn add_subscribe(
    args: AddSubscribeArgs,
    session: Arc<AuthSession>,
) -> Result<AddSubscribeOutput, ToolError> {
    let body = subscribe_body(&args)?;
    let res = perform_action(&session, RemoteRequest::post(SUBSCRIBE_PATH).json(body)).await?;
    let subscribe_id = res
        .data
        .as_ref()
        .and_then(|d| d.get("id"))
        .and_then(Value::as_i64);
    tracing::info!("subscribed '{}' (id {:?})", args.name.trim(), subscribe_id);
    Ok(AddSubscribeOutput {
        subscribe_id,
        message: res.message.filter(|m| !m.is_empty()),
    })
}

async fn list_subscribes(
    args: ListSubscribesArgs,
    session: Arc<AuthSession>,
) -> Result<SubscriptionList, ToolError> {
    let items: Vec<Subscription> = fetch_json(&session, RemoteRequest::get(SUBSCRIBE_PATH)).await?;
    let items = match args.media_type {
        Some(t) => items
            .into_iter()
            .filter(|s| t.matches(s.type_label()))
            .collect(),
        None => items,
    };
    Ok(SubscriptionList { items })
}

async fn delete_subscribe(
    args: DeleteSubscribeArgs,
    session: Arc<AuthSession>,
) -> Result<ActionOutput, ToolError> {
    let request = RemoteRequest::delete(format!("{SUBSCRIBE_PATH}{}", args.subscribe_id));
    let res = perform_action(&session, request).await?;
    tracing::info!("deleted subscription {}", args.subscribe_id);
    Ok(res.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> AddSubscribeArgs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_subscribe_body() {
        let body = subscribe_body(&args(json!({
            "name": " 三体 ",
            "media_type": "电视剧",
            "year": "2023",
            "tmdbid": 108545,
            "season": 1,
            "best_version": true
        })))
        .unwrap();
        assert_eq!(
            body,
            json!({
                "name": "三体",
                "type": "电视剧",
                "year": "2023",
                "tmdbid": 108545,
                "season": 1,
                "best_version": 1
            })
        );
    }

    #[test]
    fn test_subscribe_body_needs_an_id() {
        for value in [
            json!({"name": "x", "media_type": "电影"}),
            json!({"name": "x", "media_type": "电影", "doubanid": "  "}),
        ] {
            match subscribe_body(&args(value)) {
                Err(ToolError::Validation { field, .. }) => {
                    assert_eq!(field.as_deref(), Some("tmdbid"))
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        let body = subscribe_body(&args(json!({
            "name": "x", "media_type": "电影", "doubanid": "1292052", "best_version": false
        })))
        .unwrap();
        assert_eq!(body["doubanid"], "1292052");
        assert_eq!(body["best_version"], 0);
        assert!(body.get("tmdbid").is_none());
    }
}
