use super::models::DownloadTask;
use super::{fetch_json, path_segment, perform_action, ActionOutput};
use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DOWNLOAD_PATH: &str = "/api/v1/download/";

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListDownloadsArgs {
    /// Downloader name as configured in MoviePilot; default downloader when omitted
    #[serde(default)]
    pub downloader: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum DownloadAction {
    Start,
    Stop,
}

impl DownloadAction {
    fn as_str(&self) -> &'static str {
        match self {
            DownloadAction::Start => "start",
            DownloadAction::Stop => "stop",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ControlDownloadArgs {
    /// Torrent hash from list_downloads
    #[schemars(length(min = 1))]
    pub hash: String,
    pub action: DownloadAction,
    #[serde(default)]
    pub downloader: Option<String>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct DownloadList {
    pub items: Vec<DownloadTask>,
}

pub fn list_downloads_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "list_downloads",
        "List active download tasks with their progress and state",
        list_downloads,
    )
}

pub fn control_download_tool() -> Result<ToolDefinition> {
    Ok(ToolDefinition::new(
        "control_download",
        "Start or stop (pause) a download task by torrent hash",
        control_download,
    )?
    .mutating())
}

fn downloader(name: Option<&str>) -> Option<&str> {
    name.map(str::trim).filter(|n| !n.is_empty())
}

async fn list_downloads(
    args: ListDownloadsArgs,
    session: Arc<AuthSession>,
) -> Result<DownloadList, ToolError> {
    let request = RemoteRequest::get(DOWNLOAD_PATH)
        .query_opt("name", downloader(args.downloader.as_deref()));
    let items = fetch_json(&session, request).await?;
    Ok(DownloadList { items })
}

pub(crate) fn control_request(args: &ControlDownloadArgs) -> Result<RemoteRequest, ToolError> {
    let hash = path_segment("hash", &args.hash)?;
    Ok(
        RemoteRequest::get(format!("{DOWNLOAD_PATH}{}/{hash}", args.action.as_str()))
            .query_opt("name", downloader(args.downloader.as_deref())),
    )
}

async fn control_download(
    args: ControlDownloadArgs,
    session: Arc<AuthSession>,
) -> Result<ActionOutput, ToolError> {
    let request = control_request(&args)?;
    let res = perform_action(&session, request).await?;
    tracing::info!("download {} {}", args.action.as_str(), args.hash.trim());
    Ok(res.into())
}
