use super::models::LibraryStatistics;
use super::{fetch_json, NoArgs};
use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest};
use std::sync::Arc;

pub fn get_library_statistics_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "get_library_statistics",
        "Count movies, series, episodes and users in the media library",
        get_library_statistics,
    )
}

async fn get_library_statistics(
    _args: NoArgs,
    session: Arc<AuthSession>,
) -> Result<LibraryStatistics, ToolError> {
    fetch_json(&session, RemoteRequest::get("/api/v1/dashboard/statistic")).await
}
