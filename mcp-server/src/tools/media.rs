use super::models::{Episode, MediaItem, MediaType, PersonItem};
use super::{fetch_json, path_segment};
use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const SEARCH_PATH: &str = "/api/v1/media/search";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchMediaArgs {
    /// Title to search for (fuzzy)
    #[schemars(length(min = 1))]
    pub title: String,
    /// Keep only movies (电影) or series (电视剧)
    #[serde(default)]
    pub media_type: Option<MediaType>,
    /// Keep only items released in this year
    #[serde(default)]
    #[schemars(range(min = 1900, max = 2100))]
    pub year: Option<u32>,
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub page: Option<u32>,
    /// Results per page requested from MoviePilot
    #[serde(default)]
    #[schemars(range(min = 1, max = 100))]
    pub count: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchPersonArgs {
    /// Name of the actor or crew member (fuzzy)
    #[schemars(length(min = 1))]
    pub name: String,
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub page: Option<u32>,
    #[serde(default)]
    #[schemars(range(min = 1, max = 100))]
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    Tmdb,
    Douban,
    Bangumi,
}

impl IdType {
    fn prefix(&self) -> &'static str {
        match self {
            IdType::Tmdb => "tmdb",
            IdType::Douban => "douban",
            IdType::Bangumi => "bangumi",
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MediaDetailsArgs {
    pub id_type: IdType,
    /// The id in the chosen source
    #[schemars(length(min = 1))]
    pub id_value: String,
    pub media_type: MediaType,
    /// Helps MoviePilot resolve douban and bangumi ids
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<u32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SeasonEpisodesArgs {
    /// TMDB id of the series
    #[schemars(range(min = 1))]
    pub tmdb_id: u64,
    /// Season number, 0 for specials
    pub season_number: u32,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct MediaList {
    pub items: Vec<MediaItem>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct PersonList {
    pub items: Vec<PersonItem>,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct EpisodeList {
    pub tmdb_id: u64,
    pub season_number: u32,
    pub episodes: Vec<Episode>,
}

pub fn search_media_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "search_media",
        "Search movies and series by title, optionally filtered by media type and year",
        search_media,
    )
}

pub fn search_person_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "search_person",
        "Search actors and crew members by name",
        search_person,
    )
}

pub fn get_media_details_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "get_media_details",
        "Get detailed information about a movie or series by tmdb, douban or bangumi id",
        get_media_details,
    )
}

pub fn get_season_episodes_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "get_season_episodes",
        "List the episodes of one season of a series (tmdb)",
        get_season_episodes,
    )
}

fn search_request(
    field: &str,
    kind: &str,
    term: &str,
    page: Option<u32>,
    count: Option<u32>,
) -> Result<RemoteRequest, ToolError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(ToolError::validation(field, format!("{field} must not be blank")));
    }
    Ok(RemoteRequest::get(SEARCH_PATH)
        .query("title", term)
        .query("type", kind)
        .query("page", page.unwrap_or(1))
        .query("count", count.unwrap_or(DEFAULT_PAGE_SIZE)))
}

pub(crate) fn filter_media(
    items: Vec<MediaItem>,
    media_type: Option<MediaType>,
    year: Option<u32>,
) -> Vec<MediaItem> {
    items
        .into_iter()
        .filter(|item| media_type.is_none_or(|t| t.matches(item.type_label())))
        .filter(|item| year.is_none_or(|y| item.year_is(y)))
        .collect()
}

async fn search_media(args: SearchMediaArgs, session: Arc<AuthSession>) -> Result<MediaList, ToolError> {
    let request = search_request("title", "media", &args.title, args.page, args.count)?;
    let items: Vec<MediaItem> = fetch_json(&session, request).await?;
    let total = items.len();
    let items = filter_media(items, args.media_type, args.year);
    tracing::debug!("search_media '{}': {} of {} results kept", args.title, items.len(), total);
    Ok(MediaList { items })
}

async fn search_person(args: SearchPersonArgs, session: Arc<AuthSession>) -> Result<PersonList, ToolError> {
    let request = search_request("name", "person", &args.name, args.page, args.count)?;
    let items = fetch_json(&session, request).await?;
    Ok(PersonList { items })
}

pub(crate) fn media_details_request(args: &MediaDetailsArgs) -> Result<RemoteRequest, ToolError> {
    let id = path_segment("id_value", &args.id_value)?;
    Ok(
        RemoteRequest::get(format!("/api/v1/media/{}:{id}", args.id_type.prefix()))
            .query("type_name", args.media_type.label())
            .query_opt("title", args.title.as_deref().map(str::trim).filter(|t| !t.is_empty()))
            .query_opt("year", args.year),
    )
}

async fn get_media_details(args: MediaDetailsArgs, session: Arc<AuthSession>) -> Result<MediaItem, ToolError> {
    let request = media_details_request(&args)?;
    let item: Option<MediaItem> = fetch_json(&session, request).await?;
    match item {
        Some(item) if !item.is_empty() => Ok(item),
        _ => Err(ToolError::Upstream {
            status: Some(404),
            message: format!(
                "no media found for {}:{}",
                args.id_type.prefix(),
                args.id_value.trim()
            ),
        }),
    }
}

async fn get_season_episodes(
    args: SeasonEpisodesArgs,
    session: Arc<AuthSession>,
) -> Result<EpisodeList, ToolError> {
    let request = RemoteRequest::get(format!(
        "/api/v1/tmdb/{}/{}",
        args.tmdb_id, args.season_number
    ));
    let episodes = fetch_json(&session, request).await?;
    Ok(EpisodeList {
        tmdb_id: args.tmdb_id,
        season_number: args.season_number,
        episodes,
    })
}
