use super::fetch_json;
use super::media::MediaList;
use super::models::MediaItem;
use crate::catalog::ToolDefinition;
use crate::error::ToolError;
use anyhow::Result;
use moviepilot_client::{AuthSession, RemoteRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Recommendation lists served under `/api/v1/recommend/{source}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendSource {
    TmdbTrending,
    TmdbMovies,
    TmdbTvs,
    DoubanMovieHot,
    DoubanTvHot,
    DoubanMovieShowing,
    DoubanMovies,
    DoubanTvs,
    DoubanMovieTop250,
    DoubanTvWeeklyChinese,
    DoubanTvWeeklyGlobal,
    DoubanTvAnimation,
    BangumiCalendar,
}

impl RecommendSource {
    pub fn path(&self) -> String {
        let segment = match self {
            RecommendSource::TmdbTrending => "tmdb_trending",
            RecommendSource::TmdbMovies => "tmdb_movies",
            RecommendSource::TmdbTvs => "tmdb_tvs",
            RecommendSource::DoubanMovieHot => "douban_movie_hot",
            RecommendSource::DoubanTvHot => "douban_tv_hot",
            RecommendSource::DoubanMovieShowing => "douban_movie_showing",
            RecommendSource::DoubanMovies => "douban_movies",
            RecommendSource::DoubanTvs => "douban_tvs",
            RecommendSource::DoubanMovieTop250 => "douban_movie_top250",
            RecommendSource::DoubanTvWeeklyChinese => "douban_tv_weekly_chinese",
            RecommendSource::DoubanTvWeeklyGlobal => "douban_tv_weekly_global",
            RecommendSource::DoubanTvAnimation => "douban_tv_animation",
            RecommendSource::BangumiCalendar => "bangumi_calendar",
        };
        format!("/api/v1/recommend/{segment}")
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RecommendationsArgs {
    pub source: RecommendSource,
    #[serde(default)]
    #[schemars(range(min = 1))]
    pub page: Option<u32>,
}

pub fn list_recommendations_tool() -> Result<ToolDefinition> {
    ToolDefinition::new(
        "list_recommendations",
        "List trending and recommended media from tmdb, douban or bangumi",
        list_recommendations,
    )
}

async fn list_recommendations(
    args: RecommendationsArgs,
    session: Arc<AuthSession>,
) -> Result<MediaList, ToolError> {
    let request = RemoteRequest::get(args.source.path()).query("page", args.page.unwrap_or(1));
    let items: Vec<MediaItem> = fetch_json(&session, request).await?;
    Ok(MediaList { items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_paths_match_serde_names() {
        for source in [
            RecommendSource::TmdbTrending,
            RecommendSource::DoubanMovieTop250,
            RecommendSource::DoubanTvWeeklyChinese,
            RecommendSource::BangumiCalendar,
        ] {
            let name = serde_json::to_value(source).unwrap();
            let name = name.as_str().unwrap();
            assert_eq!(source.path(), format!("/api/v1/recommend/{name}"));
        }
        let s: RecommendSource = serde_json::from_value(json!("douban_movie_top250")).unwrap();
        assert_eq!(s, RecommendSource::DoubanMovieTop250);
    }
}
