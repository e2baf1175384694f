//! Typed views of MoviePilot responses.
//!
//! Only the fields tools act on are named; everything else the server sends is
//! kept in `extra` and returned to the caller unchanged. Named fields are
//! [`Field`]s so that an explicit `null` survives the round trip.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `None` when the server omitted the key, `Some(None)` when it sent `null`.
pub type Field<T> = Option<Option<T>>;

fn present<T>(field: &Field<T>) -> Option<&T> {
    field.as_ref().and_then(Option::as_ref)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MediaType {
    #[serde(rename = "电影")]
    Movie,
    #[serde(rename = "电视剧")]
    Tv,
}

impl MediaType {
    /// The label MoviePilot uses in `type` fields and `type_name` parameters.
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "电影",
            MediaType::Tv => "电视剧",
        }
    }

    pub fn matches(&self, label: Option<&str>) -> bool {
        label.map(str::trim) == Some(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MediaItem {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub title: Field<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub media_type: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub year: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub tmdb_id: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub douban_id: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub bangumi_id: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<f64>")]
    pub vote_average: Field<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub overview: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MediaItem {
    /// MoviePilot answers unknown ids with an all-empty media object.
    pub fn is_empty(&self) -> bool {
        present(&self.title).is_none_or(|t| t.is_empty())
            && present(&self.tmdb_id).is_none()
            && present(&self.douban_id).is_none()
            && present(&self.bangumi_id).is_none()
    }

    pub fn type_label(&self) -> Option<&str> {
        present(&self.media_type).map(String::as_str)
    }

    pub fn year_is(&self, year: u32) -> bool {
        present(&self.year).and_then(|y| y.trim().parse::<u32>().ok()) == Some(year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PersonItem {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub name: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub source: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub character: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub profile_path: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Episode {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub episode_number: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub name: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub air_date: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub runtime: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub overview: Field<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Subscription {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub id: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub name: Field<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub media_type: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub year: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub season: Field<i64>,
    /// N: new, R: running, P: pending, S: paused
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub state: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub total_episode: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub lack_episode: Field<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Subscription {
    pub fn type_label(&self) -> Option<&str> {
        present(&self.media_type).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DownloadTask {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub hash: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub title: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub name: Field<String>,
    /// percent, 0 to 100
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<f64>")]
    pub progress: Field<f64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<String>")]
    pub state: Field<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<f64>")]
    pub size: Field<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LibraryStatistics {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub movie_count: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub tv_count: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub episode_count: Field<i64>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "::serde_with::rust::double_option"
    )]
    #[schemars(with = "Option<i64>")]
    pub user_count: Field<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_media_item_keeps_unknown_fields() {
        let raw = json!({
            "title": "沙丘",
            "type": "电影",
            "year": "2021",
            "tmdb_id": 438631,
            "poster_path": "https://image.tmdb.org/t/p/w500/x.jpg",
            "genre_ids": [878, 12]
        });
        let item: MediaItem = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(item.tmdb_id, Some(Some(438631)));
        assert!(item.extra.contains_key("genre_ids"));
        assert!(item.year_is(2021));
        assert!(!item.year_is(2020));
        assert!(MediaType::Movie.matches(item.type_label()));
        assert!(!MediaType::Tv.matches(item.type_label()));
        assert_eq!(serde_json::to_value(&item).unwrap(), raw);
    }

    #[test]
    fn test_empty_media_item() {
        let item: MediaItem = serde_json::from_value(json!({"title": "", "detail_link": null})).unwrap();
        assert!(item.is_empty());
        let item: MediaItem = serde_json::from_value(json!({"douban_id": "1234"})).unwrap();
        assert!(!item.is_empty());
    }

    #[test]
    fn test_explicit_nulls_survive() {
        let raw = json!({"movie_count": null, "tv_count": 12, "storage": null});
        let stats: LibraryStatistics = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(stats.movie_count, Some(None));
        assert_eq!(stats.episode_count, None);
        assert_eq!(serde_json::to_value(&stats).unwrap(), raw);

        let item: MediaItem = serde_json::from_value(json!({"title": null, "year": null})).unwrap();
        assert!(item.is_empty());
        assert!(!item.year_is(2021));
        assert_eq!(
            serde_json::to_value(&item).unwrap(),
            json!({"title": null, "year": null})
        );
    }

    #[test]
    fn test_media_type_labels() {
        assert_eq!(serde_json::to_value(MediaType::Tv).unwrap(), json!("电视剧"));
        let t: MediaType = serde_json::from_value(json!("电影")).unwrap();
        assert_eq!(t, MediaType::Movie);
        assert!(serde_json::from_value::<MediaType>(json!("movie")).is_err());
    }
}
