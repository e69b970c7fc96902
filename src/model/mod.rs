//! Row Shapes
//!
//! Typed records returned by the dashboard API. Fields the backend may omit
//! or null out are `Option`s; counts stay raw `Value`s and are formatted at
//! render time. Ids decode loosely so one odd row never sinks a listing.
//! Rows keep the order the backend sent them in.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::format::number;
use crate::state::{MonthKey, SearchScope};

/// One video, as listed by the top/trending/search/channel endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoRow {
    #[serde(deserialize_with = "lenient_text")]
    pub video_id: String,
    pub video_title: Option<String>,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub video_default_thumbnail: Option<String>,
    pub video_view_count: Value,
    pub video_like_count: Value,
    pub video_comment_count: Value,
    pub video_trending_date: Option<String>,
    /// Stickiness: distinct days on the US trending list.
    pub days_trended_us: Value,
    /// Reach: distinct countries the video trended in.
    pub countries_count: Value,
    pub first_trending_us: Option<String>,
    pub last_trending_us: Option<String>,
}

impl VideoRow {
    pub fn title(&self) -> &str {
        self.video_title.as_deref().unwrap_or("(no title)")
    }
}

/// One channel, daily or all-time aggregates depending on the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelRow {
    #[serde(deserialize_with = "lenient_text")]
    pub channel_id: String,
    pub channel_title: Option<String>,
    pub channel_country: Option<String>,
    pub distinct_videos: Value,
    pub appearances: Value,
    pub sum_views: Value,
    pub sum_likes: Value,
    pub sum_comments: Value,
    pub date: Option<String>,
    pub distinct_videos_alltime: Value,
    pub days_active: Value,
    pub appearances_alltime: Value,
    pub sum_views_alltime: Value,
    pub sum_likes_alltime: Value,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub first_trending_us: Option<String>,
    pub last_trending_us: Option<String>,
}

impl ChannelRow {
    /// Title, falling back to the raw id.
    pub fn name(&self) -> &str {
        self.channel_title.as_deref().unwrap_or(&self.channel_id)
    }
}

/// Monthly tag statistics (top, rising and falling boards).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagRow {
    #[serde(deserialize_with = "lenient_text")]
    pub tag: String,
    pub distinct_videos: Value,
    pub total_videos: Value,
    pub video_share: Value,
    pub share_prev: Value,
    pub share_now: Value,
    pub delta: Value,
    /// Ratio of current share to previous share.
    pub lift: Value,
}

/// A video carrying a tag within one month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagVideoRow {
    #[serde(deserialize_with = "lenient_text")]
    pub video_id: String,
    pub video_title: Option<String>,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub video_default_thumbnail: Option<String>,
    pub max_views: Value,
    pub max_likes: Value,
    pub max_comments: Value,
    pub days_trended_in_month: Value,
    pub first_date: Option<String>,
    pub last_date: Option<String>,
}

/// One month of a tag's share time series; `video_share` is in `[0,1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub month: MonthKey,
    #[serde(default, deserialize_with = "lenient_share")]
    pub video_share: f64,
    #[serde(default)]
    pub distinct_videos: Value,
}

impl SeriesPoint {
    pub fn new(month: &str, video_share: f64) -> Self {
        Self {
            month: MonthKey::new(month),
            video_share,
            distinct_videos: Value::Null,
        }
    }
}

/// Video metadata for the detail page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoMeta {
    #[serde(deserialize_with = "lenient_text")]
    pub video_id: String,
    pub video_title: Option<String>,
    #[serde(deserialize_with = "lenient_opt_text")]
    pub channel_id: Option<String>,
    pub channel_title: Option<String>,
    pub video_default_thumbnail: Option<String>,
    pub video_category_id: Option<Value>,
    pub video_duration: Option<String>,
    pub video_definition: Option<String>,
    pub countries_count: Value,
    pub days_trended_us: Value,
    pub first_trending_us: Option<String>,
    pub last_trending_us: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayStat {
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    pub video_view_count: Value,
    pub video_like_count: Value,
    pub video_comment_count: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryDays {
    #[serde(deserialize_with = "lenient_text")]
    pub country: String,
    pub days: Value,
}

/// `{results, count?, scope?}` envelope shared by the list endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Listing<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default, deserialize_with = "lenient_total")]
    pub count: Option<u64>,
    #[serde(default)]
    pub scope: Option<SearchScope>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeriesEnvelope {
    #[serde(default)]
    pub series: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelDetail {
    pub channel: ChannelRow,
    #[serde(default)]
    pub videos: Vec<VideoRow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VideoDetail {
    pub video: VideoMeta,
    #[serde(default)]
    pub history: Vec<DayStat>,
    #[serde(default)]
    pub country_spread_top20: Vec<CountryDays>,
}

/// Missing or non-numeric shares read as 0 so the series stays plottable.
fn lenient_share<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(number).unwrap_or(0.0))
}

/// Ids and keys: `null` becomes empty, numbers are stringified.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(value_text(raw.as_ref()))
}

/// Optional ids: `null` and blank both read as absent.
fn lenient_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let text = value_text(raw.as_ref());
    Ok((!text.trim().is_empty()).then_some(text))
}

/// Result totals: rounded when numeric, absent otherwise.
fn lenient_total<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(number)
        .filter(|n| *n >= 0.0)
        .map(|n| n.round() as u64))
}

/// Raw JSON scalar rendered the way a template literal would (`?? ""`).
pub fn value_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_video_row_tolerates_sparse_rows() {
        let row: VideoRow = serde_json::from_value(json!({
            "video_id": "abc",
            "video_view_count": 1200,
            "video_like_count": null
        }))
        .unwrap();
        assert_eq!(row.video_id, "abc");
        assert_eq!(row.video_view_count, json!(1200));
        assert_eq!(row.video_like_count, Value::Null);
        assert_eq!(row.title(), "(no title)");
    }

    #[test]
    fn test_listing_defaults() {
        let listing: Listing<VideoRow> = serde_json::from_value(json!({})).unwrap();
        assert!(listing.results.is_empty());
        assert_eq!(listing.count, None);

        let listing: Listing<ChannelRow> = serde_json::from_value(json!({
            "results": [{"channel_id": "UC1"}],
            "scope": "all",
            "count": 1
        }))
        .unwrap();
        assert_eq!(listing.scope, Some(SearchScope::All));
        assert_eq!(listing.results[0].name(), "UC1");
    }

    #[test]
    fn test_series_point_missing_share_is_zero() {
        let env: SeriesEnvelope = serde_json::from_value(json!({
            "series": [
                {"month": "2024-01-01"},
                {"month": "2024-02-01", "video_share": 0.25},
                {"month": "2024-03-01", "video_share": null}
            ]
        }))
        .unwrap();
        assert_eq!(env.series[0].video_share, 0.0);
        assert_eq!(env.series[1].month.label(), "2024-02");
        assert_eq!(env.series[2].video_share, 0.0);
    }

    #[test]
    fn test_null_id_and_loose_counts_still_decode() {
        let listing: Listing<ChannelRow> = serde_json::from_value(json!({
            "results": [
                {"channel_id": null, "channel_title": "Orphan"},
                {"channel_id": 42, "days_active": 2.0, "sum_views": "n/a"}
            ],
            "count": 2.0
        }))
        .unwrap();
        assert_eq!(listing.count, Some(2));
        assert_eq!(listing.results[0].channel_id, "");
        assert_eq!(listing.results[0].name(), "Orphan");
        assert_eq!(listing.results[1].channel_id, "42");
        assert_eq!(listing.results[1].days_active, json!(2.0));
        assert_eq!(listing.results[1].sum_views, json!("n/a"));
    }

    #[test]
    fn test_blank_channel_on_video_reads_as_absent() {
        let row: VideoRow = serde_json::from_value(json!({
            "video_id": 7,
            "channel_id": "",
            "video_view_count": 12.0
        }))
        .unwrap();
        assert_eq!(row.video_id, "7");
        assert_eq!(row.channel_id, None);
    }

    #[test]
    fn test_series_share_accepts_numeric_strings() {
        let env: SeriesEnvelope = serde_json::from_value(json!({
            "series": [{"month": "2024-01-01", "video_share": "0.5"}]
        }))
        .unwrap();
        assert_eq!(env.series[0].video_share, 0.5);
    }

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(Some(&json!(24))), "24");
        assert_eq!(value_text(Some(&json!("hd"))), "hd");
        assert_eq!(value_text(Some(&Value::Null)), "");
        assert_eq!(value_text(None), "");
    }
}
