//! Backend endpoint catalogue.
//!
//! Every identity that lands in a URL (ids, tags, free text, dates) is
//! percent-encoded here and nowhere else.

use urlencoding::encode;

use crate::state::{DateKey, MonthKey, SearchScope, SearchType, TagMetric};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopMetric {
    Views,
    Likes,
}

impl TopMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            TopMetric::Views => "views",
            TopMetric::Likes => "likes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvancedMetric {
    Stickiness,
    Reach,
}

impl AdvancedMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdvancedMetric::Stickiness => "stickiness",
            AdvancedMetric::Reach => "reach",
        }
    }
}

/// Which monthly tag leaderboard to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagBoard {
    Top,
    Rising,
    Falling,
}

impl TagBoard {
    pub fn as_str(&self) -> &'static str {
        match self {
            TagBoard::Top => "top",
            TagBoard::Rising => "rising",
            TagBoard::Falling => "falling",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Dates,
    Top { metric: TopMetric, date: DateKey, limit: u32 },
    TopAdvanced { metric: AdvancedMetric, date: DateKey, limit: u32 },
    Trending { date: DateKey, limit: u32 },
    Search {
        kind: SearchType,
        query: String,
        scope: SearchScope,
        date: Option<DateKey>,
        limit: u32,
    },
    ChannelsDaily { date: DateKey, limit: u32 },
    ChannelsAllTime { limit: u32 },
    Channel { id: String, limit: u32 },
    Video { id: String, country: String },
    TagMonths,
    Tags { board: TagBoard, month: MonthKey, limit: u32 },
    TagSeries { tag: String },
    TagVideos { tag: String, month: MonthKey, metric: TagMetric, limit: u32 },
}

impl Endpoint {
    /// Path and query string, relative to the backend root.
    pub fn url(&self) -> String {
        match self {
            Endpoint::Dates => "/api/us/dates".to_string(),
            Endpoint::Top { metric, date, limit } => format!(
                "/api/us/top?metric={}&date={}&limit={}",
                metric.as_str(),
                encode(date.as_str()),
                limit
            ),
            Endpoint::TopAdvanced { metric, date, limit } => format!(
                "/api/us/top_advanced?metric={}&date={}&limit={}",
                metric.as_str(),
                encode(date.as_str()),
                limit
            ),
            Endpoint::Trending { date, limit } => format!(
                "/api/us/trending?date={}&limit={}",
                encode(date.as_str()),
                limit
            ),
            Endpoint::Search { kind, query, scope, date, limit } => {
                let path = match kind {
                    SearchType::Videos => "/api/us/search/videos",
                    SearchType::Channels => "/api/us/search/channels",
                };
                match (scope, date) {
                    (SearchScope::Day, Some(date)) => format!(
                        "{}?q={}&scope=day&date={}&limit={}",
                        path,
                        encode(query),
                        encode(date.as_str()),
                        limit
                    ),
                    (SearchScope::Day, None) => {
                        format!("{}?q={}&scope=day&limit={}", path, encode(query), limit)
                    }
                    (SearchScope::All, _) => {
                        format!("{}?q={}&scope=all&limit={}", path, encode(query), limit)
                    }
                }
            }
            Endpoint::ChannelsDaily { date, limit } => format!(
                "/api/us/channels/daily?date={}&limit={}",
                encode(date.as_str()),
                limit
            ),
            Endpoint::ChannelsAllTime { limit } => {
                format!("/api/us/channels/alltime?limit={}", limit)
            }
            Endpoint::Channel { id, limit } => {
                format!("/api/us/channel/{}?limit={}", encode(id), limit)
            }
            Endpoint::Video { id, country } => {
                format!("/api/video/{}?country={}", encode(id), encode(country))
            }
            Endpoint::TagMonths => "/api/us/tags/months".to_string(),
            Endpoint::Tags { board, month, limit } => format!(
                "/api/us/tags/{}?month={}&limit={}",
                board.as_str(),
                encode(month.as_str()),
                limit
            ),
            Endpoint::TagSeries { tag } => format!("/api/us/tags/series?tag={}", encode(tag)),
            Endpoint::TagVideos { tag, month, metric, limit } => format!(
                "/api/us/tags/videos?tag={}&month={}&metric={}&limit={}",
                encode(tag),
                encode(month.as_str()),
                metric.as_str(),
                limit
            ),
        }
    }
}

/// External link to a video on the hosting platform. Ids are not validated.
pub fn video_link(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", encode(id))
}

/// External link to a channel on the hosting platform.
pub fn channel_link(id: &str) -> String {
    format!("https://www.youtube.com/channel/{}", encode(id))
}
