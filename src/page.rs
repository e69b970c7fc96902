//! Pages
//!
//! A page fixes which panels are active, which period list drives them and
//! what the status line says while they load.

use std::fmt;
use std::sync::Arc;

use crate::chart::ChartRenderer;
use crate::client::{TagBoard, TopMetric};
use crate::config::DashboardConfig;
use crate::panel::{
    ChannelDetailPanel, ChannelLeaderboardPanel, Panel, ReachPanel, SearchPanel, StickinessPanel,
    TagLeaderboardPanel, TagSeriesPanel, TagVideoPanel, TopMetricPanel, TrendingListPanel,
    VideoDetailPanel,
};
use crate::state::{MonthKey, Snapshot};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Page {
    Overview,
    Channels,
    Tags,
    /// One tag; `month` is a requested preselection.
    Tag { tag: String, month: Option<MonthKey> },
    Video { id: String },
    Channel { id: String },
}

/// Period list a page is driven by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodAxis {
    Dates,
    Months,
    None,
}

impl Page {
    pub fn axis(&self) -> PeriodAxis {
        match self {
            Page::Overview | Page::Channels => PeriodAxis::Dates,
            Page::Tags | Page::Tag { .. } => PeriodAxis::Months,
            Page::Video { .. } | Page::Channel { .. } => PeriodAxis::None,
        }
    }

    pub fn has_search(&self) -> bool {
        matches!(self, Page::Overview)
    }

    pub fn has_tag_metric(&self) -> bool {
        matches!(self, Page::Tag { .. })
    }

    /// Entity pages need a non-blank id or tag to be opened.
    pub fn is_addressable(&self) -> bool {
        match self {
            Page::Tag { tag, .. } => !tag.trim().is_empty(),
            Page::Video { id } | Page::Channel { id } => !id.trim().is_empty(),
            Page::Overview | Page::Channels | Page::Tags => true,
        }
    }

    pub fn requested_month(&self) -> Option<&MonthKey> {
        match self {
            Page::Tag { month, .. } => month.as_ref(),
            _ => None,
        }
    }

    /// Panels active on this page, in display order.
    pub fn panels(&self, config: &DashboardConfig) -> Vec<Arc<dyn Panel>> {
        let limits = &config.limits;
        match self {
            Page::Overview => vec![
                Arc::new(TopMetricPanel::new(TopMetric::Views, limits.top)),
                Arc::new(TopMetricPanel::new(TopMetric::Likes, limits.top)),
                Arc::new(StickinessPanel::new(limits.top)),
                Arc::new(ReachPanel::new(limits.top)),
                Arc::new(TrendingListPanel::new(limits.trending)),
            ],
            Page::Channels => vec![
                Arc::new(ChannelLeaderboardPanel::daily(limits.channels)),
                Arc::new(ChannelLeaderboardPanel::all_time(limits.channels)),
            ],
            Page::Tags => vec![
                Arc::new(TagLeaderboardPanel::new(TagBoard::Top, limits.tags)),
                Arc::new(TagLeaderboardPanel::new(TagBoard::Rising, limits.tags)),
                Arc::new(TagLeaderboardPanel::new(TagBoard::Falling, limits.tags)),
            ],
            Page::Tag { tag, .. } => {
                let renderer = ChartRenderer {
                    pixel_ratio: config.pixel_ratio,
                    ..ChartRenderer::default()
                };
                vec![
                    Arc::new(TagSeriesPanel::new(tag.clone(), renderer)),
                    Arc::new(TagVideoPanel::new(tag.clone(), limits.tag_videos)),
                ]
            }
            Page::Video { id } => vec![Arc::new(VideoDetailPanel::new(id.clone(), config.country.clone()))],
            Page::Channel { id } => {
                vec![Arc::new(ChannelDetailPanel::new(id.clone(), limits.channel_detail))]
            }
        }
    }

    pub fn search_panel(&self, config: &DashboardConfig) -> Option<Arc<SearchPanel>> {
        self.has_search().then(|| {
            Arc::new(SearchPanel::new(config.limits.search, config.min_query_len, config.debounce))
        })
    }

    pub fn loading_periods(&self) -> Option<&'static str> {
        match self.axis() {
            PeriodAxis::Dates => Some("Loading dates..."),
            PeriodAxis::Months => Some("Loading months..."),
            PeriodAxis::None => None,
        }
    }

    pub fn periods_loaded(&self, n: usize) -> String {
        match self.axis() {
            PeriodAxis::Months => format!("Loaded {} months.", n),
            _ => format!("Loaded {} dates.", n),
        }
    }

    pub fn no_periods(&self) -> &'static str {
        match self.axis() {
            PeriodAxis::Months => "No tag months found.",
            _ => "No US dates found.",
        }
    }

    /// Status while a refresh cycle is in flight.
    pub fn refreshing(&self, snapshot: &Snapshot) -> String {
        let date = snapshot.selected_date.as_ref().map(|d| d.as_str()).unwrap_or("");
        let month = snapshot.selected_month.as_ref().map(|m| m.label()).unwrap_or("");
        match self {
            Page::Overview => format!("Loading dashboards for {}...", date),
            Page::Channels => format!("Loading leaderboards for {}...", date),
            Page::Tags => format!("Loading tag analytics for {}...", month),
            Page::Tag { tag, .. } => format!("Loading {} for {}...", tag, month),
            Page::Video { .. } => "Loading video details...".to_string(),
            Page::Channel { .. } => "Loading channel detail...".to_string(),
        }
    }

    /// Status once every panel of a cycle has settled.
    pub fn done(&self, snapshot: &Snapshot) -> String {
        match (self, snapshot.selected_date.as_ref()) {
            (Page::Overview, Some(date)) => format!("Done. Showing {}.", date),
            _ => "Done.".to_string(),
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Overview => f.write_str("US Trending"),
            Page::Channels => f.write_str("Channels"),
            Page::Tags => f.write_str("Tags"),
            Page::Tag { tag, .. } => write!(f, "Tag: {} (US)", tag),
            Page::Video { id } => write!(f, "Video {}", id),
            Page::Channel { id } => write!(f, "Channel {}", id),
        }
    }
}
