//! Panel System
//!
//! A panel is one independently fetchable dashboard region bound to one or
//! more backend endpoints. It knows how to request data for a
//! [`Snapshot`], how to turn the outcome into a render-ready [`PanelView`],
//! and how to summarize its lead row as KPIs.
//!
//! Rows are shown in the order the backend returns them. Ranking happens
//! server-side; nothing in this module re-sorts.

mod channels;
mod detail;
mod search;
mod tags;
mod video;
mod view;

pub use channels::{ChannelBoard, ChannelLeaderboardPanel};
pub use detail::{ChannelDetailPanel, VideoDetailPanel};
pub use search::{SearchHits, SearchPanel, SearchResults};
pub use tags::{TagLeaderboardPanel, TagSeriesPanel, TagVideoPanel};
pub use video::{ReachPanel, StickinessPanel, TopMetricPanel, TrendingListPanel};
pub use view::{Card, ChartView, Link, PanelView, Table, TableRow};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{ClientError, JsonSource};
use crate::model::{
    ChannelDetail, ChannelRow, SeriesPoint, TagRow, TagVideoRow, VideoDetail, VideoRow,
};
use crate::state::{Change, MonthKey, Snapshot, TagMetric};

/// A single headline figure derived from a panel's lead row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub label: String,
    pub value: String,
}

impl Kpi {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Rows decoded by a panel, one variant per endpoint family.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    Videos(Vec<VideoRow>),
    Channels(Vec<ChannelRow>),
    Tags { rows: Vec<TagRow>, month: MonthKey },
    TagVideos { rows: Vec<TagVideoRow>, metric: TagMetric },
    Series { points: Vec<SeriesPoint>, highlight: Option<MonthKey> },
    Search(SearchResults),
    ChannelDetail(Box<ChannelDetail>),
    VideoDetail(Box<VideoDetail>),
}

impl Dataset {
    /// Number of primary rows; detail records always count as one.
    pub fn len(&self) -> usize {
        match self {
            Dataset::Videos(rows) => rows.len(),
            Dataset::Channels(rows) => rows.len(),
            Dataset::Tags { rows, .. } => rows.len(),
            Dataset::TagVideos { rows, .. } => rows.len(),
            Dataset::Series { points, .. } => points.len(),
            Dataset::Search(results) => results.hits.len(),
            Dataset::ChannelDetail(_) | Dataset::VideoDetail(_) => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Response metadata kept next to the rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultMeta {
    /// Backend-reported `count`, when the endpoint sends one.
    pub count: Option<u64>,
}

/// Outcome of one panel fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelResult {
    Loading,
    Empty,
    Error(String),
    Ready { data: Dataset, meta: ResultMeta },
}

impl PanelResult {
    /// Settle a fetch outcome: zero rows is a display state, not a failure.
    pub fn settle(panel: &str, outcome: Result<(Dataset, ResultMeta), ClientError>) -> Self {
        match outcome {
            Ok((data, _)) if data.is_empty() => PanelResult::Empty,
            Ok((data, meta)) => PanelResult::Ready { data, meta },
            Err(e) => {
                warn!("Panel '{}' failed: {}", panel, e);
                PanelResult::Error(e.display_text())
            }
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PanelResult::Error(_))
    }

    pub fn data(&self) -> Option<&Dataset> {
        match self {
            PanelResult::Ready { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn meta(&self) -> Option<&ResultMeta> {
        match self {
            PanelResult::Ready { meta, .. } => Some(meta),
            _ => None,
        }
    }
}

/// Contract shared by every dashboard region.
#[async_trait]
pub trait Panel: Send + Sync {
    /// Stable identifier, unique within a page.
    fn id(&self) -> &str;

    fn title(&self) -> String;

    /// Whether a state change invalidates this panel's data.
    fn refetch_on(&self, change: Change) -> bool;

    /// Request data for `snapshot`. Failures are folded into the result.
    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult;

    /// Turn a result into what the front-end draws.
    fn render(&self, result: &PanelResult) -> PanelView;

    /// Headline figures from the lead row; empty unless the result is ready.
    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi>;
}

/// Shared success/empty/error handling; `ready` draws the data itself.
pub(crate) fn render_with(
    result: &PanelResult,
    empty_text: &str,
    ready: impl FnOnce(&Dataset, &ResultMeta) -> PanelView,
) -> PanelView {
    match result {
        PanelResult::Loading => PanelView::Loading,
        PanelResult::Empty => PanelView::Message(empty_text.to_string()),
        PanelResult::Error(message) => PanelView::Failed(message.clone()),
        PanelResult::Ready { data, meta } => ready(data, meta),
    }
}

/// Refetch rule for panels bound to the selected date.
pub(crate) fn date_bound(change: Change) -> bool {
    matches!(change, Change::Boot | Change::Refresh | Change::Date)
}

/// Refetch rule for panels bound to the selected month.
pub(crate) fn month_bound(change: Change) -> bool {
    matches!(change, Change::Boot | Change::Refresh | Change::Month)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle_empty_rows() {
        let result = PanelResult::settle("t", Ok((Dataset::Videos(vec![]), ResultMeta::default())));
        assert_eq!(result, PanelResult::Empty);
    }

    #[test]
    fn test_settle_error_text() {
        let result = PanelResult::settle("t", Err(ClientError::http(503, "Service Unavailable", "down")));
        assert_eq!(result, PanelResult::Error("503 Service Unavailable - down".into()));
        assert!(result.is_error());
    }

    #[test]
    fn test_render_with_states() {
        let view = render_with(&PanelResult::Loading, "No rows.", |_, _| PanelView::Loading);
        assert_eq!(view, PanelView::Loading);

        let view = render_with(&PanelResult::Empty, "No rows.", |_, _| PanelView::Loading);
        assert_eq!(view, PanelView::Message("No rows.".into()));

        let view = render_with(&PanelResult::Error("x".into()), "No rows.", |_, _| PanelView::Loading);
        assert_eq!(view, PanelView::Failed("x".into()));
    }

    #[test]
    fn test_refetch_rules() {
        assert!(date_bound(Change::Date));
        assert!(!date_bound(Change::SearchQuery));
        assert!(month_bound(Change::Month));
        assert!(!month_bound(Change::Date));
    }
}
