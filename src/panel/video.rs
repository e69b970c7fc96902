//! Daily video leaderboards: top by views/likes, stickiness, reach and the
//! full trending list.

use async_trait::async_trait;
use serde_json::Value;

use super::{date_bound, render_with, Dataset, Kpi, Panel, PanelResult, PanelView, ResultMeta, Table, TableRow};
use crate::client::{fetch_as, AdvancedMetric, ClientError, Endpoint, JsonSource, TopMetric};
use crate::format::format_count;
use crate::model::{Listing, VideoRow};
use crate::page::Page;
use crate::state::{DateKey, Snapshot};

const NO_ROWS: &str = "No rows.";

/// Extra metric column appended to the standard video table.
type Extra = (&'static str, fn(&VideoRow) -> &Value);

fn days_trended(v: &VideoRow) -> &Value {
    &v.days_trended_us
}

fn countries(v: &VideoRow) -> &Value {
    &v.countries_count
}

fn video_table(rows: &[VideoRow], extra: Option<Extra>, note: Option<String>) -> PanelView {
    let mut columns = vec!["Video", "Views", "Likes", "Comments"];
    if let Some((label, _)) = extra {
        columns.push(label);
    }
    let mut table = Table::new(columns);
    table.note = note;

    for v in rows {
        let headline = match v.channel_title.as_deref() {
            Some(channel) if !channel.is_empty() => format!("{} · {}", v.title(), channel),
            _ => v.title().to_string(),
        };
        let mut cells = vec![
            headline,
            format_count(&v.video_view_count),
            format_count(&v.video_like_count),
            format_count(&v.video_comment_count),
        ];
        if let Some((_, field)) = extra {
            cells.push(format_count(field(v)));
        }
        table.push(TableRow::new(cells).linked(Page::Video { id: v.video_id.clone() }));
    }
    PanelView::Table(table)
}

async fn fetch_videos(source: &dyn JsonSource, endpoint: Endpoint) -> Result<(Dataset, ResultMeta), ClientError> {
    let listing: Listing<VideoRow> = fetch_as(source, &endpoint).await?;
    Ok((Dataset::Videos(listing.results), ResultMeta { count: listing.count }))
}

fn selected_date(snapshot: &Snapshot) -> Result<DateKey, ClientError> {
    snapshot
        .selected_date
        .clone()
        .ok_or_else(|| ClientError::decode("No date available."))
}

fn lead(result: &PanelResult) -> Option<&VideoRow> {
    match result.data() {
        Some(Dataset::Videos(rows)) => rows.first(),
        _ => None,
    }
}

/// Top-N videos of the selected date ranked by views or likes.
pub struct TopMetricPanel {
    id: String,
    metric: TopMetric,
    limit: u32,
}

impl TopMetricPanel {
    pub fn new(metric: TopMetric, limit: u32) -> Self {
        Self {
            id: format!("top_{}", metric.as_str()),
            metric,
            limit,
        }
    }
}

#[async_trait]
impl Panel for TopMetricPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> String {
        format!("Top {} by {}", self.limit, self.metric.as_str())
    }

    fn refetch_on(&self, change: crate::state::Change) -> bool {
        date_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = match selected_date(snapshot) {
            Ok(date) => {
                fetch_videos(source, Endpoint::Top { metric: self.metric, date, limit: self.limit }).await
            }
            Err(e) => Err(e),
        };
        PanelResult::settle(&self.id, outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, NO_ROWS, |data, _| match data {
            Dataset::Videos(rows) => video_table(
                rows,
                None,
                Some(format!(
                    "Top {} videos trending in the US that day, ranked by {}.",
                    self.limit,
                    self.metric.as_str()
                )),
            ),
            _ => PanelView::Message(NO_ROWS.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(v) = lead(result) else { return Vec::new() };
        match self.metric {
            TopMetric::Views => vec![
                Kpi::new("Most viewed", v.title()),
                Kpi::new("Views", format_count(&v.video_view_count)),
            ],
            TopMetric::Likes => vec![
                Kpi::new("Most liked", v.title()),
                Kpi::new("Likes", format_count(&v.video_like_count)),
            ],
        }
    }
}

/// Videos of the selected date ranked by distinct US trending days.
pub struct StickinessPanel {
    limit: u32,
}

impl StickinessPanel {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Panel for StickinessPanel {
    fn id(&self) -> &str {
        "top_stickiness"
    }

    fn title(&self) -> String {
        format!("Top {} by stickiness", self.limit)
    }

    fn refetch_on(&self, change: crate::state::Change) -> bool {
        date_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = match selected_date(snapshot) {
            Ok(date) => {
                let endpoint = Endpoint::TopAdvanced {
                    metric: AdvancedMetric::Stickiness,
                    date,
                    limit: self.limit,
                };
                fetch_videos(source, endpoint).await
            }
            Err(e) => Err(e),
        };
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, NO_ROWS, |data, _| match data {
            Dataset::Videos(rows) => {
                video_table(rows, Some(("Days trended (US)", days_trended)), None)
            }
            _ => PanelView::Message(NO_ROWS.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        lead(result)
            .map(|v| {
                vec![
                    Kpi::new("Stickiest video", v.title()),
                    Kpi::new("Days trended (US)", format_count(&v.days_trended_us)),
                ]
            })
            .unwrap_or_default()
    }
}

/// Videos of the selected date ranked by the number of countries reached.
pub struct ReachPanel {
    limit: u32,
}

impl ReachPanel {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Panel for ReachPanel {
    fn id(&self) -> &str {
        "top_reach"
    }

    fn title(&self) -> String {
        format!("Top {} by reach", self.limit)
    }

    fn refetch_on(&self, change: crate::state::Change) -> bool {
        date_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = match selected_date(snapshot) {
            Ok(date) => {
                let endpoint = Endpoint::TopAdvanced {
                    metric: AdvancedMetric::Reach,
                    date,
                    limit: self.limit,
                };
                fetch_videos(source, endpoint).await
            }
            Err(e) => Err(e),
        };
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, NO_ROWS, |data, _| match data {
            Dataset::Videos(rows) => video_table(rows, Some(("Countries", countries)), None),
            _ => PanelView::Message(NO_ROWS.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        lead(result)
            .map(|v| {
                vec![
                    Kpi::new("Widest reach", v.title()),
                    Kpi::new("Countries", format_count(&v.countries_count)),
                ]
            })
            .unwrap_or_default()
    }
}

/// The full daily trending list (up to 200 rows), ranked by views.
pub struct TrendingListPanel {
    limit: u32,
}

impl TrendingListPanel {
    pub fn new(limit: u32) -> Self {
        Self { limit }
    }
}

#[async_trait]
impl Panel for TrendingListPanel {
    fn id(&self) -> &str {
        "trending"
    }

    fn title(&self) -> String {
        format!("Trending (top {})", self.limit)
    }

    fn refetch_on(&self, change: crate::state::Change) -> bool {
        date_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = match selected_date(snapshot) {
            Ok(date) => fetch_videos(source, Endpoint::Trending { date, limit: self.limit }).await,
            Err(e) => Err(e),
        };
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, NO_ROWS, |data, _| match data {
            Dataset::Videos(rows) => video_table(
                rows,
                None,
                Some(format!("Top {} daily US trending list, ranked by views.", self.limit)),
            ),
            _ => PanelView::Message(NO_ROWS.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(v) = lead(result) else { return Vec::new() };
        let total = result
            .meta()
            .and_then(|m| m.count)
            .or_else(|| result.data().map(|d| d.len() as u64));
        vec![
            Kpi::new("Trending videos", total.map(|n| format_count(&n.into())).unwrap_or_default()),
            Kpi::new("Top trending", v.title()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Periods, SelectionState};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct Recorder {
        body: Result<Value, ClientError>,
        urls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl JsonSource for Recorder {
        async fn fetch_json(&self, url: &str) -> Result<Value, ClientError> {
            self.urls.lock().unwrap().push(url.to_string());
            self.body.clone()
        }
    }

    fn snapshot() -> Snapshot {
        let periods = Periods::new(vec![DateKey::new("2024-03-01")]);
        let mut state = SelectionState::new();
        state.select_date(DateKey::new("2024-03-01"), &periods).unwrap();
        state.snapshot()
    }

    fn rows() -> Value {
        json!({"results": [
            {"video_id": "v1", "video_title": "First", "channel_title": "Chan",
             "video_view_count": 1500000, "video_like_count": 2000, "video_comment_count": 10,
             "days_trended_us": 7, "countries_count": 31},
            {"video_id": "v2", "video_title": "Second", "video_view_count": 900}
        ], "count": 2})
    }

    #[tokio::test]
    async fn test_top_views_fetch_render_kpis() {
        let source = Recorder { body: Ok(rows()), urls: Mutex::new(vec![]) };
        let panel = TopMetricPanel::new(TopMetric::Views, 20);
        let result = panel.fetch(&source, &snapshot()).await;

        assert_eq!(
            source.urls.lock().unwrap().as_slice(),
            ["/api/us/top?metric=views&date=2024-03-01&limit=20"]
        );

        let view = panel.render(&result);
        let table = view.as_table().unwrap();
        assert_eq!(table.columns, vec!["Video", "Views", "Likes", "Comments"]);
        assert_eq!(table.rows[0].cells[0], "First · Chan");
        assert_eq!(table.rows[0].cells[1], "1,500,000");
        assert_eq!(table.rows[1].cells[0], "Second");
        assert_eq!(table.rows[0].target, Some(Page::Video { id: "v1".into() }));

        let kpis = panel.derive_kpis(&result);
        assert_eq!(kpis, vec![Kpi::new("Most viewed", "First"), Kpi::new("Views", "1,500,000")]);
    }

    #[tokio::test]
    async fn test_extra_columns() {
        let source = Recorder { body: Ok(rows()), urls: Mutex::new(vec![]) };

        let sticky = StickinessPanel::new(20);
        let view = sticky.render(&sticky.fetch(&source, &snapshot()).await);
        let table = view.as_table().unwrap();
        assert_eq!(table.columns.last().unwrap(), "Days trended (US)");
        assert_eq!(table.rows[0].cells[4], "7");
        assert_eq!(table.rows[1].cells[4], "");

        let reach = ReachPanel::new(20);
        let view = reach.render(&reach.fetch(&source, &snapshot()).await);
        assert_eq!(view.as_table().unwrap().rows[0].cells[4], "31");
    }

    #[tokio::test]
    async fn test_zero_rows_render_placeholder() {
        let source = Recorder { body: Ok(json!({"results": []})), urls: Mutex::new(vec![]) };
        let panel = TopMetricPanel::new(TopMetric::Likes, 20);
        let result = panel.fetch(&source, &snapshot()).await;
        assert_eq!(result, PanelResult::Empty);
        assert_eq!(panel.render(&result), PanelView::Message("No rows.".into()));
        assert!(panel.derive_kpis(&result).is_empty());
    }

    #[tokio::test]
    async fn test_failure_renders_error_text() {
        let source = Recorder {
            body: Err(ClientError::http(500, "Internal Server Error", "db locked")),
            urls: Mutex::new(vec![]),
        };
        let panel = TrendingListPanel::new(200);
        let result = panel.fetch(&source, &snapshot()).await;
        assert_eq!(
            panel.render(&result),
            PanelView::Failed("500 Internal Server Error - db locked".into())
        );
        assert!(panel.derive_kpis(&result).is_empty());
    }

    #[tokio::test]
    async fn test_trending_kpi_uses_backend_count() {
        let source = Recorder { body: Ok(rows()), urls: Mutex::new(vec![]) };
        let panel = TrendingListPanel::new(200);
        let result = panel.fetch(&source, &snapshot()).await;
        let kpis = panel.derive_kpis(&result);
        assert_eq!(kpis[0], Kpi::new("Trending videos", "2"));
        assert_eq!(kpis[1], Kpi::new("Top trending", "First"));
    }

    #[tokio::test]
    async fn test_missing_date_is_an_error_not_a_request() {
        let source = Recorder { body: Ok(rows()), urls: Mutex::new(vec![]) };
        let panel = ReachPanel::new(20);
        let result = panel.fetch(&source, &SelectionState::new().snapshot()).await;
        assert!(result.is_error());
        assert!(source.urls.lock().unwrap().is_empty());
    }
}
