//! Tag analytics: monthly leaderboards, one tag's share series and the
//! tag's top videos for the selected month.

use async_trait::async_trait;

use super::{month_bound, render_with, ChartView, Dataset, Kpi, Panel, PanelResult, PanelView, ResultMeta, Table, TableRow};
use crate::chart::ChartRenderer;
use crate::client::{fetch_as, ClientError, Endpoint, JsonSource, TagBoard};
use crate::format::{date_range, format_count, format_share, lift, share};
use crate::model::{Listing, SeriesEnvelope, SeriesPoint, TagRow, TagVideoRow};
use crate::page::Page;
use crate::state::{Change, MonthKey, Snapshot, TagMetric};

const NO_SERIES_ROWS: &str = "No time-series rows found for this tag.";

fn selected_month(snapshot: &Snapshot) -> Result<MonthKey, ClientError> {
    snapshot
        .selected_month
        .clone()
        .ok_or_else(|| ClientError::decode("No month available."))
}

/// `Range: a → b | Latest share: x | Latest distinct videos: n`.
pub fn series_summary(points: &[SeriesPoint]) -> String {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(
            "Range: {} → {} | Latest share: {} | Latest distinct videos: {}",
            first.month.label(),
            last.month.label(),
            share(last.video_share),
            format_count(&last.distinct_videos)
        ),
        _ => NO_SERIES_ROWS.to_string(),
    }
}

/// Top, rising or falling tags for the selected month.
pub struct TagLeaderboardPanel {
    id: String,
    board: TagBoard,
    limit: u32,
}

impl TagLeaderboardPanel {
    pub fn new(board: TagBoard, limit: u32) -> Self {
        Self {
            id: format!("tags_{}", board.as_str()),
            board,
            limit,
        }
    }

    fn table(&self, rows: &[TagRow], month: &MonthKey) -> Table {
        let mut table = match self.board {
            TagBoard::Top => Table::new(["Tag", "Distinct videos", "Total videos (month)", "Share"]),
            TagBoard::Rising | TagBoard::Falling => {
                Table::new(["Tag", "Prev share", "Now share", "Δ share", "Lift"])
            }
        };
        for r in rows {
            let cells = match self.board {
                TagBoard::Top => vec![
                    r.tag.clone(),
                    format_count(&r.distinct_videos),
                    format_count(&r.total_videos),
                    format_share(&r.video_share),
                ],
                TagBoard::Rising | TagBoard::Falling => vec![
                    r.tag.clone(),
                    format_share(&r.share_prev),
                    format_share(&r.share_now),
                    format_share(&r.delta),
                    lift(&r.lift),
                ],
            };
            let target = Page::Tag {
                tag: r.tag.clone(),
                month: Some(month.clone()),
            };
            table.push(TableRow::new(cells).linked(target));
        }
        table
    }
}

#[async_trait]
impl Panel for TagLeaderboardPanel {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> String {
        match self.board {
            TagBoard::Top => "Top tags".to_string(),
            TagBoard::Rising => "Rising tags".to_string(),
            TagBoard::Falling => "Falling tags".to_string(),
        }
    }

    fn refetch_on(&self, change: Change) -> bool {
        month_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = async {
            let month = selected_month(snapshot)?;
            let endpoint = Endpoint::Tags {
                board: self.board,
                month: month.clone(),
                limit: self.limit,
            };
            let listing: Listing<TagRow> = fetch_as(source, &endpoint).await?;
            Ok::<_, ClientError>((
                Dataset::Tags { rows: listing.results, month },
                ResultMeta { count: listing.count },
            ))
        }
        .await;
        PanelResult::settle(&self.id, outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, "No tags for this month.", |data, _| match data {
            Dataset::Tags { rows, month } => PanelView::Table(self.table(rows, month)),
            _ => PanelView::Message("No tags for this month.".to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(Dataset::Tags { rows, .. }) = result.data() else {
            return Vec::new();
        };
        let Some(lead) = rows.first() else { return Vec::new() };
        match self.board {
            TagBoard::Top => vec![
                Kpi::new("Top tag", lead.tag.clone()),
                Kpi::new("Share", format_share(&lead.video_share)),
            ],
            TagBoard::Rising => vec![
                Kpi::new("Fastest rising", lead.tag.clone()),
                Kpi::new("Δ share", format_share(&lead.delta)),
            ],
            TagBoard::Falling => vec![
                Kpi::new("Fastest falling", lead.tag.clone()),
                Kpi::new("Δ share", format_share(&lead.delta)),
            ],
        }
    }
}

/// Monthly share series of one tag, drawn as a line chart with the
/// selected month highlighted.
pub struct TagSeriesPanel {
    tag: String,
    renderer: ChartRenderer,
}

impl TagSeriesPanel {
    pub fn new(tag: impl Into<String>, renderer: ChartRenderer) -> Self {
        Self {
            tag: tag.into(),
            renderer,
        }
    }
}

#[async_trait]
impl Panel for TagSeriesPanel {
    fn id(&self) -> &str {
        "tag_series"
    }

    fn title(&self) -> String {
        format!("Share of US trending videos tagged '{}'", self.tag)
    }

    fn refetch_on(&self, change: Change) -> bool {
        month_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let endpoint = Endpoint::TagSeries { tag: self.tag.clone() };
        let outcome = fetch_as::<SeriesEnvelope>(source, &endpoint).await.map(|env| {
            let dataset = Dataset::Series {
                points: env.series,
                highlight: snapshot.selected_month.clone(),
            };
            (dataset, ResultMeta::default())
        });
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        match result {
            PanelResult::Empty => PanelView::Chart(ChartView {
                summary: NO_SERIES_ROWS.to_string(),
                display: self.renderer.render(&[], None),
            }),
            other => render_with(other, NO_SERIES_ROWS, |data, _| match data {
                Dataset::Series { points, highlight } => PanelView::Chart(ChartView {
                    summary: series_summary(points),
                    display: self.renderer.render(points, highlight.as_ref()),
                }),
                _ => PanelView::Message(NO_SERIES_ROWS.to_string()),
            }),
        }
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(Dataset::Series { points, .. }) = result.data() else {
            return Vec::new();
        };
        match (points.first(), points.last()) {
            (Some(first), Some(last)) => vec![
                Kpi::new("Range", format!("{} → {}", first.month.label(), last.month.label())),
                Kpi::new("Latest share", share(last.video_share)),
                Kpi::new("Latest distinct videos", format_count(&last.distinct_videos)),
            ],
            _ => Vec::new(),
        }
    }
}

/// Top videos carrying one tag within the selected month. Ranking is done by
/// the backend for the chosen metric.
pub struct TagVideoPanel {
    tag: String,
    limit: u32,
}

impl TagVideoPanel {
    pub fn new(tag: impl Into<String>, limit: u32) -> Self {
        Self { tag: tag.into(), limit }
    }
}

#[async_trait]
impl Panel for TagVideoPanel {
    fn id(&self) -> &str {
        "tag_videos"
    }

    fn title(&self) -> String {
        format!("Top '{}' videos this month", self.tag)
    }

    fn refetch_on(&self, change: Change) -> bool {
        month_bound(change) || change == Change::TagMetric
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = async {
            let month = selected_month(snapshot)?;
            let metric = snapshot.tag_metric;
            let endpoint = Endpoint::TagVideos {
                tag: self.tag.clone(),
                month,
                metric,
                limit: self.limit,
            };
            let listing: Listing<TagVideoRow> = fetch_as(source, &endpoint).await?;
            Ok::<_, ClientError>((
                Dataset::TagVideos { rows: listing.results, metric },
                ResultMeta { count: listing.count },
            ))
        }
        .await;
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, "No videos for this tag in the selected month.", |data, _| {
            let Dataset::TagVideos { rows, metric } = data else {
                return PanelView::Message("No videos for this tag in the selected month.".to_string());
            };
            let mut table = Table::new([
                "Video",
                "Max views",
                "Max likes",
                "Max comments",
                "Days trended (month)",
                "Date range",
            ])
            .with_note(format!("Ranked by {}.", metric.as_str()));

            for v in rows {
                let title = v.video_title.as_deref().unwrap_or("(no title)");
                let channel = v
                    .channel_title
                    .as_deref()
                    .or(v.channel_id.as_deref())
                    .unwrap_or("");
                let headline = if channel.is_empty() {
                    title.to_string()
                } else {
                    format!("{} · {}", title, channel)
                };
                let cells = vec![
                    headline,
                    format_count(&v.max_views),
                    format_count(&v.max_likes),
                    format_count(&v.max_comments),
                    format_count(&v.days_trended_in_month),
                    date_range(v.first_date.as_deref(), v.last_date.as_deref()),
                ];
                table.push(TableRow::new(cells).linked(Page::Video { id: v.video_id.clone() }));
            }
            PanelView::Table(table)
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(Dataset::TagVideos { rows, metric }) = result.data() else {
            return Vec::new();
        };
        let Some(lead) = rows.first() else { return Vec::new() };
        let title = lead.video_title.as_deref().unwrap_or("(no title)");
        match metric {
            TagMetric::Views => vec![
                Kpi::new("Most viewed", title),
                Kpi::new("Max views", format_count(&lead.max_views)),
            ],
            TagMetric::Likes => vec![
                Kpi::new("Most liked", title),
                Kpi::new("Max likes", format_count(&lead.max_likes)),
            ],
        }
    }
}
