//! Channel leaderboards: one for the selected date, one all-time.

use async_trait::async_trait;

use super::{date_bound, render_with, Dataset, Kpi, Panel, PanelResult, PanelView, ResultMeta, Table, TableRow};
use crate::client::{fetch_as, ClientError, Endpoint, JsonSource};
use crate::format::{date_range, format_count};
use crate::model::{ChannelRow, Listing};
use crate::page::Page;
use crate::state::{Change, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelBoard {
    /// Aggregates for the selected date.
    Daily,
    /// Aggregates over the whole dataset; independent of the date.
    AllTime,
}

pub struct ChannelLeaderboardPanel {
    board: ChannelBoard,
    limit: u32,
}

impl ChannelLeaderboardPanel {
    pub fn daily(limit: u32) -> Self {
        Self { board: ChannelBoard::Daily, limit }
    }

    pub fn all_time(limit: u32) -> Self {
        Self { board: ChannelBoard::AllTime, limit }
    }

    pub fn board(&self) -> ChannelBoard {
        self.board
    }

    fn endpoint(&self, snapshot: &Snapshot) -> Result<Endpoint, ClientError> {
        match self.board {
            ChannelBoard::Daily => {
                let date = snapshot
                    .selected_date
                    .clone()
                    .ok_or_else(|| ClientError::decode("No date available."))?;
                Ok(Endpoint::ChannelsDaily { date, limit: self.limit })
            }
            ChannelBoard::AllTime => Ok(Endpoint::ChannelsAllTime { limit: self.limit }),
        }
    }

    fn table(&self, rows: &[ChannelRow]) -> Table {
        let mut table = match self.board {
            ChannelBoard::Daily => Table::new([
                "Channel",
                "Distinct videos",
                "Total views (that day)",
                "Total likes (that day)",
                "Total comments (that day)",
            ]),
            ChannelBoard::AllTime => Table::new([
                "Channel",
                "Distinct videos (all-time)",
                "Days active",
                "Trending appearances",
                "Date range",
            ]),
        };
        for r in rows {
            let cells = match self.board {
                ChannelBoard::Daily => vec![
                    r.name().to_string(),
                    format_count(&r.distinct_videos),
                    format_count(&r.sum_views),
                    format_count(&r.sum_likes),
                    format_count(&r.sum_comments),
                ],
                ChannelBoard::AllTime => vec![
                    r.name().to_string(),
                    format_count(&r.distinct_videos_alltime),
                    format_count(&r.days_active),
                    format_count(&r.appearances_alltime),
                    date_range(r.first_date.as_deref(), r.last_date.as_deref()),
                ],
            };
            table.push(TableRow::new(cells).linked(Page::Channel { id: r.channel_id.clone() }));
        }
        table
    }
}

#[async_trait]
impl Panel for ChannelLeaderboardPanel {
    fn id(&self) -> &str {
        match self.board {
            ChannelBoard::Daily => "channels_daily",
            ChannelBoard::AllTime => "channels_alltime",
        }
    }

    fn title(&self) -> String {
        match self.board {
            ChannelBoard::Daily => "Top channels (selected day)".to_string(),
            ChannelBoard::AllTime => "Top channels (all-time)".to_string(),
        }
    }

    fn refetch_on(&self, change: Change) -> bool {
        match self.board {
            ChannelBoard::Daily => date_bound(change),
            ChannelBoard::AllTime => matches!(change, Change::Boot | Change::Refresh),
        }
    }

    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        let outcome = async {
            let endpoint = self.endpoint(snapshot)?;
            let listing: Listing<ChannelRow> = fetch_as(source, &endpoint).await?;
            Ok::<_, ClientError>((Dataset::Channels(listing.results), ResultMeta { count: listing.count }))
        }
        .await;
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        let empty = match self.board {
            ChannelBoard::Daily => "No daily channel data.",
            ChannelBoard::AllTime => "No all-time channel data.",
        };
        render_with(result, empty, |data, _| match data {
            Dataset::Channels(rows) => PanelView::Table(self.table(rows)),
            _ => PanelView::Message(empty.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(Dataset::Channels(rows)) = result.data() else {
            return Vec::new();
        };
        let Some(lead) = rows.first() else { return Vec::new() };
        match self.board {
            ChannelBoard::Daily => vec![
                Kpi::new("Top channel today", lead.name()),
                Kpi::new("Distinct videos", format_count(&lead.distinct_videos)),
            ],
            ChannelBoard::AllTime => vec![
                Kpi::new("Top channel all-time", lead.name()),
                Kpi::new("Days active", format_count(&lead.days_active)),
            ],
        }
    }
}
