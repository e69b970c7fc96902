//! Single-entity detail panels for the video and channel pages.

use async_trait::async_trait;

use super::{render_with, Card, Dataset, Kpi, Link, Panel, PanelResult, PanelView, ResultMeta, Table, TableRow};
use crate::client::{channel_link, fetch_as, video_link, Endpoint, JsonSource};
use crate::format::{date_range, format_count};
use crate::model::{value_text, ChannelDetail, VideoDetail};
use crate::page::Page;
use crate::state::{Change, Snapshot};

fn entity_bound(change: Change) -> bool {
    matches!(change, Change::Boot | Change::Refresh)
}

/// Video metadata, its daily US history and the countries it trended in most.
pub struct VideoDetailPanel {
    id: String,
    country: String,
}

impl VideoDetailPanel {
    pub fn new(id: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            country: country.into(),
        }
    }

    fn card(&self, detail: &VideoDetail) -> Card {
        let v = &detail.video;
        let mut card = Card {
            heading: v.video_title.clone().unwrap_or_else(|| "(no title)".to_string()),
            ..Card::default()
        };

        card.lines.push(format!("Channel: {}", v.channel_title.as_deref().unwrap_or("")));
        card.lines.push(format!(
            "Category ID: {} · Duration: {} · Definition: {}",
            value_text(v.video_category_id.as_ref()),
            v.video_duration.as_deref().unwrap_or(""),
            v.video_definition.as_deref().unwrap_or("")
        ));
        card.lines.push(format!("Global reach: {} countries", format_count(&v.countries_count)));
        card.lines.push(format!("US stickiness: {} days", format_count(&v.days_trended_us)));
        card.lines.push(format!(
            "US first/last: {}",
            date_range(v.first_trending_us.as_deref(), v.last_trending_us.as_deref())
        ));

        let video_id = if v.video_id.is_empty() { &self.id } else { &v.video_id };
        if let Some(channel_id) = v.channel_id.as_deref() {
            card.pages.push((
                "More from this channel".to_string(),
                Page::Channel { id: channel_id.to_string() },
            ));
        }
        card.links.push(Link::new("Open video on YouTube", video_link(video_id)));
        if let Some(channel_id) = v.channel_id.as_deref() {
            card.links.push(Link::new("Open channel on YouTube", channel_link(channel_id)));
        }

        let history = if detail.history.is_empty() {
            PanelView::Message("No US history found for this video.".to_string())
        } else {
            let mut table = Table::new(["Date", "Views", "Likes", "Comments"]);
            for day in &detail.history {
                table.push(TableRow::new(vec![
                    day.date.clone(),
                    format_count(&day.video_view_count),
                    format_count(&day.video_like_count),
                    format_count(&day.video_comment_count),
                ]));
            }
            PanelView::Table(table)
        };
        card.sections.push(("US history".to_string(), history));

        let spread = if detail.country_spread_top20.is_empty() {
            PanelView::Message("No country spread data.".to_string())
        } else {
            let mut table = Table::new(["Country", "Days trended"])
                .with_note("Countries where this video appeared on the trending list the most days.");
            for c in &detail.country_spread_top20 {
                table.push(TableRow::new(vec![c.country.clone(), format_count(&c.days)]));
            }
            PanelView::Table(table)
        };
        card.sections.push(("Country spread".to_string(), spread));

        card
    }
}

#[async_trait]
impl Panel for VideoDetailPanel {
    fn id(&self) -> &str {
        "video_detail"
    }

    fn title(&self) -> String {
        "Video details".to_string()
    }

    fn refetch_on(&self, change: Change) -> bool {
        entity_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, _snapshot: &Snapshot) -> PanelResult {
        let endpoint = Endpoint::Video {
            id: self.id.clone(),
            country: self.country.clone(),
        };
        let outcome = fetch_as::<VideoDetail>(source, &endpoint)
            .await
            .map(|detail| (Dataset::VideoDetail(Box::new(detail)), ResultMeta::default()));
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, "Failed to load video details.", |data, _| match data {
            Dataset::VideoDetail(detail) => PanelView::Card(self.card(detail)),
            _ => PanelView::Message("Failed to load video details.".to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        match result.data() {
            Some(Dataset::VideoDetail(detail)) => vec![
                Kpi::new("Global reach", format_count(&detail.video.countries_count)),
                Kpi::new("US stickiness", format_count(&detail.video.days_trended_us)),
            ],
            _ => Vec::new(),
        }
    }
}

/// Channel metadata and its US trending videos.
pub struct ChannelDetailPanel {
    id: String,
    limit: u32,
}

impl ChannelDetailPanel {
    pub fn new(id: impl Into<String>, limit: u32) -> Self {
        Self { id: id.into(), limit }
    }

    fn card(&self, detail: &ChannelDetail) -> Card {
        let c = &detail.channel;
        let channel_id = if c.channel_id.is_empty() { &self.id } else { &c.channel_id };
        let mut card = Card {
            heading: c.channel_title.clone().unwrap_or_else(|| channel_id.clone()),
            ..Card::default()
        };

        card.lines.push(format!(
            "Channel country: {}",
            c.channel_country.as_deref().unwrap_or("N/A")
        ));
        card.lines.push(format!(
            "Distinct videos (US all-time): {}",
            format_count(&c.distinct_videos_alltime)
        ));
        card.lines.push(format!("Days active (US): {}", format_count(&c.days_active)));
        card.lines.push(format!("Appearances (US): {}", format_count(&c.appearances_alltime)));
        card.lines.push(format!(
            "Date range: {}",
            date_range(c.first_date.as_deref(), c.last_date.as_deref())
        ));
        card.links.push(Link::new("Open channel on YouTube", channel_link(channel_id)));

        let videos = if detail.videos.is_empty() {
            PanelView::Message("No US trending videos found.".to_string())
        } else {
            let mut table = Table::new(["Video", "Max Views", "Max Likes", "Max Comments", "Global Reach"]);
            for v in &detail.videos {
                let headline = format!(
                    "{} · US: {} days · {}",
                    v.title(),
                    format_count(&v.days_trended_us),
                    date_range(v.first_trending_us.as_deref(), v.last_trending_us.as_deref())
                );
                let cells = vec![
                    headline,
                    format_count(&v.video_view_count),
                    format_count(&v.video_like_count),
                    format_count(&v.video_comment_count),
                    format_count(&v.countries_count),
                ];
                table.push(TableRow::new(cells).linked(Page::Video { id: v.video_id.clone() }));
            }
            PanelView::Table(table)
        };
        card.sections.push(("US trending videos".to_string(), videos));

        card
    }
}

#[async_trait]
impl Panel for ChannelDetailPanel {
    fn id(&self) -> &str {
        "channel_detail"
    }

    fn title(&self) -> String {
        "Channel details".to_string()
    }

    fn refetch_on(&self, change: Change) -> bool {
        entity_bound(change)
    }

    async fn fetch(&self, source: &dyn JsonSource, _snapshot: &Snapshot) -> PanelResult {
        let endpoint = Endpoint::Channel {
            id: self.id.clone(),
            limit: self.limit,
        };
        let outcome = fetch_as::<ChannelDetail>(source, &endpoint)
            .await
            .map(|detail| (Dataset::ChannelDetail(Box::new(detail)), ResultMeta::default()));
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, "Failed to load channel.", |data, _| match data {
            Dataset::ChannelDetail(detail) => PanelView::Card(self.card(detail)),
            _ => PanelView::Message("Failed to load channel.".to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        match result.data() {
            Some(Dataset::ChannelDetail(detail)) => vec![
                Kpi::new("Distinct videos (US all-time)", format_count(&detail.channel.distinct_videos_alltime)),
                Kpi::new("Trending videos listed", detail.videos.len().to_string()),
            ],
            _ => Vec::new(),
        }
    }
}
