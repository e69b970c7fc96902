//! Search
//!
//! Free-text search over videos or channels, for the selected day or across
//! all dates. The response shape is resolved once into [`SearchHits`] when
//! the response arrives; rendering only matches on that.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use super::{render_with, Dataset, Kpi, Panel, PanelResult, PanelView, ResultMeta, Table, TableRow};
use crate::client::{fetch_as, ClientError, Endpoint, JsonSource};
use crate::controller::Debouncer;
use crate::format::{date_range, format_count};
use crate::model::{ChannelRow, Listing, VideoRow};
use crate::page::Page;
use crate::state::{Change, SearchScope, SearchType, Snapshot};

const NO_RESULTS: &str = "No results.";

/// Search rows tagged with the (type, scope) they were produced for.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchHits {
    VideosOnDay(Vec<VideoRow>),
    VideosAllTime(Vec<VideoRow>),
    ChannelsOnDay(Vec<ChannelRow>),
    ChannelsAllTime(Vec<ChannelRow>),
}

impl SearchHits {
    pub fn len(&self) -> usize {
        match self {
            SearchHits::VideosOnDay(rows) | SearchHits::VideosAllTime(rows) => rows.len(),
            SearchHits::ChannelsOnDay(rows) | SearchHits::ChannelsAllTime(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn scope(&self) -> SearchScope {
        match self {
            SearchHits::VideosOnDay(_) | SearchHits::ChannelsOnDay(_) => SearchScope::Day,
            SearchHits::VideosAllTime(_) | SearchHits::ChannelsAllTime(_) => SearchScope::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResults {
    pub hits: SearchHits,
    /// Backend-reported match count.
    pub count: Option<u64>,
}

impl SearchResults {
    pub fn total(&self) -> u64 {
        self.count.unwrap_or(self.hits.len() as u64)
    }
}

/// Search box results. Owns the debounce timer for typed queries.
pub struct SearchPanel {
    limit: u32,
    min_query_len: usize,
    debouncer: Debouncer,
}

impl SearchPanel {
    pub fn new(limit: u32, min_query_len: usize, delay: Duration) -> Self {
        Self {
            limit,
            min_query_len,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Whether a query is long enough to be sent.
    pub fn accepts(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_len
    }

    /// Run `job` once the debounce delay passes without another call.
    pub fn schedule<F>(&self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.debouncer.schedule(job);
    }

    /// Drop a pending dispatch, if any.
    pub fn cancel_pending(&self) -> bool {
        self.debouncer.cancel()
    }

    pub fn has_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn searching_status(snapshot: &Snapshot) -> String {
        format!(
            "Searching {} ({})...",
            snapshot.search_type.as_str(),
            snapshot.search_scope.as_str()
        )
    }

    /// Status once a search settles; `None` while still loading.
    pub fn settled_status(result: &PanelResult) -> Option<String> {
        match result {
            PanelResult::Loading => None,
            PanelResult::Empty => Some("Found 0 result(s).".to_string()),
            PanelResult::Error(message) if message.starts_with("Error: ") => Some(message.clone()),
            PanelResult::Error(message) => Some(format!("Error: {}", message)),
            PanelResult::Ready { data, meta } => {
                let total = match data {
                    Dataset::Search(results) => results.total(),
                    other => meta.count.unwrap_or(other.len() as u64),
                };
                Some(format!("Found {} result(s).", total))
            }
        }
    }

    fn endpoint(&self, snapshot: &Snapshot) -> Endpoint {
        Endpoint::Search {
            kind: snapshot.search_type,
            query: snapshot.query().to_string(),
            scope: snapshot.search_scope,
            date: snapshot.selected_date.clone(),
            limit: self.limit,
        }
    }

    async fn search(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> Result<SearchResults, ClientError> {
        let endpoint = self.endpoint(snapshot);
        let requested = snapshot.search_scope;
        let results = match snapshot.search_type {
            SearchType::Videos => {
                let listing: Listing<VideoRow> = fetch_as(source, &endpoint).await?;
                let hits = match listing.scope.unwrap_or(requested) {
                    SearchScope::Day => SearchHits::VideosOnDay(listing.results),
                    SearchScope::All => SearchHits::VideosAllTime(listing.results),
                };
                SearchResults { hits, count: listing.count }
            }
            SearchType::Channels => {
                let listing: Listing<ChannelRow> = fetch_as(source, &endpoint).await?;
                let hits = match listing.scope.unwrap_or(requested) {
                    SearchScope::Day => SearchHits::ChannelsOnDay(listing.results),
                    SearchScope::All => SearchHits::ChannelsAllTime(listing.results),
                };
                SearchResults { hits, count: listing.count }
            }
        };
        Ok(results)
    }
}

fn video_headline(v: &VideoRow) -> String {
    let channel = v
        .channel_title
        .as_deref()
        .or(v.channel_id.as_deref())
        .unwrap_or("");
    if channel.is_empty() {
        v.title().to_string()
    } else {
        format!("{} · {}", v.title(), channel)
    }
}

fn hits_table(hits: &SearchHits) -> Table {
    match hits {
        SearchHits::VideosOnDay(rows) => {
            let mut table = Table::new(["Video", "Date", "Daily stats"]);
            for v in rows {
                let cells = vec![
                    video_headline(v),
                    v.video_trending_date.clone().unwrap_or_default(),
                    format!("Views: {}", format_count(&v.video_view_count)),
                ];
                table.push(TableRow::new(cells).linked(Page::Video { id: v.video_id.clone() }));
            }
            table
        }
        SearchHits::VideosAllTime(rows) => {
            let mut table = Table::new(["Video", "US trending range", "All-time stats"]);
            for v in rows {
                let cells = vec![
                    video_headline(v),
                    date_range(v.first_trending_us.as_deref(), v.last_trending_us.as_deref()),
                    format!(
                        "US days: {} · Reach: {}",
                        format_count(&v.days_trended_us),
                        format_count(&v.countries_count)
                    ),
                ];
                table.push(TableRow::new(cells).linked(Page::Video { id: v.video_id.clone() }));
            }
            table
        }
        SearchHits::ChannelsOnDay(rows) => {
            let mut table = Table::new(["Channel", "Distinct videos (day)", "Daily totals"]);
            for c in rows {
                let cells = vec![
                    c.name().to_string(),
                    format_count(&c.distinct_videos),
                    format!(
                        "Views: {} · Likes: {} · Comments: {}",
                        format_count(&c.sum_views),
                        format_count(&c.sum_likes),
                        format_count(&c.sum_comments)
                    ),
                ];
                table.push(TableRow::new(cells).linked(Page::Channel { id: c.channel_id.clone() }));
            }
            table
        }
        SearchHits::ChannelsAllTime(rows) => {
            let mut table = Table::new(["Channel", "Distinct videos (US all-time)", "US trending range"]);
            for c in rows {
                let cells = vec![
                    c.name().to_string(),
                    format_count(&c.distinct_videos_alltime),
                    format!(
                        "US range: {}",
                        date_range(c.first_trending_us.as_deref(), c.last_trending_us.as_deref())
                    ),
                ];
                table.push(TableRow::new(cells).linked(Page::Channel { id: c.channel_id.clone() }));
            }
            table
        }
    }
}

#[async_trait]
impl Panel for SearchPanel {
    fn id(&self) -> &str {
        "search"
    }

    fn title(&self) -> String {
        "Search (US)".to_string()
    }

    fn refetch_on(&self, change: Change) -> bool {
        matches!(change, Change::SearchQuery | Change::SearchScope | Change::SearchType)
    }

    /// Queries below the minimum length settle as empty without a request.
    async fn fetch(&self, source: &dyn JsonSource, snapshot: &Snapshot) -> PanelResult {
        if !self.accepts(snapshot.query()) {
            return PanelResult::Empty;
        }
        let outcome = self.search(source, snapshot).await.map(|results| {
            let meta = ResultMeta { count: results.count };
            (Dataset::Search(results), meta)
        });
        PanelResult::settle(self.id(), outcome)
    }

    fn render(&self, result: &PanelResult) -> PanelView {
        render_with(result, NO_RESULTS, |data, _| match data {
            Dataset::Search(results) => PanelView::Table(hits_table(&results.hits)),
            _ => PanelView::Message(NO_RESULTS.to_string()),
        })
    }

    fn derive_kpis(&self, result: &PanelResult) -> Vec<Kpi> {
        let Some(Dataset::Search(results)) = result.data() else {
            return Vec::new();
        };
        let top = match &results.hits {
            SearchHits::VideosOnDay(rows) | SearchHits::VideosAllTime(rows) => {
                rows.first().map(|v| v.title().to_string())
            }
            SearchHits::ChannelsOnDay(rows) | SearchHits::ChannelsAllTime(rows) => {
                rows.first().map(|c| c.name().to_string())
            }
        };
        match top {
            Some(top) => vec![
                Kpi::new("Matches", results.total().to_string()),
                Kpi::new("Top hit", top),
            ],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DateKey, Periods, SelectionState};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    struct Recorder {
        body: Value,
        urls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn new(body: Value) -> Self {
            Self { body, urls: Mutex::new(vec![]) }
        }
    }

    #[async_trait]
    impl JsonSource for Recorder {
        async fn fetch_json(&self, url: &str) -> Result<Value, ClientError> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    fn snapshot(query: &str, kind: SearchType, scope: SearchScope) -> Snapshot {
        let mut state = SelectionState::new();
        let dates = Periods::new(vec![DateKey::new("2024-03-01")]);
        state.select_date(DateKey::new("2024-03-01"), &dates).unwrap();
        state.set_query(query);
        state.set_search_type(kind);
        state.set_search_scope(scope);
        state.snapshot()
    }

    fn panel() -> SearchPanel {
        SearchPanel::new(20, 2, Duration::from_millis(300))
    }

    #[tokio::test]
    async fn test_short_query_makes_no_request() {
        let source = Recorder::new(json!({"results": []}));
        let result = panel()
            .fetch(&source, &snapshot(" a ", SearchType::Videos, SearchScope::Day))
            .await;
        assert_eq!(result, PanelResult::Empty);
        assert!(source.urls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_video_day_columns() {
        let source = Recorder::new(json!({
            "results": [{"video_id": "v1", "video_title": "Cats", "channel_id": "UC1",
                         "video_trending_date": "2024-03-01", "video_view_count": 42000}],
            "scope": "day", "count": 1
        }));
        let panel = panel();
        let result = panel
            .fetch(&source, &snapshot("cats", SearchType::Videos, SearchScope::Day))
            .await;
        assert_eq!(
            source.urls.lock().unwrap().as_slice(),
            ["/api/us/search/videos?q=cats&scope=day&date=2024-03-01&limit=20"]
        );

        let view = panel.render(&result);
        let table = view.as_table().unwrap();
        assert_eq!(table.columns, vec!["Video", "Date", "Daily stats"]);
        assert_eq!(table.rows[0].cells, vec!["Cats · UC1", "2024-03-01", "Views: 42,000"]);
        assert_eq!(SearchPanel::settled_status(&result).as_deref(), Some("Found 1 result(s)."));
    }

    #[tokio::test]
    async fn test_video_all_time_columns_replace_day_columns() {
        let source = Recorder::new(json!({
            "results": [{"video_id": "v1", "video_title": "Cats", "days_trended_us": 9,
                         "countries_count": 14, "first_trending_us": "2023-05-01",
                         "last_trending_us": "2023-05-09"}],
            "scope": "all", "count": 1
        }));
        let panel = panel();
        let result = panel
            .fetch(&source, &snapshot("cats", SearchType::Videos, SearchScope::All))
            .await;
        assert_eq!(
            source.urls.lock().unwrap().as_slice(),
            ["/api/us/search/videos?q=cats&scope=all&limit=20"]
        );
        let view = panel.render(&result);
        let table = view.as_table().unwrap();
        assert_eq!(table.columns, vec!["Video", "US trending range", "All-time stats"]);
        assert_eq!(table.rows[0].cells[1], "2023-05-01 → 2023-05-09");
        assert_eq!(table.rows[0].cells[2], "US days: 9 · Reach: 14");
    }

    #[tokio::test]
    async fn test_response_scope_wins_over_requested() {
        let source = Recorder::new(json!({
            "results": [{"channel_id": "UC7", "channel_title": "Seven", "distinct_videos_alltime": 3,
                         "first_trending_us": "2022-01-01", "last_trending_us": "2024-01-01"}],
            "scope": "all"
        }));
        let result = panel()
            .fetch(&source, &snapshot("seven", SearchType::Channels, SearchScope::Day))
            .await;
        let Some(Dataset::Search(results)) = result.data() else {
            panic!("expected search results");
        };
        assert_eq!(results.hits.scope(), SearchScope::All);
        let table = hits_table(&results.hits);
        assert_eq!(table.rows[0].cells, vec!["Seven", "3", "US range: 2022-01-01 → 2024-01-01"]);
        assert_eq!(table.rows[0].target, Some(Page::Channel { id: "UC7".into() }));
    }

    #[tokio::test]
    async fn test_channel_day_totals_and_no_results() {
        let source = Recorder::new(json!({
            "results": [{"channel_id": "UC1", "channel_title": "One", "distinct_videos": 2,
                         "sum_views": 1000, "sum_likes": 10, "sum_comments": 1}],
            "scope": "day", "count": 1
        }));
        let panel = panel();
        let result = panel
            .fetch(&source, &snapshot("one", SearchType::Channels, SearchScope::Day))
            .await;
        let view = panel.render(&result);
        assert_eq!(
            view.as_table().unwrap().rows[0].cells[2],
            "Views: 1,000 · Likes: 10 · Comments: 1"
        );
        assert_eq!(panel.render(&PanelResult::Empty), PanelView::Message("No results.".into()));
    }

    #[test]
    fn test_searching_status() {
        let snap = snapshot("cats", SearchType::Channels, SearchScope::All);
        assert_eq!(SearchPanel::searching_status(&snap), "Searching channels (all)...");
        assert_eq!(
            SearchPanel::settled_status(&PanelResult::Error("Error: offline".into())).as_deref(),
            Some("Error: offline")
        );
    }

    #[test]
    fn test_http_failure_status_matches_global_wording() {
        let error = ClientError::http(404, "Not Found", "body");
        let result = PanelResult::settle("search", Err(error.clone()));
        assert_eq!(
            SearchPanel::settled_status(&result).as_deref(),
            Some("Error: 404 Not Found - body")
        );
        assert_eq!(
            SearchPanel::settled_status(&result),
            Some(format!("Error: {}", error.message()))
        );
        // the results area keeps the raw text
        assert_eq!(panel().render(&result), PanelView::Failed("404 Not Found - body".into()));
    }
}
