//! Month-driven pages: tag leaderboards and the single-tag chart.

mod common;

use serde_json::json;

use common::{controller, drain, statuses, ScriptedSource};
use trendboard::controller::{DashboardEvent, Intent};
use trendboard::page::Page;
use trendboard::panel::PanelView;
use trendboard::state::MonthKey;

fn views(events: &[DashboardEvent], id: &str) -> Vec<PanelView> {
    events
        .iter()
        .filter_map(|e| match e {
            DashboardEvent::PanelRendered { panel, view, .. } if panel == id => Some(view.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_tag_chart_highlights_selected_month() {
    let source = ScriptedSource::new();
    source
        .serve("/api/us/tags/months", json!(["2024-02-01", "2024-01-01"]))
        .serve(
            "/api/us/tags/series",
            json!({"series": [
                {"month": "2023-12-01", "video_share": 0.02, "distinct_videos": 4},
                {"month": "2024-01-01", "video_share": 0.05, "distinct_videos": 9},
                {"month": "2024-02-01", "video_share": 0.04, "distinct_videos": 7}
            ]}),
        )
        .serve("/api/us/tags/videos", json!({"results": [{"video_id": "v1", "max_views": 50}]}));
    let page = Page::Tag { tag: "lofi".into(), month: Some(MonthKey::new("2024-01-01")) };
    let (mut ctrl, mut rx) = controller(source, page);

    let report = ctrl.boot().await.unwrap();
    assert_eq!(report.ready, 2);

    let events = drain(&mut rx);
    let chart = match views(&events, "tag_series").pop() {
        Some(PanelView::Chart(chart)) => chart,
        other => panic!("expected chart, got {:?}", other),
    };
    assert!(chart.summary.starts_with("Range: 2023-12 → 2024-02"));
    assert!(chart.display.has_axes());

    let dots: Vec<_> = chart.display.dots().collect();
    assert_eq!(dots.len(), 3);
    let highlighted: Vec<usize> = dots
        .iter()
        .enumerate()
        .filter(|(_, (_, _, hot))| *hot)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(highlighted, vec![1]);
}

#[tokio::test]
async fn test_tag_without_series_shows_message_chart() {
    let source = ScriptedSource::new();
    source
        .serve("/api/us/tags/months", json!(["2024-02-01"]))
        .serve("/api/us/tags/series", json!({"series": []}))
        .serve("/api/us/tags/videos", json!({"results": []}));
    let (mut ctrl, mut rx) = controller(source, Page::Tag { tag: "rare".into(), month: None });
    ctrl.boot().await;

    let events = drain(&mut rx);
    match views(&events, "tag_series").pop() {
        Some(PanelView::Chart(chart)) => {
            assert_eq!(chart.summary, "No time-series rows found for this tag.");
            assert!(chart.display.texts().any(|t| t == "No series data found for this tag."));
            assert_eq!(chart.display.dots().count(), 0);
        }
        other => panic!("expected chart, got {:?}", other),
    }
    assert_eq!(
        views(&events, "tag_videos").pop(),
        Some(PanelView::Message("No videos for this tag in the selected month.".into()))
    );
}

#[tokio::test]
async fn test_tags_page_steps_to_older_month() {
    let source = ScriptedSource::new();
    source
        .serve("/api/us/tags/months", json!(["2024-02-01", "2024-01-01"]))
        .serve("/api/us/tags/", json!({"results": [{"tag": "music", "video_share": 0.1}]}));
    let (mut ctrl, mut rx) = controller(source.clone(), Page::Tags);

    let report = ctrl.boot().await.unwrap();
    assert_eq!(report.dispatched, 3);
    drain(&mut rx);
    source.clear_requests();

    ctrl.handle(Intent::StepPeriod(1)).await;
    assert_eq!(ctrl.state().selected_month, Some(MonthKey::new("2024-01-01")));
    assert_eq!(
        source.requests(),
        vec![
            "/api/us/tags/top?month=2024-01-01&limit=50",
            "/api/us/tags/rising?month=2024-01-01&limit=50",
            "/api/us/tags/falling?month=2024-01-01&limit=50",
        ]
    );
    assert_eq!(
        statuses(&drain(&mut rx)),
        vec!["Loading tag analytics for 2024-01...", "Done."]
    );

    // already at the oldest month
    source.clear_requests();
    ctrl.handle(Intent::StepPeriod(1)).await;
    assert!(source.requests().is_empty());
}

#[tokio::test]
async fn test_tag_metric_toggle_refetches_videos_only() {
    let source = ScriptedSource::new();
    source
        .serve("/api/us/tags/months", json!(["2024-02-01"]))
        .serve("/api/us/tags/series", json!({"series": []}))
        .serve("/api/us/tags/videos", json!({"results": []}));
    let (mut ctrl, _rx) = controller(source.clone(), Page::Tag { tag: "lofi".into(), month: None });
    ctrl.boot().await;
    source.clear_requests();

    ctrl.handle(Intent::ToggleTagMetric).await;
    assert_eq!(
        source.requests(),
        vec!["/api/us/tags/videos?tag=lofi&month=2024-02-01&metric=likes&limit=20"]
    );
}
