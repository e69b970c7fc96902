//! Trendboard
//!
//! Trending-video analytics dashboard engine:
//! - Shared selection state fanned out to independent async panels
//! - Typed JSON client for the statistics backend
//! - KPI derivation from each panel's lead row
//! - Dependency-free share chart rendered onto a recording surface
//! - Terminal front-end

pub mod chart;
pub mod client;
pub mod config;
pub mod controller;
pub mod format;
pub mod model;
pub mod page;
pub mod panel;
pub mod state;
pub mod telemetry;
pub mod tui;

// Re-exports for convenience
pub use client::{ClientError, HttpClient, JsonSource};
pub use config::DashboardConfig;
pub use controller::{DashboardController, DashboardEvent, Intent, Phase};
pub use page::Page;
pub use panel::{Panel, PanelResult, PanelView};
pub use state::SelectionState;
