//! Messages between the controller and whatever front-end drives it.

use tokio::sync::mpsc;

use crate::page::{Page, PeriodAxis};
use crate::panel::{Kpi, PanelView};
use crate::state::{Change, Snapshot};

/// Lifecycle of the dashboard as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    /// Boot or refresh failed outside any panel; the text is the status line.
    Error(String),
    /// The period list came back empty. Nothing was fetched.
    NoData,
}

/// Outcome of one refresh cycle, once every dispatched panel settled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub dispatched: usize,
    pub ready: usize,
    pub empty: usize,
    /// Ids of panels that rendered an error.
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Phase(Phase),
    /// Global status line.
    Status(String),
    PeriodsLoaded {
        axis: PeriodAxis,
        keys: Vec<String>,
    },
    Selection(Snapshot),
    /// A panel settled (or started loading) and should be redrawn.
    PanelRendered {
        panel: String,
        title: String,
        view: PanelView,
        kpis: Vec<Kpi>,
    },
    SearchStatus(String),
    SearchRendered {
        view: PanelView,
        kpis: Vec<Kpi>,
    },
    /// Query dropped below the minimum length.
    SearchCleared,
    CycleFinished {
        change: Change,
        report: CycleReport,
    },
}

/// User intents the controller reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Refresh,
    SelectDate(String),
    SelectMonth(String),
    /// Move along the period list; positive is older.
    StepPeriod(isize),
    SetQuery(String),
    ToggleSearchScope,
    ToggleSearchType,
    ToggleTagMetric,
    SearchNow,
    Navigate(Page),
    Quit,
}

pub type EventSink = mpsc::UnboundedSender<DashboardEvent>;
pub type IntentSender = mpsc::UnboundedSender<Intent>;
