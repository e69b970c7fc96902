//! Dashboard Controller
//!
//! Owns the [`SelectionState`] and the period lists, boots a page, fans a
//! state snapshot out to every affected panel on each change and reports
//! results as [`DashboardEvent`]s.
//!
//! Panels of one cycle are fetched concurrently on a spawned task and each
//! one is reported as soon as it settles. The cycle itself only reports
//! completion once all of them have settled; one panel failing never cancels
//! its siblings. A newer cycle replaces one still in flight.

mod debounce;
mod events;

pub use debounce::Debouncer;
pub use events::{CycleReport, DashboardEvent, EventSink, Intent, IntentSender, Phase};

use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::{fetch_as, ClientError, Endpoint, JsonSource};
use crate::config::DashboardConfig;
use crate::page::{Page, PeriodAxis};
use crate::panel::{Panel, PanelResult, PanelView, SearchPanel};
use crate::state::{
    Change, DateKey, MonthKey, Periods, SearchScope, SearchType, SelectionState, Snapshot, StateError,
    TagMetric,
};

/// What the run loop should do after an intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Navigate(Page),
    Quit,
}

/// Progress of a spawned refresh cycle, tagged with its id.
enum CycleUpdate {
    Settled { cycle: u64, slot: usize, result: PanelResult },
    Finished { cycle: u64 },
}

impl CycleUpdate {
    fn cycle(&self) -> u64 {
        match self {
            CycleUpdate::Settled { cycle, .. } | CycleUpdate::Finished { cycle } => *cycle,
        }
    }
}

/// The refresh cycle currently in flight.
struct Cycle {
    id: u64,
    change: Change,
    snapshot: Snapshot,
    panels: Vec<Arc<dyn Panel>>,
    results: Vec<(String, PanelResult)>,
    task: JoinHandle<()>,
}

pub struct DashboardController {
    source: Arc<dyn JsonSource>,
    page: Page,
    state: SelectionState,
    dates: Periods<DateKey>,
    months: Periods<MonthKey>,
    panels: Vec<Arc<dyn Panel>>,
    search: Option<Arc<SearchPanel>>,
    phase: Phase,
    sink: EventSink,
    in_flight: Option<Cycle>,
    cycles: u64,
    updates_tx: mpsc::UnboundedSender<CycleUpdate>,
    updates_rx: mpsc::UnboundedReceiver<CycleUpdate>,
}

impl DashboardController {
    /// Controller for `page` with the panels that page declares.
    pub fn new(source: Arc<dyn JsonSource>, page: Page, config: &DashboardConfig, sink: EventSink) -> Self {
        let panels = page.panels(config);
        let search = page.search_panel(config);
        Self::with_panels(source, page, panels, search, sink)
    }

    pub fn with_panels(
        source: Arc<dyn JsonSource>,
        page: Page,
        panels: Vec<Arc<dyn Panel>>,
        search: Option<Arc<SearchPanel>>,
        sink: EventSink,
    ) -> Self {
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        Self {
            source,
            page,
            state: SelectionState::new(),
            dates: Periods::default(),
            months: Periods::default(),
            panels,
            search,
            phase: Phase::Idle,
            sink,
            in_flight: None,
            cycles: 0,
            updates_tx,
            updates_rx,
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn dates(&self) -> &Periods<DateKey> {
        &self.dates
    }

    pub fn months(&self) -> &Periods<MonthKey> {
        &self.months
    }

    fn emit(&self, event: DashboardEvent) {
        // A closed channel only means nobody is listening any more.
        let _ = self.sink.send(event);
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase != phase {
            self.phase = phase.clone();
            self.emit(DashboardEvent::Phase(phase));
        }
    }

    fn status(&self, message: impl Into<String>) {
        self.emit(DashboardEvent::Status(message.into()));
    }

    fn fail(&mut self, error: &ClientError) {
        let message = format!("Error: {}", error.message());
        warn!("{} failed: {}", self.page, error);
        self.status(message.clone());
        self.set_phase(Phase::Error(message));
    }

    /// Whether the page still needs its period list before it can refresh.
    fn needs_boot(&self) -> bool {
        match self.page.axis() {
            PeriodAxis::Dates => self.state.selected_date.is_none(),
            PeriodAxis::Months => self.state.selected_month.is_none(),
            PeriodAxis::None => matches!(self.phase, Phase::Idle),
        }
    }

    /// Load the period list and pick the default period. An empty list ends
    /// in [`Phase::NoData`]; returns whether panels can be fetched.
    async fn load_periods(&mut self) -> bool {
        self.set_phase(Phase::Loading);
        if let Some(message) = self.page.loading_periods() {
            self.status(message);
        }

        let loaded = match self.page.axis() {
            PeriodAxis::Dates => self.load_dates().await,
            PeriodAxis::Months => self.load_months().await,
            PeriodAxis::None => Ok(true),
        };
        match loaded {
            Ok(true) => {
                self.emit(DashboardEvent::Selection(self.state.snapshot()));
                true
            }
            Ok(false) => {
                info!("{}: no periods available", self.page);
                self.status(self.page.no_periods());
                self.set_phase(Phase::NoData);
                false
            }
            Err(e) => {
                self.fail(&e);
                false
            }
        }
    }

    /// Load the period list, then run the first refresh to completion.
    /// Without periods nothing is fetched and `None` is returned.
    pub async fn boot(&mut self) -> Option<CycleReport> {
        if !self.load_periods().await {
            return None;
        }
        Some(self.refresh(Change::Boot).await)
    }

    async fn load_dates(&mut self) -> Result<bool, ClientError> {
        let keys: Vec<DateKey> = fetch_as(self.source.as_ref(), &Endpoint::Dates).await?;
        self.dates = Periods::new(keys);
        self.status(self.page.periods_loaded(self.dates.len()));
        self.emit(DashboardEvent::PeriodsLoaded {
            axis: PeriodAxis::Dates,
            keys: self.dates.keys().iter().map(|k| k.to_string()).collect(),
        });

        let Some(latest) = self.dates.latest().cloned() else {
            return Ok(false);
        };
        self.state
            .select_date(latest, &self.dates)
            .map_err(|e| ClientError::decode(e.to_string()))?;
        Ok(true)
    }

    async fn load_months(&mut self) -> Result<bool, ClientError> {
        let keys: Vec<MonthKey> = fetch_as(self.source.as_ref(), &Endpoint::TagMonths).await?;
        self.months = Periods::new(keys);
        self.status(self.page.periods_loaded(self.months.len()));
        self.emit(DashboardEvent::PeriodsLoaded {
            axis: PeriodAxis::Months,
            keys: self.months.keys().iter().map(|k| k.to_string()).collect(),
        });

        let requested = self
            .page
            .requested_month()
            .filter(|m| self.months.contains(m))
            .cloned();
        let Some(month) = requested.or_else(|| self.months.latest().cloned()) else {
            return Ok(false);
        };
        self.state
            .select_month(month, &self.months)
            .map_err(|e| ClientError::decode(e.to_string()))?;
        Ok(true)
    }

    /// Fan the current snapshot out to every panel affected by `change` on
    /// a task of its own. A cycle still in flight is aborted and its panels
    /// join the new one, so none of them is left on a stale view.
    fn start_cycle(&mut self, change: Change) {
        let snapshot = self.state.snapshot();
        self.set_phase(Phase::Loading);
        self.status(self.page.refreshing(&snapshot));

        let carried = match self.in_flight.take() {
            Some(stale) => {
                debug!("Cycle {} superseded by {:?}", stale.id, change);
                stale.task.abort();
                stale.panels
            }
            None => Vec::new(),
        };
        let active: Vec<Arc<dyn Panel>> = self
            .panels
            .iter()
            .filter(|p| p.refetch_on(change) || carried.iter().any(|c| c.id() == p.id()))
            .cloned()
            .collect();

        self.cycles += 1;
        let id = self.cycles;
        debug!("Cycle {} ({:?}): {} panel(s)", id, change, active.len());

        for panel in &active {
            self.emit(DashboardEvent::PanelRendered {
                panel: panel.id().to_string(),
                title: panel.title(),
                view: PanelView::Loading,
                kpis: Vec::new(),
            });
        }

        let task = {
            let panels = active.clone();
            let source = self.source.clone();
            let updates = self.updates_tx.clone();
            let snapshot = snapshot.clone();
            tokio::spawn(async move {
                let fetches = panels.iter().enumerate().map(|(slot, panel)| {
                    let source = source.clone();
                    let updates = updates.clone();
                    let snapshot = snapshot.clone();
                    async move {
                        let result = panel.fetch(source.as_ref(), &snapshot).await;
                        let _ = updates.send(CycleUpdate::Settled { cycle: id, slot, result });
                    }
                });
                join_all(fetches).await;
                let _ = updates.send(CycleUpdate::Finished { cycle: id });
            })
        };

        self.in_flight = Some(Cycle {
            id,
            change,
            snapshot,
            panels: active,
            results: Vec::new(),
            task,
        });
    }

    /// Fold one update of the running cycle into the page. Updates from a
    /// superseded cycle are dropped. Returns the report once the cycle ends.
    fn absorb(&mut self, update: CycleUpdate) -> Option<CycleReport> {
        let cycle = self.in_flight.as_mut().filter(|c| c.id == update.cycle())?;
        match update {
            CycleUpdate::Settled { slot, result, .. } => {
                let panel = cycle.panels.get(slot)?.clone();
                let _ = self.sink.send(DashboardEvent::PanelRendered {
                    panel: panel.id().to_string(),
                    title: panel.title(),
                    view: panel.render(&result),
                    kpis: panel.derive_kpis(&result),
                });
                cycle.results.push((panel.id().to_string(), result));
                None
            }
            CycleUpdate::Finished { .. } => {
                let cycle = self.in_flight.take()?;
                Some(self.finish(cycle))
            }
        }
    }

    fn finish(&mut self, cycle: Cycle) -> CycleReport {
        let mut report = CycleReport {
            dispatched: cycle.panels.len(),
            ..CycleReport::default()
        };
        for (id, result) in cycle.results {
            match result {
                PanelResult::Ready { .. } => report.ready += 1,
                PanelResult::Empty => report.empty += 1,
                PanelResult::Error(_) => report.failed.push(id),
                PanelResult::Loading => {}
            }
        }

        info!(
            "{} refreshed: {} ready, {} empty, {} failed",
            self.page,
            report.ready,
            report.empty,
            report.failed.len()
        );
        self.status(self.page.done(&cycle.snapshot));
        self.set_phase(Phase::Ready);
        self.emit(DashboardEvent::CycleFinished {
            change: cycle.change,
            report: report.clone(),
        });
        report
    }

    /// Wait for the cycle in flight, if any, to finish.
    async fn settle(&mut self) -> Option<CycleReport> {
        while self.in_flight.is_some() {
            let update = self.updates_rx.recv().await?;
            if let Some(report) = self.absorb(update) {
                return Some(report);
            }
        }
        None
    }

    /// Refetch every panel affected by `change` against one snapshot and
    /// wait for all of them.
    pub async fn refresh(&mut self, change: Change) -> CycleReport {
        self.start_cycle(change);
        self.settle().await.unwrap_or_default()
    }

    fn apply_date(&mut self, key: DateKey) -> Result<(), StateError> {
        let change = self.state.select_date(key, &self.dates)?;
        self.emit(DashboardEvent::Selection(self.state.snapshot()));
        self.start_cycle(change);
        if self.state.search_scope == SearchScope::Day {
            self.search_now();
        }
        Ok(())
    }

    fn apply_month(&mut self, key: MonthKey) -> Result<(), StateError> {
        let change = self.state.select_month(key, &self.months)?;
        self.emit(DashboardEvent::Selection(self.state.snapshot()));
        self.start_cycle(change);
        Ok(())
    }

    /// Returns whether the step moved to another period.
    fn apply_step(&mut self, step: isize) -> Result<bool, StateError> {
        match self.page.axis() {
            PeriodAxis::Dates => {
                let current = self.state.selected_date.clone().ok_or(StateError::NoPeriods)?;
                match self.dates.step_from(&current, step).cloned() {
                    Some(next) if next != current => self.apply_date(next).map(|_| true),
                    _ => Ok(false),
                }
            }
            PeriodAxis::Months => {
                let current = self.state.selected_month.clone().ok_or(StateError::NoPeriods)?;
                match self.months.step_from(&current, step).cloned() {
                    Some(next) if next != current => self.apply_month(next).map(|_| true),
                    _ => Ok(false),
                }
            }
            PeriodAxis::None => Ok(false),
        }
    }

    fn apply_tag_metric(&mut self, metric: TagMetric) {
        let change = self.state.set_tag_metric(metric);
        self.emit(DashboardEvent::Selection(self.state.snapshot()));
        self.start_cycle(change);
    }

    pub async fn select_date(&mut self, key: DateKey) -> Result<CycleReport, StateError> {
        self.apply_date(key)?;
        Ok(self.settle().await.unwrap_or_default())
    }

    pub async fn select_month(&mut self, key: MonthKey) -> Result<CycleReport, StateError> {
        self.apply_month(key)?;
        Ok(self.settle().await.unwrap_or_default())
    }

    /// Move the selected period `step` entries along its list.
    pub async fn step_period(&mut self, step: isize) -> Result<Option<CycleReport>, StateError> {
        if !self.apply_step(step)? {
            return Ok(None);
        }
        Ok(Some(self.settle().await.unwrap_or_default()))
    }

    pub async fn set_tag_metric(&mut self, metric: TagMetric) -> CycleReport {
        self.apply_tag_metric(metric);
        self.settle().await.unwrap_or_default()
    }

    /// Record a keystroke; the search fires once typing pauses.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.set_query(query);
        if let (Some(search), Some(job)) = (self.search.clone(), self.search_job()) {
            search.schedule(job);
        }
    }

    pub fn set_search_scope(&mut self, scope: SearchScope) -> Option<JoinHandle<()>> {
        self.state.set_search_scope(scope);
        self.search_now()
    }

    pub fn set_search_type(&mut self, kind: SearchType) -> Option<JoinHandle<()>> {
        self.state.set_search_type(kind);
        self.search_now()
    }

    /// Dispatch the current search right away, superseding any pending one.
    pub fn search_now(&self) -> Option<JoinHandle<()>> {
        let search = self.search.as_ref()?;
        search.cancel_pending();
        let job = self.search_job()?;
        Some(tokio::spawn(job))
    }

    fn search_job(&self) -> Option<impl Future<Output = ()> + Send + 'static> {
        let search = self.search.clone()?;
        let source = self.source.clone();
        let sink = self.sink.clone();
        let snapshot = self.state.snapshot();

        Some(async move {
            if !search.accepts(snapshot.query()) {
                let _ = sink.send(DashboardEvent::SearchStatus(String::new()));
                let _ = sink.send(DashboardEvent::SearchCleared);
                return;
            }

            let _ = sink.send(DashboardEvent::SearchStatus(SearchPanel::searching_status(&snapshot)));
            let result = search.fetch(source.as_ref(), &snapshot).await;
            let _ = sink.send(DashboardEvent::SearchRendered {
                view: search.render(&result),
                kpis: search.derive_kpis(&result),
            });
            if let Some(status) = SearchPanel::settled_status(&result) {
                let _ = sink.send(DashboardEvent::SearchStatus(status));
            }
        })
    }

    /// Apply one intent without waiting for the refresh it starts. State
    /// errors become a status line, never a crash.
    async fn dispatch(&mut self, intent: Intent) -> Flow {
        let outcome: Result<(), StateError> = match intent {
            Intent::Refresh => {
                if self.needs_boot() {
                    if self.load_periods().await {
                        self.start_cycle(Change::Boot);
                    }
                } else {
                    self.start_cycle(Change::Refresh);
                    if self.state.search_scope == SearchScope::Day {
                        self.search_now();
                    }
                }
                Ok(())
            }
            Intent::SelectDate(key) => self.apply_date(DateKey::new(key)),
            Intent::SelectMonth(key) => self.apply_month(MonthKey::new(key)),
            Intent::StepPeriod(step) => self.apply_step(step).map(|_| ()),
            Intent::SetQuery(query) => {
                self.set_query(query);
                Ok(())
            }
            Intent::ToggleSearchScope => {
                self.set_search_scope(self.state.search_scope.toggled());
                Ok(())
            }
            Intent::ToggleSearchType => {
                self.set_search_type(self.state.search_type.toggled());
                Ok(())
            }
            Intent::ToggleTagMetric => {
                if self.page.has_tag_metric() {
                    self.apply_tag_metric(self.state.tag_metric.toggled());
                }
                Ok(())
            }
            Intent::SearchNow => {
                self.search_now();
                Ok(())
            }
            Intent::Navigate(page) if page.is_addressable() => return Flow::Navigate(page),
            Intent::Navigate(page) => {
                warn!("Ignoring link to {:?} without an id", page);
                Ok(())
            }
            Intent::Quit => return Flow::Quit,
        };

        if let Err(e) = outcome {
            warn!("Rejected intent: {}", e);
            self.status(format!("Error: {}", e));
        }
        Flow::Continue
    }

    /// Apply one intent and wait for any refresh it started.
    pub async fn handle(&mut self, intent: Intent) -> Flow {
        let flow = self.dispatch(intent).await;
        self.settle().await;
        flow
    }

    /// Boot, then react to intents until the channel closes or the user
    /// leaves the page. Refresh cycles run beside the loop, so a slow panel
    /// never holds up typing or period changes.
    pub async fn run(mut self, mut intents: mpsc::UnboundedReceiver<Intent>) -> Flow {
        if self.load_periods().await {
            self.start_cycle(Change::Boot);
        }

        let flow = loop {
            tokio::select! {
                intent = intents.recv() => match intent {
                    Some(intent) => match self.dispatch(intent).await {
                        Flow::Continue => {}
                        other => break other,
                    },
                    None => break Flow::Quit,
                },
                Some(update) = self.updates_rx.recv() => {
                    self.absorb(update);
                }
            }
        };

        if let Some(search) = &self.search {
            search.cancel_pending();
        }
        flow
    }
}

impl Drop for DashboardController {
    fn drop(&mut self) {
        if let Some(cycle) = self.in_flight.take() {
            cycle.task.abort();
        }
    }
}
