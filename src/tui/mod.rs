//! Terminal front-end.
//!
//! One controller task per page. Controller events arrive on an mpsc channel
//! and are folded into [`App`]; key presses become [`Intent`]s. Opening a
//! row asks the controller to navigate; once its task ends with the linked
//! page, it is replaced by a controller for that page.

mod canvas;
mod ui;

use std::io::stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::client::{HttpClient, JsonSource};
use crate::config::DashboardConfig;
use crate::controller::{DashboardController, DashboardEvent, Flow, Intent, IntentSender, Phase};
use crate::page::{Page, PeriodAxis};
use crate::panel::{Kpi, PanelView};
use crate::state::Snapshot;

const SEARCH_SLOT: &str = "search";

/// Last known state of one panel region.
#[derive(Debug, Clone)]
struct PanelSlot {
    id: String,
    title: String,
    view: PanelView,
    kpis: Vec<Kpi>,
}

/// How the user left a page.
enum Exit {
    Quit,
    Back,
    Open(Page),
}

/// TUI Application State
struct App {
    page: Page,
    status: String,
    search_status: String,
    phase: Phase,
    periods: Vec<String>,
    selection: Option<Snapshot>,
    slots: Vec<PanelSlot>,
    input: String,
    editing: bool,
    focus: usize,
    cursor: usize,
    intents: IntentSender,
}

impl App {
    fn new(page: Page, intents: IntentSender) -> Self {
        let mut slots = Vec::new();
        if page.has_search() {
            slots.push(PanelSlot {
                id: SEARCH_SLOT.to_string(),
                title: "Search (US)".to_string(),
                view: PanelView::Message("Type / to search videos or channels.".to_string()),
                kpis: Vec::new(),
            });
        }
        Self {
            page,
            status: "Idle".to_string(),
            search_status: String::new(),
            phase: Phase::Idle,
            periods: Vec::new(),
            selection: None,
            slots,
            input: String::new(),
            editing: false,
            focus: 0,
            cursor: 0,
            intents,
        }
    }

    fn send(&self, intent: Intent) {
        debug!("Intent: {:?}", intent);
        let _ = self.intents.send(intent);
    }

    fn upsert(&mut self, slot: PanelSlot) {
        match self.slots.iter_mut().find(|s| s.id == slot.id) {
            Some(existing) => *existing = slot,
            None => {
                // panels before the search slot, in first-seen order
                let at = self
                    .slots
                    .iter()
                    .position(|s| s.id == SEARCH_SLOT)
                    .unwrap_or(self.slots.len());
                self.slots.insert(at, slot);
            }
        }
        self.clamp_cursor();
    }

    fn apply(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::Phase(phase) => self.phase = phase,
            DashboardEvent::Status(status) => self.status = status,
            DashboardEvent::PeriodsLoaded { keys, .. } => self.periods = keys,
            DashboardEvent::Selection(snapshot) => self.selection = Some(snapshot),
            DashboardEvent::PanelRendered { panel, title, view, kpis } => {
                self.upsert(PanelSlot { id: panel, title, view, kpis });
            }
            DashboardEvent::SearchStatus(status) => self.search_status = status,
            DashboardEvent::SearchRendered { view, kpis } => {
                self.upsert(PanelSlot {
                    id: SEARCH_SLOT.to_string(),
                    title: "Search (US)".to_string(),
                    view,
                    kpis,
                });
            }
            DashboardEvent::SearchCleared => {
                self.upsert(PanelSlot {
                    id: SEARCH_SLOT.to_string(),
                    title: "Search (US)".to_string(),
                    view: PanelView::Message(String::new()),
                    kpis: Vec::new(),
                });
            }
            DashboardEvent::CycleFinished { change, report } => {
                info!("{:?} cycle finished: {:?}", change, report);
            }
        }
    }

    fn focused(&self) -> Option<&PanelSlot> {
        self.slots.get(self.focus)
    }

    fn targets(&self) -> Vec<Page> {
        self.focused().map(|s| ui::targets(&s.view)).unwrap_or_default()
    }

    fn clamp_cursor(&mut self) {
        let n = self.targets().len();
        self.cursor = if n == 0 { 0 } else { self.cursor.min(n - 1) };
    }

    fn focus_next(&mut self, step: isize) {
        if self.slots.is_empty() {
            return;
        }
        let n = self.slots.len() as isize;
        self.focus = ((self.focus as isize + step).rem_euclid(n)) as usize;
        self.cursor = 0;
    }

    fn key(&mut self, key: KeyEvent) -> Option<Exit> {
        if self.editing {
            match key.code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => {
                    self.editing = false;
                    self.send(Intent::SearchNow);
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    self.send(Intent::SetQuery(self.input.clone()));
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.send(Intent::SetQuery(self.input.clone()));
                }
                _ => {}
            }
            return None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Some(Exit::Quit),
            KeyCode::Char('b') | KeyCode::Backspace => return Some(Exit::Back),
            KeyCode::Char('r') => self.send(Intent::Refresh),
            KeyCode::Left | KeyCode::Char('[') => self.send(Intent::StepPeriod(-1)),
            KeyCode::Right | KeyCode::Char(']') => self.send(Intent::StepPeriod(1)),
            KeyCode::Home => {
                if let Some(latest) = self.periods.first() {
                    match self.page.axis() {
                        PeriodAxis::Dates => self.send(Intent::SelectDate(latest.clone())),
                        PeriodAxis::Months => self.send(Intent::SelectMonth(latest.clone())),
                        PeriodAxis::None => {}
                    }
                }
            }
            KeyCode::Char('/') if self.page.has_search() => {
                self.editing = true;
                if let Some(at) = self.slots.iter().position(|s| s.id == SEARCH_SLOT) {
                    self.focus = at;
                    self.cursor = 0;
                }
            }
            KeyCode::Char('s') if self.page.has_search() => self.send(Intent::ToggleSearchScope),
            KeyCode::Char('t') if self.page.has_search() => self.send(Intent::ToggleSearchType),
            KeyCode::Char('m') if self.page.has_tag_metric() => self.send(Intent::ToggleTagMetric),
            KeyCode::Tab => self.focus_next(1),
            KeyCode::BackTab => self.focus_next(-1),
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                self.cursor += 1;
                self.clamp_cursor();
            }
            KeyCode::Enter => {
                if let Some(target) = self.targets().into_iter().nth(self.cursor) {
                    self.send(Intent::Navigate(target));
                }
            }
            _ => {}
        }
        None
    }
}

/// Run the dashboard in the terminal until the user quits.
pub async fn run(config: DashboardConfig, start: Page) -> Result<()> {
    let source: Arc<dyn JsonSource> = Arc::new(HttpClient::new(config.base_url.clone()));
    info!("Dashboard starting against {}", config.base_url);

    enable_raw_mode().context("enabling raw mode")?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = navigate(&mut terminal, source, &config, start).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    result
}

async fn navigate(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    source: Arc<dyn JsonSource>,
    config: &DashboardConfig,
    start: Page,
) -> Result<()> {
    let mut page = start;
    let mut history: Vec<Page> = Vec::new();

    loop {
        info!("Opening {}", page);
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (intent_tx, intent_rx) = mpsc::unbounded_channel();
        let controller = DashboardController::new(source.clone(), page.clone(), config, event_tx);
        let mut worker = tokio::spawn(controller.run(intent_rx));

        let mut app = App::new(page.clone(), intent_tx);
        let exit = drive(terminal, &mut app, event_rx, &mut worker).await;
        app.send(Intent::Quit);
        worker.abort();

        match exit? {
            Exit::Quit => return Ok(()),
            Exit::Back => match history.pop() {
                Some(previous) => page = previous,
                None => return Ok(()),
            },
            Exit::Open(next) => {
                history.push(std::mem::replace(&mut page, next));
            }
        }
    }
}

async fn drive(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    mut events: mpsc::UnboundedReceiver<DashboardEvent>,
    worker: &mut JoinHandle<Flow>,
) -> Result<Exit> {
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        // Handle controller events
        while let Ok(event) = events.try_recv() {
            app.apply(event);
        }

        if worker.is_finished() {
            return match worker.await.context("controller task failed")? {
                Flow::Navigate(next) => Ok(Exit::Open(next)),
                Flow::Quit | Flow::Continue => Ok(Exit::Quit),
            };
        }

        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(exit) = app.key(key) {
                        return Ok(exit);
                    }
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
            // let the controller task make progress between frames
            tokio::task::yield_now().await;
        }
    }
}
