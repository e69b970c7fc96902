//! Render-ready panel output.
//!
//! Views are plain data so any front-end (the terminal UI, a snapshot test)
//! can draw them without knowing which panel produced them.

use crate::chart::DisplayList;
use crate::page::Page;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Loading,
    /// Literal placeholder such as "No rows." instead of an empty table shell.
    Message(String),
    /// Literal error text embedding the underlying status/message.
    Failed(String),
    Table(Table),
    Chart(ChartView),
    Card(Card),
}

impl PanelView {
    /// Plain text of a placeholder, failure or loading view.
    pub fn text(&self) -> Option<&str> {
        match self {
            PanelView::Loading => Some("Loading..."),
            PanelView::Message(text) | PanelView::Failed(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            PanelView::Table(table) => Some(table),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
    /// Footnote shown under the table.
    pub note: Option<String>,
}

impl Table {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn push(&mut self, row: TableRow) {
        self.rows.push(row);
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<String>,
    /// Page the row opens when activated.
    pub target: Option<Page>,
}

impl TableRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells, target: None }
    }

    /// Rows whose target has no id stay unlinked.
    pub fn linked(mut self, target: Page) -> Self {
        if target.is_addressable() {
            self.target = Some(target);
        }
        self
    }
}

/// Drawn chart plus the one-line summary shown above it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub summary: String,
    pub display: DisplayList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Detail layout: headline, fact lines, links and sub-sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Card {
    pub heading: String,
    pub lines: Vec<String>,
    /// Other dashboard pages reachable from this card.
    pub pages: Vec<(String, Page)>,
    /// Outbound links to the video platform.
    pub links: Vec<Link>,
    pub sections: Vec<(String, PanelView)>,
}
