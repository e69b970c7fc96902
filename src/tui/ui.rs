//! Frame layout and per-view widgets.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Row, Table as TableWidget, TableState, Wrap},
    Frame,
};

use super::{canvas, App, PanelSlot};
use crate::controller::Phase;
use crate::page::{Page, PeriodAxis};
use crate::panel::{Card, PanelView, Table};

/// Pages reachable from a view, in cursor order.
pub(super) fn targets(view: &PanelView) -> Vec<Page> {
    match view {
        PanelView::Table(table) => table_targets(table),
        PanelView::Card(card) => {
            let mut out: Vec<Page> = card.pages.iter().map(|(_, page)| page.clone()).collect();
            for (_, section) in &card.sections {
                if let PanelView::Table(table) = section {
                    out.extend(table_targets(table));
                }
            }
            out
        }
        _ => Vec::new(),
    }
}

fn table_targets(table: &Table) -> Vec<Page> {
    table.rows.iter().filter_map(|row| row.target.clone()).collect()
}

pub(super) fn ui(f: &mut Frame, app: &App) {
    let search_height = if app.page.has_search() { 3 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(search_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    header(f, app, chunks[0]);
    kpi_strip(f, app, chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(1)])
        .split(chunks[2]);
    panel_list(f, app, body[0]);
    match app.focused() {
        Some(slot) => panel(f, slot, app.cursor, body[1]),
        None => {
            let waiting = Paragraph::new("Waiting for data...")
                .block(Block::default().borders(Borders::ALL));
            f.render_widget(waiting, body[1]);
        }
    }

    if app.page.has_search() {
        search_box(f, app, chunks[3]);
    }
    footer(f, app, chunks[4]);
}

fn bold(text: &str) -> Span<'_> {
    Span::styled(text, Style::default().add_modifier(Modifier::BOLD))
}

fn header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![bold(" Period: ")];
    match (&app.selection, app.page.axis()) {
        (Some(snap), PeriodAxis::Dates) => {
            let date = snap.selected_date.as_ref().map(|d| d.as_str()).unwrap_or("-");
            spans.push(Span::styled(date.to_string(), Style::default().fg(Color::Cyan)));
        }
        (Some(snap), PeriodAxis::Months) => {
            let month = snap.selected_month.as_ref().map(|m| m.label()).unwrap_or("-");
            spans.push(Span::styled(month.to_string(), Style::default().fg(Color::Cyan)));
        }
        _ => spans.push(Span::from("-")),
    }
    if !app.periods.is_empty() {
        spans.push(Span::from(format!("  ({} available)", app.periods.len())));
    }
    if let Some(snap) = &app.selection {
        if app.page.has_search() {
            spans.push(bold("  Search: "));
            spans.push(Span::from(format!(
                "{} / {}",
                snap.search_type.as_str(),
                snap.search_scope.as_str()
            )));
        }
        if app.page.has_tag_metric() {
            spans.push(bold("  Rank by: "));
            spans.push(Span::from(snap.tag_metric.as_str()));
        }
    }

    let para = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", app.page)));
    f.render_widget(para, area);
}

fn kpi_strip(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = Vec::new();
    for slot in &app.slots {
        for kpi in &slot.kpis {
            spans.push(Span::styled(
                format!("{}: ", kpi.label),
                Style::default().add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(kpi.value.clone(), Style::default().fg(Color::Green)));
            spans.push(Span::from("   "));
        }
    }
    let para = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" KPIs "));
    f.render_widget(para, area);
}

fn slot_badge(view: &PanelView) -> (String, Color) {
    match view {
        PanelView::Loading => ("…".to_string(), Color::Yellow),
        PanelView::Failed(_) => ("!".to_string(), Color::Red),
        PanelView::Message(_) => ("-".to_string(), Color::DarkGray),
        PanelView::Table(table) => (table.rows.len().to_string(), Color::Green),
        PanelView::Chart(_) | PanelView::Card(_) => ("✓".to_string(), Color::Green),
    }
}

fn panel_list(f: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let (badge, color) = slot_badge(&slot.view);
            let marker = if i == app.focus { "▶ " } else { "  " };
            let mut title = Style::default();
            if i == app.focus {
                title = title.add_modifier(Modifier::BOLD);
            }
            ListItem::new(Line::from(vec![
                Span::from(marker),
                Span::styled(slot.title.clone(), title),
                Span::from(" "),
                Span::styled(badge, Style::default().fg(color)),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Panels "));
    f.render_widget(list, area);
}

fn panel(f: &mut Frame, slot: &PanelSlot, cursor: usize, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", slot.title));
    view(f, &slot.view, Some(cursor), block, area);
}

fn view(f: &mut Frame, view: &PanelView, cursor: Option<usize>, block: Block, area: Rect) {
    match view {
        PanelView::Loading => {
            let para = Paragraph::new("Loading...")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            f.render_widget(para, area);
        }
        PanelView::Message(text) => {
            let para = Paragraph::new(text.as_str()).wrap(Wrap { trim: true }).block(block);
            f.render_widget(para, area);
        }
        PanelView::Failed(text) => {
            let para = Paragraph::new(text.as_str())
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            f.render_widget(para, area);
        }
        PanelView::Table(table) => table_widget(f, table, cursor, block, area),
        PanelView::Chart(chart) => {
            let inner = block.inner(area);
            f.render_widget(block, area);
            let parts = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(1), Constraint::Min(1)])
                .split(inner);
            f.render_widget(Paragraph::new(chart.summary.as_str()), parts[0]);
            f.render_widget(canvas::chart(&chart.display, parts[1]), parts[1]);
        }
        PanelView::Card(card) => card_widget(f, card, cursor.unwrap_or(0), block, area),
    }
}

fn table_widget(f: &mut Frame, table: &Table, cursor: Option<usize>, mut block: Block, area: Rect) {
    if let Some(note) = &table.note {
        block = block.title_bottom(Line::from(format!(" {} ", note)).style(Style::default().fg(Color::DarkGray)));
    }

    let n = table.columns.len().max(1) as u16;
    let widths: Vec<Constraint> = (0..n)
        .map(|i| {
            if i == 0 && n > 1 {
                Constraint::Percentage(40)
            } else if n > 1 {
                Constraint::Percentage(60 / (n - 1))
            } else {
                Constraint::Percentage(100)
            }
        })
        .collect();

    let header = Row::new(table.columns.clone()).style(Style::default().add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = table.rows.iter().map(|row| Row::new(row.cells.clone())).collect();
    let widget = TableWidget::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶ ");

    let mut state = TableState::default().with_selected(cursor.filter(|_| !table.rows.is_empty()));
    f.render_stateful_widget(widget, area, &mut state);
}

fn card_widget(f: &mut Frame, card: &Card, cursor: usize, block: Block, area: Rect) {
    let mut lines = vec![Line::from(bold(&card.heading))];
    lines.extend(card.lines.iter().map(|l| Line::from(l.as_str())));
    for (i, (label, _)) in card.pages.iter().enumerate() {
        let style = if i == cursor {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Cyan)
        };
        lines.push(Line::from(Span::styled(format!("→ {}", label), style)));
    }
    for link in &card.links {
        lines.push(Line::from(vec![
            Span::from(format!("{}: ", link.label)),
            Span::styled(link.url.clone(), Style::default().fg(Color::Blue)),
        ]));
    }

    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(lines.len() as u16)];
    constraints.extend(card.sections.iter().map(|_| Constraint::Min(3)));
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);
    f.render_widget(Paragraph::new(lines), parts[0]);

    let mut offset = card.pages.len();
    for ((title, section), rect) in card.sections.iter().zip(parts.iter().skip(1)) {
        let section_block = Block::default().borders(Borders::TOP).title(format!(" {} ", title));
        let selected = match section {
            PanelView::Table(table) => {
                let linked = table_targets(table).len();
                let local = cursor.checked_sub(offset).filter(|c| *c < linked);
                offset += linked;
                local
            }
            _ => None,
        };
        view(f, section, selected, section_block, *rect);
    }
}

fn search_box(f: &mut Frame, app: &App, area: Rect) {
    let title = if app.editing { " Search (typing, Enter to run) " } else { " Search (/ to type) " };
    let color = if app.editing { Color::Yellow } else { Color::Cyan };
    let mut spans = vec![Span::styled(app.input.as_str(), Style::default().fg(color))];
    if !app.search_status.is_empty() {
        spans.push(Span::styled(
            format!("   {}", app.search_status),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let para = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(para, area);
}

fn footer(f: &mut Frame, app: &App, area: Rect) {
    let color = match app.phase {
        Phase::Loading => Color::Yellow,
        Phase::Error(_) => Color::Red,
        Phase::NoData => Color::DarkGray,
        Phase::Ready | Phase::Idle => Color::Green,
    };
    let line = Line::from(vec![
        bold("Status: "),
        Span::styled(app.status.as_str(), Style::default().fg(color)),
        Span::styled(
            "   q quit · r refresh · ←/→ period · Tab panel · Enter open · b back",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::TableRow;

    #[test]
    fn test_card_targets_follow_pages_then_sections() {
        let mut section = Table::new(["Video"]);
        section.push(TableRow::new(vec!["a".into()]).linked(Page::Video { id: "a".into() }));
        section.push(TableRow::new(vec!["unlinked".into()]));
        let card = Card {
            heading: "Channel".into(),
            pages: vec![("More".into(), Page::Channel { id: "c".into() })],
            sections: vec![("Videos".into(), PanelView::Table(section))],
            ..Card::default()
        };
        assert_eq!(
            targets(&PanelView::Card(card)),
            vec![Page::Channel { id: "c".into() }, Page::Video { id: "a".into() }]
        );
    }

    #[test]
    fn test_placeholders_have_no_targets() {
        assert!(targets(&PanelView::Loading).is_empty());
        assert!(targets(&PanelView::Message("No rows.".into())).is_empty());
    }
}
