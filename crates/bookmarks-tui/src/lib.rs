// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use bookmarks_app::{
    ArticleRow, ColumnHeader, MISSING_CELL, SortField, ViewCommand, ViewEvent, ViewModel,
};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::warn;

const LINK_ARROW: &str = "→";
const SEARCH_PLACEHOLDER: &str = "Search articles";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

/// Everything the terminal loop needs from the host: the current view, a way
/// to apply commands, and periodic data refresh.
pub trait AppRuntime {
    fn view(&self) -> ViewModel;
    fn dispatch(&mut self, command: ViewCommand) -> Vec<ViewEvent>;
    /// Re-fetches rows when due, or unconditionally with `force`. Returns the
    /// new row count when a fetch happened.
    fn revalidate(&mut self, force: bool) -> Result<Option<usize>>;
    fn archive_base_url(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum InputMode {
    #[default]
    Browse,
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Command(ViewCommand),
    MoveSelection(isize),
    SelectFirst,
    SelectLast,
    StartSearch,
    OpenSelected,
    Refresh,
    ToggleHelp,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SearchAction {
    Insert(char),
    Backspace,
    ClearDraft,
    Commit,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    input: InputMode,
    search_draft: String,
    selected_row: usize,
    status: Option<String>,
    status_token: u64,
    help_visible: bool,
}

pub fn run_app<R: AppRuntime>(runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();
    let mut view = runtime.view();

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);
        if revalidate(runtime, &mut view_data, &internal_tx, false) {
            view = runtime.view();
        }
        clamp_selection(&mut view_data, &view);

        if let Err(error) = terminal.draw(|frame| render(frame, &view, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                    view = runtime.view();
                }
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the view changed.
fn revalidate<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    force: bool,
) -> bool {
    match runtime.revalidate(force) {
        Ok(Some(count)) => {
            if force {
                emit_status(view_data, internal_tx, format!("reloaded {count} articles"));
            }
            true
        }
        Ok(None) => false,
        Err(error) => {
            warn!(error = %format!("{error:#}"), "article refresh failed");
            emit_status(
                view_data,
                internal_tx,
                format!("load failed: {error}; showing previously loaded articles"),
            );
            false
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    match view_data.input {
        InputMode::Search => {
            handle_search_key(runtime, view_data, internal_tx, key);
            false
        }
        InputMode::Browse => {
            let view = runtime.view();
            match browse_action_for_key(key, &view) {
                KeyAction::Quit => return true,
                KeyAction::Command(command) => {
                    apply_command(runtime, view_data, internal_tx, command);
                }
                KeyAction::MoveSelection(delta) => {
                    let last = view.rows.len().saturating_sub(1);
                    let next = view_data.selected_row.saturating_add_signed(delta);
                    view_data.selected_row = next.min(last);
                }
                KeyAction::SelectFirst => view_data.selected_row = 0,
                KeyAction::SelectLast => {
                    view_data.selected_row = view.rows.len().saturating_sub(1);
                }
                KeyAction::StartSearch => {
                    view_data.input = InputMode::Search;
                    view_data.search_draft = view.search_term.clone();
                }
                KeyAction::OpenSelected => {
                    let message = view
                        .rows
                        .get(view_data.selected_row)
                        .and_then(|row| row_link(row, runtime.archive_base_url()))
                        .map(|link| format!("link: {link}"))
                        .unwrap_or_else(|| "no link for this article".to_owned());
                    emit_status(view_data, internal_tx, message);
                }
                KeyAction::Refresh => {
                    revalidate(runtime, view_data, internal_tx, true);
                }
                KeyAction::ToggleHelp => view_data.help_visible = true,
                KeyAction::Ignored => {}
            }
            false
        }
    }
}

fn handle_search_key<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match search_action_for_key(key) {
        SearchAction::Insert(ch) => {
            view_data.search_draft.push(ch);
            let draft = view_data.search_draft.clone();
            apply_command(runtime, view_data, internal_tx, ViewCommand::SetSearch(draft));
        }
        SearchAction::Backspace => {
            if view_data.search_draft.pop().is_some() {
                let draft = view_data.search_draft.clone();
                apply_command(runtime, view_data, internal_tx, ViewCommand::SetSearch(draft));
            }
        }
        SearchAction::ClearDraft => {
            view_data.search_draft.clear();
            apply_command(runtime, view_data, internal_tx, ViewCommand::ClearSearch);
        }
        SearchAction::Commit => view_data.input = InputMode::Browse,
        SearchAction::Cancel => {
            view_data.input = InputMode::Browse;
            view_data.search_draft.clear();
            apply_command(runtime, view_data, internal_tx, ViewCommand::ClearSearch);
        }
        SearchAction::Ignored => {}
    }
}

fn apply_command<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: ViewCommand,
) {
    let events = runtime.dispatch(command);
    if events.is_empty() {
        return;
    }
    let view = runtime.view();
    view_data.selected_row = 0;
    if let Some(message) = status_for_events(&events, &view) {
        emit_status(view_data, internal_tx, message);
    }
}

fn browse_action_for_key(key: KeyEvent, view: &ViewModel) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyAction::Quit,
            KeyCode::Char('d') => KeyAction::MoveSelection(10),
            KeyCode::Char('u') => KeyAction::MoveSelection(-10),
            _ => KeyAction::Ignored,
        };
    }

    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('/') => KeyAction::StartSearch,
        KeyCode::Esc if !view.search_term.is_empty() => {
            KeyAction::Command(ViewCommand::ClearSearch)
        }
        KeyCode::Char(digit @ '1'..='4') => {
            let index = digit as usize - '1' as usize;
            KeyAction::Command(ViewCommand::HeaderClicked(SortField::ALL[index]))
        }
        KeyCode::Char('s') => KeyAction::Command(ViewCommand::HeaderClicked(view.sort.field)),
        KeyCode::Char('[') | KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => {
            KeyAction::Command(ViewCommand::PreviousPage)
        }
        KeyCode::Char(']') | KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => {
            KeyAction::Command(ViewCommand::NextPage)
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            page_size_action(view, PageSizeStep::Larger)
        }
        KeyCode::Char('-') => page_size_action(view, PageSizeStep::Smaller),
        KeyCode::Char('j') | KeyCode::Down => KeyAction::MoveSelection(1),
        KeyCode::Char('k') | KeyCode::Up => KeyAction::MoveSelection(-1),
        KeyCode::Char('g') | KeyCode::Home => KeyAction::SelectFirst,
        KeyCode::Char('G') | KeyCode::End => KeyAction::SelectLast,
        KeyCode::Enter => KeyAction::OpenSelected,
        KeyCode::Char('r') => KeyAction::Refresh,
        KeyCode::Char('?') => KeyAction::ToggleHelp,
        _ => KeyAction::Ignored,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageSizeStep {
    Larger,
    Smaller,
}

fn page_size_action(view: &ViewModel, step: PageSizeStep) -> KeyAction {
    let options = &view.page_size_options;
    let current = view.pagination.page_size;
    let next = match step {
        PageSizeStep::Larger => options.next_after(current),
        PageSizeStep::Smaller => options.previous_before(current),
    };
    match i64::try_from(next) {
        Ok(size) => KeyAction::Command(ViewCommand::SetPageSize(size)),
        Err(_) => KeyAction::Ignored,
    }
}

fn search_action_for_key(key: KeyEvent) -> SearchAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('u') => SearchAction::ClearDraft,
            _ => SearchAction::Ignored,
        };
    }
    match key.code {
        KeyCode::Char(ch) => SearchAction::Insert(ch),
        KeyCode::Backspace => SearchAction::Backspace,
        KeyCode::Enter => SearchAction::Commit,
        KeyCode::Esc => SearchAction::Cancel,
        _ => SearchAction::Ignored,
    }
}

fn status_for_events(events: &[ViewEvent], view: &ViewModel) -> Option<String> {
    events.iter().rev().find_map(|event| match event {
        ViewEvent::SortChanged(_) => Some(view.active_sort_label()),
        ViewEvent::PageSizeChanged(size) => Some(format!("{size} rows per page")),
        ViewEvent::SearchChanged(term) if term.is_empty() => Some("search cleared".to_owned()),
        ViewEvent::SearchChanged(_) | ViewEvent::PageChanged(_) => None,
    })
}

fn clamp_selection(view_data: &mut ViewData, view: &ViewModel) {
    let last = view.rows.len().saturating_sub(1);
    view_data.selected_row = view_data.selected_row.min(last);
}

fn row_link(row: &ArticleRow, archive_base_url: Option<&str>) -> Option<String> {
    if let Some(url) = row.url.as_deref().filter(|url| !url.trim().is_empty()) {
        return Some(url.to_owned());
    }
    archive_base_url
        .filter(|base| !base.is_empty())
        .and_then(|base| row.archive_href(base))
}

fn cell_text(row: &ArticleRow, field: SortField) -> String {
    let value = match field {
        SortField::Title => {
            let title = row.display_title();
            return if row.url.is_some() {
                format!("{title} {LINK_ARROW}")
            } else {
                title.to_owned()
            };
        }
        SortField::Creator => row.creator.clone(),
        SortField::Site => row.site.clone(),
        SortField::Tags => row.tags_label(),
    };
    value
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| MISSING_CELL.to_owned())
}

fn header_text(index: usize, column: &ColumnHeader) -> String {
    format!("{} {} [{}]", index + 1, column.label, column.indicator.symbol())
}

fn search_line(view: &ViewModel, view_data: &ViewData) -> Line<'static> {
    let searching = view_data.input == InputMode::Search;
    let text = if searching {
        view_data.search_draft.clone()
    } else {
        view.search_term.clone()
    };

    let mut spans = Vec::new();
    if text.is_empty() && !searching {
        spans.push(Span::styled(
            format!("{SEARCH_PLACEHOLDER} (/)"),
            Style::default().fg(Color::DarkGray),
        ));
    } else {
        spans.push(Span::raw(text));
    }
    if !view.search_term.is_empty() {
        spans.push(Span::styled(
            "  [esc] clear",
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn pagination_line(view: &ViewModel) -> Line<'static> {
    let enabled = Style::default().fg(Color::White);
    let disabled = Style::default().fg(Color::DarkGray);
    let pagination = view.pagination;

    let mut spans = vec![
        Span::raw(view.summary()),
        Span::raw("  |  rows per page:"),
    ];
    for option in view.page_size_options.as_slice() {
        let style = if *option == pagination.page_size {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            disabled
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(option.to_string(), style));
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        "[ previous",
        if pagination.can_go_previous {
            enabled
        } else {
            disabled
        },
    ));
    spans.push(Span::raw(format!("  page {}  ", view.page_label())));
    spans.push(Span::styled(
        "next ]",
        if pagination.can_go_next {
            enabled
        } else {
            disabled
        },
    ));
    Line::from(spans)
}

fn status_text(view: &ViewModel, view_data: &ViewData) -> String {
    if let Some(status) = &view_data.status {
        return status.clone();
    }
    match view_data.input {
        InputMode::Search => "type to search | enter keep | esc clear | ctrl+u erase".to_owned(),
        InputMode::Browse => format!(
            "{} | / search | 1-4 sort | s flip | [/] page | +/- rows | enter link | r reload | ? help | q quit",
            view.active_sort_label()
        ),
    }
}

fn help_overlay_text() -> &'static str {
    "browse: j/k move | g/G first/last | ctrl+d/u jump 10 | enter show link\n\
sort: 1 title | 2 creator | 3 site | 4 tags | s flip active column\n\
pages: [ or h previous | ] or l next | + larger | - smaller\n\
search: / edit | esc clear | enter keep term | ctrl+u erase\n\
data: r reload now\n\
quit: q | ctrl+q | ctrl+c"
}

fn render(frame: &mut ratatui::Frame<'_>, view: &ViewModel, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let search_style = if view_data.input == InputMode::Search {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };
    let search = Paragraph::new(search_line(view, view_data)).block(
        Block::default()
            .title("bookmarks")
            .borders(Borders::ALL)
            .border_style(search_style),
    );
    frame.render_widget(search, layout[0]);
    if view_data.input == InputMode::Search {
        let width = u16::try_from(view_data.search_draft.chars().count()).unwrap_or(u16::MAX);
        frame.set_cursor_position((
            layout[0]
                .x
                .saturating_add(1)
                .saturating_add(width)
                .min(layout[0].right().saturating_sub(2)),
            layout[0].y.saturating_add(1),
        ));
    }

    render_table(frame, layout[1], view, view_data);

    if view.shows_pagination() {
        let nav = Paragraph::new(pagination_line(view))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(nav, layout[2]);
    }

    let status = Paragraph::new(status_text(view, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(status, layout[3]);

    if view_data.help_visible {
        let area = centered_rect(70, 40, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, view: &ViewModel, view_data: &ViewData) {
    let block = Block::default()
        .title(view.active_sort_label())
        .borders(Borders::ALL);

    if let Some(empty) = &view.empty_state {
        let message = Paragraph::new(empty.message())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(message, area);
        return;
    }

    let header = Row::new(view.columns.iter().enumerate().map(|(index, column)| {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if column.is_active() {
            style = style.fg(Color::Cyan);
        }
        Cell::from(header_text(index, column)).style(style)
    }));

    let rows = view.rows.iter().enumerate().map(|(index, row)| {
        let style = if index == view_data.selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        Row::new(
            SortField::ALL
                .into_iter()
                .map(|field| Cell::from(cell_text(row, field))),
        )
        .style(style)
    });

    let widths = [
        Constraint::Percentage(40),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
        Constraint::Percentage(20),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(block);
    frame.render_widget(table, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
