// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use sesh_app::{
    AppCommand, AppEvent, AppState, DatasetSummary, DateSpan, DayCounts, Heatmap, ListeningStats,
    ModalControl, ModalKind, Mode, OnThisDayIndex, OnThisDayView, PaginationControls,
    PaginationItem, Panel, Peak, PlayMark, ProjectionEngine, RenderQueue, RenderedRow,
    RenderedTable, RowSource, Segment, TableId, Theme, YearScope, format_date, hour_label,
    ms_to_hms,
};
use std::collections::BTreeMap;
use std::io;
use std::ops::Range;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::macros::format_description;
use time::{Date, Month};
use tracing::{debug, warn};

const WEEKDAY_GUTTER: usize = 4;
const CELL_WIDTH: usize = 2;
const WEEKDAY_LABELS: [&str; 7] = ["Mon", "", "Wed", "", "Fri", "", "Sun"];

/// Data access the dashboard needs beyond ranked table rows.
pub trait AppRuntime: RowSource {
    fn day_counts(&self) -> &DayCounts;
    fn date_range(&self, scope: YearScope) -> Option<(Date, Date)>;
    fn on_this_day_index(&self) -> &OnThisDayIndex;
    fn summary(&self) -> DatasetSummary;
    fn stats(&self) -> &ListeningStats;
    fn save_theme(&mut self, theme: Theme) -> Result<()>;
    fn today(&self) -> Date;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiOptions {
    pub items_per_page: usize,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self { items_per_page: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Palette {
    background: Color,
    text: Color,
    dim: Color,
    accent: Color,
    marked_fg: Color,
    marked_bg: Color,
    levels: [Color; 5],
}

const DARK_PALETTE: Palette = Palette {
    background: Color::Rgb(18, 18, 18),
    text: Color::Rgb(230, 230, 230),
    dim: Color::Rgb(120, 120, 120),
    accent: Color::Rgb(29, 185, 84),
    marked_fg: Color::Rgb(18, 18, 18),
    marked_bg: Color::Rgb(240, 200, 80),
    levels: [
        Color::Rgb(40, 44, 52),
        Color::Rgb(14, 68, 41),
        Color::Rgb(0, 109, 50),
        Color::Rgb(38, 166, 65),
        Color::Rgb(57, 211, 83),
    ],
};

const LIGHT_PALETTE: Palette = Palette {
    background: Color::Rgb(250, 250, 250),
    text: Color::Rgb(30, 30, 30),
    dim: Color::Rgb(130, 130, 130),
    accent: Color::Rgb(22, 140, 64),
    marked_fg: Color::Rgb(30, 30, 30),
    marked_bg: Color::Rgb(255, 230, 120),
    levels: [
        Color::Rgb(222, 225, 230),
        Color::Rgb(155, 233, 168),
        Color::Rgb(64, 196, 99),
        Color::Rgb(48, 161, 78),
        Color::Rgb(33, 110, 57),
    ],
};

fn palette(theme: Theme) -> &'static Palette {
    match theme {
        Theme::Dark => &DARK_PALETTE,
        Theme::Light => &LIGHT_PALETTE,
    }
}

impl Palette {
    fn base(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    fn dimmed(&self) -> Style {
        Style::default().fg(self.dim)
    }

    fn accented(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    fn marked(&self) -> Style {
        Style::default()
            .fg(self.marked_fg)
            .bg(self.marked_bg)
            .add_modifier(Modifier::BOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchInput {
    table: TableId,
    buffer: String,
}

#[derive(Debug)]
struct ViewData {
    options: UiOptions,
    engine: ProjectionEngine,
    render_queue: RenderQueue,
    tables: BTreeMap<TableId, RenderedTable>,
    search: Option<SearchInput>,
    heatmap: Heatmap,
    heatmap_cursor: Option<Date>,
    on_this_day: OnThisDayView,
    day_detail: Option<String>,
    summary: DatasetSummary,
    stats: ListeningStats,
    today: Option<Date>,
    status_token: u64,
}

impl ViewData {
    fn new(options: UiOptions) -> Self {
        Self {
            options,
            engine: ProjectionEngine::new(),
            render_queue: RenderQueue::new(),
            tables: BTreeMap::new(),
            search: None,
            heatmap: Heatmap::default(),
            heatmap_cursor: None,
            on_this_day: OnThisDayView::default(),
            day_detail: None,
            summary: DatasetSummary::default(),
            stats: ListeningStats::default(),
            today: None,
            status_token: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InternalEvent {
    ClearStatus { token: u64 },
}

pub fn run_app<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    options: UiOptions,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(options);
    let (internal_tx, internal_rx) = mpsc::channel();
    prime_view_data(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        pump_frame(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Queues the first year's tables and builds the day views.
fn prime_view_data<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    view_data.summary = runtime.summary();
    view_data.stats = runtime.stats().clone();
    view_data.today = Some(runtime.today());
    for table in state.visible_tables() {
        view_data.render_queue.request(table);
    }
    rebuild_heatmap(state, runtime, view_data);
    view_data
        .on_this_day
        .lookup(runtime.today(), runtime.on_this_day_index());
    flush_render_queue(state, runtime, view_data, internal_tx);
}

/// One frame of deferred work: expired status tokens, then queued table renders.
fn pump_frame<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    internal_rx: &Receiver<InternalEvent>,
) {
    process_internal_events(state, view_data, internal_rx);
    flush_render_queue(state, runtime, view_data, internal_tx);
}

fn process_internal_events(
    state: &mut AppState,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn flush_render_queue<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    if view_data.render_queue.is_empty() {
        return;
    }
    for table in view_data.render_queue.drain() {
        let rendered = view_data.engine.initialize(
            table,
            view_data.options.items_per_page,
            state.mode,
            &*runtime,
        );
        match rendered {
            Ok(rendered) => {
                debug!(%table, rows = rendered.matched, "rendered table");
                view_data.tables.insert(table, rendered);
            }
            Err(error) => {
                warn!(%table, error = %format!("{error:#}"), "table render failed");
                emit_status(state, view_data, internal_tx, format!("{error:#}"));
            }
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn arm_status_clear(view_data: &mut ViewData, internal_tx: &Sender<InternalEvent>) {
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    arm_status_clear(view_data, internal_tx);
}

/// Runs a command through the state machine and applies its side effects.
fn dispatch<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    let events = view_data.render_queue.absorb(events);
    for event in events {
        match event {
            AppEvent::ThemeChanged(theme) => {
                if let Err(error) = runtime.save_theme(theme) {
                    warn!(error = %format!("{error:#}"), "theme preference not saved");
                    emit_status(
                        state,
                        view_data,
                        internal_tx,
                        format!("theme not saved: {error:#}"),
                    );
                }
            }
            AppEvent::YearChanged(_) => {
                view_data.search = None;
                rebuild_heatmap(state, runtime, view_data);
            }
            AppEvent::ModalClosed(ModalKind::DayDetail) => view_data.day_detail = None,
            AppEvent::StatusUpdated(_) => arm_status_clear(view_data, internal_tx),
            _ => {}
        }
    }
}

fn rebuild_heatmap<R: AppRuntime>(state: &AppState, runtime: &R, view_data: &mut ViewData) {
    let heatmap = match runtime.date_range(state.active_year) {
        Some((start, end)) => Heatmap::build(start, end, runtime.day_counts()),
        None => Heatmap::default(),
    };
    view_data.heatmap_cursor = heatmap.last_date();
    view_data.heatmap = heatmap;
}

fn handle_key_event<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.search.is_some() {
        handle_search_key(state, view_data, internal_tx, key);
        return false;
    }

    if state.modal.is_some() {
        handle_modal_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    let command = match key.code {
        KeyCode::Char('?') => Some(AppCommand::OpenModal(ModalKind::Help)),
        KeyCode::Char('s') => Some(AppCommand::OpenModal(ModalKind::Settings)),
        KeyCode::Char('i') => Some(AppCommand::OpenModal(ModalKind::Info)),
        KeyCode::Char('t') => Some(AppCommand::ToggleTheme),
        KeyCode::Char('m') => Some(AppCommand::ToggleMode),
        KeyCode::Char('b') => Some(AppCommand::PrevYear),
        KeyCode::Char('f') => Some(AppCommand::NextYear),
        KeyCode::Tab => Some(AppCommand::NextPanel),
        KeyCode::BackTab => Some(AppCommand::PrevPanel),
        KeyCode::Char(digit @ '1'..='5') => {
            let index = usize::from(digit as u8 - b'1');
            Panel::ALL.get(index).copied().map(AppCommand::FocusPanel)
        }
        _ => None,
    };
    if let Some(command) = command {
        dispatch(state, runtime, view_data, internal_tx, command);
        return false;
    }

    match state.panel {
        Panel::Artists | Panel::Tracks | Panel::Albums => {
            handle_table_key(state, view_data, internal_tx, key);
        }
        Panel::Heatmap => handle_heatmap_key(state, runtime, view_data, internal_tx, key),
        Panel::OnThisDay => handle_on_this_day_key(runtime, view_data, key),
    }
    false
}

fn handle_table_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(table) = state.active_table() else {
        return;
    };
    if key.code == KeyCode::Char('/') {
        let buffer = view_data.engine.search_term(table).to_owned();
        view_data.search = Some(SearchInput { table, buffer });
        return;
    }

    let Some(controls) = view_data.tables.get(&table).map(|rendered| &rendered.controls) else {
        emit_status(
            state,
            view_data,
            internal_tx,
            format!("table {table} has not been rendered yet"),
        );
        return;
    };
    let target = match key.code {
        KeyCode::Char('h') | KeyCode::Left => controls.prev_target(),
        KeyCode::Char('l') | KeyCode::Right => controls.next_target(),
        KeyCode::Char('g') | KeyCode::Home => Some(1),
        KeyCode::Char('G') | KeyCode::End => Some(controls.window.total_pages),
        _ => return,
    };
    let Some(target) = target else {
        return;
    };
    match view_data.engine.render(table, target) {
        Ok(rendered) => {
            view_data.tables.insert(table, rendered);
        }
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error:#}")),
    }
}

fn handle_search_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(input) = view_data.search.as_mut() else {
        return;
    };
    let finished = match key.code {
        KeyCode::Esc => {
            input.buffer.clear();
            true
        }
        KeyCode::Enter => true,
        KeyCode::Backspace => {
            input.buffer.pop();
            false
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.buffer.push(ch);
            false
        }
        _ => return,
    };
    let table = input.table;
    let term = input.buffer.clone();
    if finished {
        view_data.search = None;
    }

    match view_data.engine.search(table, &term) {
        Ok(rendered) => {
            let matched = rendered.matched;
            view_data.tables.insert(table, rendered);
            if finished {
                let message = if term.trim().is_empty() {
                    "search cleared".to_owned()
                } else {
                    format!("{matched} matches for \"{}\"", term.trim())
                };
                emit_status(state, view_data, internal_tx, message);
            }
        }
        Err(error) => emit_status(state, view_data, internal_tx, format!("{error:#}")),
    }
}

fn handle_modal_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let command = match key.code {
        KeyCode::Esc => Some(AppCommand::CloseModal),
        KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => Some(AppCommand::FocusNext),
        KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => Some(AppCommand::FocusPrev),
        KeyCode::Enter | KeyCode::Char(' ') => match state.focused_control() {
            Some(ModalControl::ThemeToggle) => Some(AppCommand::ToggleTheme),
            Some(ModalControl::ModeToggle) => Some(AppCommand::ToggleMode),
            Some(ModalControl::ShowEveryYearArtists) => {
                Some(AppCommand::OpenModal(ModalKind::EveryYearArtists))
            }
            Some(ModalControl::Close) => Some(AppCommand::CloseModal),
            None => None,
        },
        KeyCode::Char('?') if !state.aria_hidden(ModalKind::Help) => Some(AppCommand::CloseModal),
        _ => None,
    };
    if let Some(command) = command {
        dispatch(state, runtime, view_data, internal_tx, command);
    }
}

fn handle_heatmap_key<R: AppRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(cursor) = view_data.heatmap_cursor else {
        return;
    };
    let step = match key.code {
        KeyCode::Char('h') | KeyCode::Left => -7,
        KeyCode::Char('l') | KeyCode::Right => 7,
        KeyCode::Char('k') | KeyCode::Up => -1,
        KeyCode::Char('j') | KeyCode::Down => 1,
        KeyCode::Enter => {
            if let Some(cell) = view_data.heatmap.cell(cursor) {
                view_data.day_detail = Some(cell.detail());
                dispatch(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    AppCommand::OpenModal(ModalKind::DayDetail),
                );
            }
            return;
        }
        KeyCode::Char('o') => {
            view_data
                .on_this_day
                .lookup(cursor, runtime.on_this_day_index());
            dispatch(
                state,
                runtime,
                view_data,
                internal_tx,
                AppCommand::FocusPanel(Panel::OnThisDay),
            );
            return;
        }
        _ => return,
    };
    view_data.heatmap_cursor = view_data.heatmap.step_cursor(cursor, step);
}

fn handle_on_this_day_key<R: AppRuntime>(runtime: &R, view_data: &mut ViewData, key: KeyEvent) {
    let current = view_data.on_this_day.date().unwrap_or_else(|| runtime.today());
    let date = match key.code {
        KeyCode::Char('h') | KeyCode::Left => current.previous_day(),
        KeyCode::Char('l') | KeyCode::Right => current.next_day(),
        KeyCode::Char('.') => Some(runtime.today()),
        KeyCode::Char('[') => {
            view_data.on_this_day.prev_page();
            return;
        }
        KeyCode::Char(']') => {
            view_data.on_this_day.next_page();
            return;
        }
        _ => return,
    };
    if let Some(date) = date {
        view_data
            .on_this_day
            .lookup(date, runtime.on_this_day_index());
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let palette = palette(state.theme);
    let area = frame.area();
    frame.render_widget(Block::default().style(palette.base()), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    render_year_tabs(frame, chunks[0], state, palette);
    frame.render_widget(Paragraph::new(panel_tabs_line(state, palette)), chunks[1]);

    match state.panel {
        Panel::Artists | Panel::Tracks | Panel::Albums => {
            if let Some(table) = state.active_table() {
                render_entity_table(frame, chunks[2], table, view_data, palette);
            }
        }
        Panel::Heatmap => {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(palette.dimmed())
                .title(format!("listening activity · {}", state.active_year.label()));
            let inner = block.inner(chunks[2]);
            frame.render_widget(block, chunks[2]);
            let lines = heatmap_lines(
                &view_data.heatmap,
                view_data.heatmap_cursor,
                inner.width,
                palette,
            );
            frame.render_widget(Paragraph::new(lines), inner);
        }
        Panel::OnThisDay => {
            let title = view_data
                .on_this_day
                .date()
                .map_or_else(|| "on this day".to_owned(), |date| {
                    format!("on this day · {}", format_date(date))
                });
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(palette.dimmed())
                .title(title);
            frame.render_widget(
                Paragraph::new(on_this_day_lines(&view_data.on_this_day, palette)).block(block),
                chunks[2],
            );
        }
    }

    frame.render_widget(
        Paragraph::new(status_text(state, view_data)).style(palette.dimmed()),
        chunks[3],
    );

    if let Some(modal) = state.modal {
        render_modal(frame, area, modal.kind, state, view_data, palette);
    }
}

fn render_year_tabs(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, palette: &Palette) {
    let titles = state
        .years
        .iter()
        .map(|year| Line::from(year.label()))
        .collect::<Vec<_>>();
    let selected = state
        .years
        .iter()
        .position(|year| state.aria_selected(*year))
        .unwrap_or(0);
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.dimmed())
                .title(format!("sesh · {}", state.mode.as_str())),
        )
        .style(palette.base())
        .highlight_style(palette.accented().add_modifier(Modifier::REVERSED))
        .select(selected);
    frame.render_widget(tabs, area);
}

fn panel_tabs_line(state: &AppState, palette: &Palette) -> Line<'static> {
    let mut spans = Vec::with_capacity(Panel::ALL.len() * 2);
    for (index, panel) in Panel::ALL.iter().enumerate() {
        let label = format!(" {} {} ", index + 1, panel.label());
        let style = if *panel == state.panel {
            palette.accented().add_modifier(Modifier::UNDERLINED)
        } else {
            palette.dimmed()
        };
        spans.push(Span::styled(label, style));
    }
    Line::from(spans)
}

fn render_entity_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    table: TableId,
    view_data: &ViewData,
    palette: &Palette,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.dimmed())
        .title(table_title(table, view_data));
    let Some(rendered) = view_data.tables.get(&table) else {
        frame.render_widget(
            Paragraph::new("loading...").style(palette.dimmed()).block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Row::new(
        rendered
            .columns
            .iter()
            .map(|column| Cell::from(column.clone()).style(palette.accented())),
    );
    let widths = [
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(20),
    ];
    let rows = rendered.rows.iter().filter_map(|row| match row {
        RenderedRow::Data { cells } => Some(Row::new(
            cells
                .iter()
                .map(|segments| Cell::from(segments_line(segments, palette))),
        )),
        RenderedRow::Placeholder { .. } => None,
    });
    let inner = block.inner(chunks[0]);
    frame.render_widget(
        Table::new(rows, widths)
            .header(header)
            .block(block)
            .style(palette.base()),
        chunks[0],
    );

    if let Some(RenderedRow::Placeholder { text, .. }) = rendered.rows.first()
        && rendered.is_placeholder()
        && inner.height > 1
    {
        let row = Rect {
            y: inner.y + 1,
            height: 1,
            ..inner
        };
        frame.render_widget(
            Paragraph::new(text.clone())
                .alignment(Alignment::Center)
                .style(palette.dimmed()),
            row,
        );
    }

    frame.render_widget(
        Paragraph::new(pagination_line(&rendered.controls, palette)),
        chunks[1],
    );
    frame.render_widget(
        Paragraph::new(search_line(rendered, view_data.search.as_ref())).style(palette.dimmed()),
        chunks[2],
    );
}

fn table_title(table: TableId, view_data: &ViewData) -> String {
    let page = view_data
        .tables
        .get(&table)
        .map(|rendered| format!(" · page {}/{}", rendered.page, rendered.total_pages))
        .unwrap_or_default();
    format!(
        "top {} · {}{page}",
        table.entity.title().to_lowercase(),
        table.scope.label()
    )
}

fn segments_line(segments: &[Segment], palette: &Palette) -> Line<'static> {
    Line::from(
        segments
            .iter()
            .map(|segment| {
                if segment.highlighted {
                    Span::styled(segment.text.clone(), palette.marked())
                } else {
                    Span::raw(segment.text.clone())
                }
            })
            .collect::<Vec<_>>(),
    )
}

fn pagination_line(controls: &PaginationControls, palette: &Palette) -> Line<'static> {
    let mut spans = Vec::with_capacity(controls.items.len() * 2);
    for item in &controls.items {
        let style = match item {
            PaginationItem::Prev { disabled: true, .. }
            | PaginationItem::Next { disabled: true, .. }
            | PaginationItem::Gap => palette.dimmed(),
            PaginationItem::Page { active: true, .. } => {
                palette.accented().add_modifier(Modifier::REVERSED)
            }
            _ => Style::default().fg(palette.text),
        };
        if !spans.is_empty() {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(format!(" {} ", item.label()), style));
    }
    Line::from(spans)
}

fn search_line(rendered: &RenderedTable, input: Option<&SearchInput>) -> String {
    if let Some(input) = input
        && input.table == rendered.table
    {
        return format!("/{}_", input.buffer);
    }
    if rendered.search_term.trim().is_empty() {
        format!("{} rows · / to search", rendered.total)
    } else {
        format!(
            "filter \"{}\" · {}/{} rows",
            rendered.search_term.trim(),
            rendered.matched,
            rendered.total
        )
    }
}

/// Column range of width `visible` that keeps `cursor` on screen.
fn heatmap_window(columns: usize, visible: usize, cursor: usize) -> Range<usize> {
    let visible = visible.max(1);
    if columns <= visible {
        return 0..columns;
    }
    let start = (cursor + 1).saturating_sub(visible).min(columns - visible);
    start..start + visible
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

fn month_axis(heatmap: &Heatmap, window: &Range<usize>) -> String {
    let mut axis = vec![' '; WEEKDAY_GUTTER + window.len() * CELL_WIDTH];
    let mut next_free = 0;
    for (column, month) in heatmap.month_starts() {
        if !window.contains(&column) {
            continue;
        }
        let at = WEEKDAY_GUTTER + (column - window.start) * CELL_WIDTH;
        if at < next_free {
            continue;
        }
        for (offset, ch) in month_abbrev(month).chars().enumerate() {
            if let Some(slot) = axis.get_mut(at + offset) {
                *slot = ch;
            }
        }
        next_free = at + 4;
    }
    axis.into_iter().collect::<String>().trim_end().to_owned()
}

fn heatmap_lines(
    heatmap: &Heatmap,
    cursor: Option<Date>,
    width: u16,
    palette: &Palette,
) -> Vec<Line<'static>> {
    if heatmap.is_empty() {
        return vec![Line::from(Span::styled("no plays in range", palette.dimmed()))];
    }

    let visible = usize::from(width).saturating_sub(WEEKDAY_GUTTER) / CELL_WIDTH;
    let cursor_column = cursor
        .and_then(|date| heatmap.cell(date))
        .map_or(0, |cell| cell.column);
    let window = heatmap_window(heatmap.columns(), visible, cursor_column);

    let mut lines = Vec::with_capacity(12);
    lines.push(Line::from(Span::styled(
        month_axis(heatmap, &window),
        palette.dimmed(),
    )));
    for (row, label) in WEEKDAY_LABELS.iter().enumerate() {
        let mut spans = vec![Span::styled(
            format!("{label:<width$}", width = WEEKDAY_GUTTER),
            palette.dimmed(),
        )];
        for column in window.clone() {
            spans.push(match heatmap.cell_at(column, row) {
                Some(cell) => {
                    let mut style = Style::default().fg(palette.levels[usize::from(cell.level)]);
                    if Some(cell.date) == cursor {
                        style = style.add_modifier(Modifier::REVERSED);
                    }
                    Span::styled("■ ", style)
                }
                None => Span::raw("  "),
            });
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::default());
    let mut legend = vec![Span::styled("less ", palette.dimmed())];
    legend.extend(
        palette
            .levels
            .iter()
            .map(|color| Span::styled("■ ", Style::default().fg(*color))),
    );
    legend.push(Span::styled("more", palette.dimmed()));
    lines.push(Line::from(legend));

    if let Some(cell) = cursor.and_then(|date| heatmap.cell(date)) {
        lines.push(Line::from(Span::styled(cell.label(), palette.accented())));
    }
    let (plays, active_days) = heatmap.totals();
    lines.push(Line::from(Span::styled(
        format!("{plays} plays on {active_days} of {} days", heatmap.len()),
        palette.dimmed(),
    )));
    lines
}

fn on_this_day_lines(view: &OnThisDayView, palette: &Palette) -> Vec<Line<'static>> {
    if let Some(message) = view.message() {
        return vec![Line::from(Span::styled(message, palette.dimmed()))];
    }

    let mut lines = view
        .page_entries()
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(
                    entry.track.clone(),
                    Style::default()
                        .fg(palette.text)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(entry.meta(), palette.dimmed()),
            ])
        })
        .collect::<Vec<_>>();

    if view.pagination_visible() {
        let nav = |label: &'static str, disabled: bool| {
            if disabled {
                Span::styled(label, palette.dimmed())
            } else {
                Span::styled(label, palette.accented())
            }
        };
        lines.push(Line::default());
        lines.push(Line::from(vec![
            nav("‹ prev", view.prev_disabled()),
            Span::raw("  "),
            Span::raw(view.page_label()),
            Span::raw("  "),
            nav("next ›", view.next_disabled()),
        ]));
    }
    lines
}

fn render_modal(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    kind: ModalKind,
    state: &AppState,
    view_data: &ViewData,
    palette: &Palette,
) {
    if state.aria_hidden(kind) {
        return;
    }
    let popup = match kind {
        ModalKind::Info => centered_rect(70, 90, area),
        _ => centered_rect(60, 60, area),
    };
    let body = match kind {
        ModalKind::Help => help_overlay_text().to_owned(),
        ModalKind::Info => info_overlay_text(
            &view_data.summary,
            &view_data.stats,
            &state.years,
            view_data.today,
        ),
        ModalKind::EveryYearArtists => every_year_text(&view_data.stats),
        ModalKind::DayDetail => view_data.day_detail.clone().unwrap_or_default(),
        ModalKind::Settings => String::new(),
    };

    let mut lines = body.lines().map(|line| Line::from(line.to_owned())).collect::<Vec<_>>();
    if !lines.is_empty() {
        lines.push(Line::default());
    }
    lines.extend(
        modal_control_lines(state)
            .into_iter()
            .map(|(text, focused)| {
                if focused {
                    Line::from(Span::styled(text, palette.accented()))
                } else {
                    Line::from(text)
                }
            }),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .style(palette.base())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.accented())
                    .title(kind.label()),
            ),
        popup,
    );
}

/// Focusable controls of the open modal, each paired with whether it holds focus.
fn modal_control_lines(state: &AppState) -> Vec<(String, bool)> {
    let Some(modal) = state.modal else {
        return Vec::new();
    };
    let check = |on: bool| if on { "x" } else { " " };
    modal
        .kind
        .focusables()
        .iter()
        .enumerate()
        .map(|(index, control)| {
            let focused = index == modal.focus;
            let marker = if focused { ">" } else { " " };
            let body = match control {
                ModalControl::ThemeToggle => {
                    format!("[{}] {}", check(state.theme == Theme::Dark), control.label())
                }
                ModalControl::ModeToggle => {
                    format!("[{}] {}", check(state.mode == Mode::Playtime), control.label())
                }
                ModalControl::ShowEveryYearArtists | ModalControl::Close => {
                    format!("[ {} ]", control.label())
                }
            };
            (format!("{marker} {body}"), focused)
        })
        .collect()
}

fn help_overlay_text() -> &'static str {
    "global\n  b / f      previous / next year\n  tab        next panel\n  1-5        jump to panel\n  m          toggle playcount / playtime\n  t          toggle theme\n  s          settings\n  i          listening stats\n  ctrl+q     quit\n\ntables\n  h / l      previous / next page\n  g / G      first / last page\n  /          search (enter keep, esc clear)\n\nheatmap\n  h / l      previous / next week\n  k / j      previous / next day\n  enter      day details\n  o          show on this day\n\non this day\n  h / l      previous / next day\n  [ / ]      previous / next page\n  .          today"
}

fn long_date(date: Date) -> String {
    date.format(&format_description!("[month repr:short] [day], [year]"))
        .unwrap_or_else(|_| format_date(date))
}

fn or_missing<T>(value: Option<T>, show: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| "N/A".to_owned(), show)
}

fn plays_peak<T>(peak: Option<Peak<T>>, key: impl FnOnce(T) -> String) -> String {
    or_missing(peak, |peak| format!("{} ({} plays)", key(peak.key), peak.plays))
}

fn day_span(span: Option<DateSpan>) -> String {
    or_missing(span, |span| {
        format!(
            "{} days ({} - {})",
            span.days(),
            long_date(span.start),
            long_date(span.end)
        )
    })
}

fn play_mark(mark: Option<&PlayMark>) -> String {
    or_missing(mark, |mark| {
        format!("{} ({} - {})", long_date(mark.date), mark.artist, mark.track)
    })
}

fn info_overlay_text(
    summary: &DatasetSummary,
    stats: &ListeningStats,
    years: &[YearScope],
    today: Option<Date>,
) -> String {
    let years = years
        .iter()
        .filter(|year| **year != YearScope::All)
        .map(|year| year.label())
        .collect::<Vec<_>>();
    let years = if years.is_empty() {
        "none".to_owned()
    } else {
        years.join(", ")
    };
    let days_since_first = today.map_or(0, |today| stats.days_since_first(today));
    let pct_days = today.map_or(0.0, |today| stats.pct_days_played(today));

    let rows = [
        ("overview", String::new()),
        ("days since first play", days_since_first.to_string()),
        (
            "days played",
            format!("{} ({pct_days:.2}%)", stats.days_played),
        ),
        ("first play", play_mark(stats.first_play.as_ref())),
        ("last play", play_mark(stats.last_play.as_ref())),
        ("plays counted", stats.counted_plays.to_string()),
        ("total listening time", ms_to_hms(stats.total_time_ms)),
        ("average per play", ms_to_hms(stats.avg_play_ms())),
        ("library", String::new()),
        ("artists", stats.artists.to_string()),
        (
            "one-hit wonders",
            format!(
                "{} ({:.2}%)",
                stats.one_hit_wonders,
                stats.pct_one_hit_wonders()
            ),
        ),
        ("every-year artists", stats.every_year_artists.len().to_string()),
        ("albums", stats.albums.to_string()),
        ("albums per artist", format!("{:.1}", stats.albums_per_artist())),
        ("tracks", stats.tracks.to_string()),
        ("popularity", String::new()),
        ("most popular year", plays_peak(stats.busiest_year, |year| year.to_string())),
        (
            "most popular month",
            plays_peak(stats.busiest_month, |(year, month)| format!("{month} {year}")),
        ),
        ("most popular day", plays_peak(stats.busiest_day, long_date)),
        (
            "most skipped track",
            or_missing(stats.most_skipped.as_ref(), |peak| {
                format!("{} ({} skips)", peak.key, peak.plays)
            }),
        ),
        ("patterns", String::new()),
        ("longest streak", day_span(stats.longest_streak)),
        ("longest hiatus", day_span(stats.longest_hiatus)),
        (
            "plays per active day",
            format!("{:.2}", stats.avg_plays_per_active_day()),
        ),
        (
            "most active weekday",
            plays_peak(stats.busiest_weekday, |weekday| weekday.to_string()),
        ),
        ("peak listening hour", plays_peak(stats.peak_hour, hour_label)),
        ("input", String::new()),
        (
            "entries",
            format!(
                "{} read, {} ignored, {} skips, {} offline",
                summary.entries, summary.ignored, summary.skips, summary.offline_plays
            ),
        ),
        ("years", years),
    ];

    rows.iter()
        .map(|(label, value)| {
            if value.is_empty() {
                (*label).to_owned()
            } else {
                format!("  {label:<23}{value}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn every_year_text(stats: &ListeningStats) -> String {
    if stats.every_year_artists.is_empty() {
        return "no artist was played in every year".to_owned();
    }
    let mut text = format!(
        "artists played every year ({})\n",
        stats.every_year_artists.len()
    );
    for artist in &stats.every_year_artists {
        text.push_str("\n  ");
        text.push_str(artist);
    }
    text
}

fn panel_hints(panel: Panel) -> &'static str {
    match panel {
        Panel::Artists | Panel::Tracks | Panel::Albums => "h/l page | / search",
        Panel::Heatmap => "hjkl move | enter day | o on this day",
        Panel::OnThisDay => "h/l day | [/] page | . today",
    }
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if let Some(input) = &view_data.search {
        return format!(
            "search {}: {}_ | enter keep | esc clear",
            input.table.entity.title().to_lowercase(),
            input.buffer
        );
    }
    let hints = if state.modal.is_some() {
        "esc close | tab focus | enter select"
    } else {
        panel_hints(state.panel)
    };
    let mode = state.mode.as_str().to_uppercase();
    match &state.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints} | b/f year | m mode | ? help"),
    }
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
