// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use shopdeck_app::{
    AppCommand, AppEvent, AppState, InventoryFilterMode, InventoryVariantRecord, OrderRecord,
    PaymentStatus, ReceiveOutcome, SelectionPhase, SortDirection, ViewCommand, ViewEvent,
    ViewKind, Views,
};
use std::cmp::Ordering;
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::{OffsetDateTime, UtcOffset};
use tracing::{debug, warn};

const HALF_PAGE_ROWS: isize = 10;
const FILTER_MARK_ACTIVE: &str = "▼";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);

const ORDER_COLUMNS: [&str; 6] = ["sel", "order", "created", "customer", "total $", "payment"];
const INVENTORY_COLUMNS: [&str; 7] = [
    "sel",
    "variant",
    "sku",
    "updated",
    "price $",
    "for sale",
    "inventory",
];

/// Data source behind the dashboard. Every call is one blocking fetch.
pub trait DashboardRuntime {
    fn load_orders(&mut self) -> Result<Vec<OrderRecord>>;
    fn load_inventory(&mut self) -> Result<Vec<InventoryVariantRecord>>;
    fn load_tracking(&mut self) -> Result<Vec<OrderRecord>>;
    fn inventory_mode(&self) -> InventoryFilterMode;
}

#[derive(Debug, Clone, PartialEq)]
enum TableCell {
    Text(String),
    OptionalInteger(Option<i64>),
    Money(Option<i64>),
    Timestamp(Option<OffsetDateTime>),
    Flag(bool),
    Payment(PaymentStatus),
    Selected(bool),
}

impl TableCell {
    fn display(&self) -> String {
        match self {
            Self::Text(value) => value.clone(),
            Self::OptionalInteger(Some(value)) => value.to_string(),
            Self::OptionalInteger(None) => String::new(),
            Self::Money(Some(cents)) => format_money(*cents),
            Self::Money(None) => String::new(),
            Self::Timestamp(Some(value)) => format_timestamp(*value),
            Self::Timestamp(None) => String::new(),
            Self::Flag(true) => "yes".to_owned(),
            Self::Flag(false) => "no".to_owned(),
            Self::Payment(status) => status.label().to_owned(),
            Self::Selected(true) => "[x]".to_owned(),
            Self::Selected(false) => "[ ]".to_owned(),
        }
    }

    fn is_null(&self) -> bool {
        matches!(
            self,
            Self::OptionalInteger(None) | Self::Money(None) | Self::Timestamp(None)
        )
    }

    fn cmp_value(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::OptionalInteger(left), Self::OptionalInteger(right)) => left.cmp(right),
            (Self::Money(left), Self::Money(right)) => left.cmp(right),
            (Self::Timestamp(left), Self::Timestamp(right)) => left.cmp(right),
            (Self::Flag(left), Self::Flag(right)) => left.cmp(right),
            (Self::Selected(left), Self::Selected(right)) => left.cmp(right),
            (Self::Payment(left), Self::Payment(right)) => left.label().cmp(right.label()),
            (Self::Text(left), Self::Text(right)) => {
                left.to_ascii_lowercase().cmp(&right.to_ascii_lowercase())
            }
            _ => self
                .display()
                .to_ascii_lowercase()
                .cmp(&other.display().to_ascii_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct TableRowProjection {
    id: String,
    cells: Vec<TableCell>,
    selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct TableProjection {
    title: &'static str,
    columns: Vec<&'static str>,
    rows: Vec<TableRowProjection>,
}

impl TableProjection {
    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SortSpec {
    column: usize,
    direction: SortDirection,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct TableUiState {
    view: Option<ViewKind>,
    selected_row: usize,
    selected_col: usize,
    sorts: Vec<SortSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    MoveHalfPageDown,
    MoveHalfPageUp,
    JumpFirstRow,
    JumpLastRow,
    CycleSort,
    ClearSort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableStatus {
    SortUnavailable,
    SortAsc(&'static str),
    SortDesc(&'static str),
    SortCleared,
}

impl TableStatus {
    fn message(self) -> String {
        match self {
            Self::SortUnavailable => "sort unavailable".to_owned(),
            Self::SortAsc(column) => format!("sort {column} asc"),
            Self::SortDesc(column) => format!("sort {column} desc"),
            Self::SortCleared => "sort cleared".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableEvent {
    CursorUpdated,
    Status(TableStatus),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionKey {
    ToggleRow,
    SelectAll,
    Clear,
    TriggerFilter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ViewData {
    views: Views,
    table_state: TableUiState,
    load_error: Option<String>,
    help_visible: bool,
    status_token: u64,
}

impl ViewData {
    fn new(inventory_mode: InventoryFilterMode) -> Self {
        Self {
            views: Views::new(inventory_mode),
            ..Self::default()
        }
    }
}

pub fn run_app<R: DashboardRuntime>(state: &mut AppState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::new(runtime.inventory_mode());
    let (internal_tx, internal_rx) = mpsc::channel();
    reload_active_view(state, runtime, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

/// Plain-text rendering of one view for headless output. Columns are tab
/// separated and the selection column is left out.
pub fn list_rows_text(views: &Views, kind: ViewKind) -> String {
    let projection = base_projection(views, kind);
    let mut lines = Vec::with_capacity(projection.row_count() + 1);
    lines.push(projection.columns[1..].join("\t"));
    for row in &projection.rows {
        lines.push(
            row.cells[1..]
                .iter()
                .map(TableCell::display)
                .collect::<Vec<_>>()
                .join("\t"),
        );
    }
    lines.join("\n")
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

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(state, view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if handle_table_key(state, view_data, internal_tx, key) {
        return false;
    }

    if let Some(selection_key) = selection_key_for(key) {
        handle_selection_key(state, view_data, internal_tx, selection_key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => true,
        (KeyCode::Char('f'), KeyModifiers::NONE) | (KeyCode::Tab, _) => {
            switch_view(state, runtime, view_data, internal_tx, AppCommand::NextView);
            false
        }
        (KeyCode::Char('b'), KeyModifiers::NONE) | (KeyCode::BackTab, _) => {
            switch_view(state, runtime, view_data, internal_tx, AppCommand::PrevView);
            false
        }
        (KeyCode::Char(digit @ '1'..='3'), KeyModifiers::NONE) => {
            let index = usize::from(digit as u8 - b'1');
            let command = AppCommand::ShowView(ViewKind::ALL[index]);
            switch_view(state, runtime, view_data, internal_tx, command);
            false
        }
        (KeyCode::Char('r'), KeyModifiers::NONE) => {
            reload_active_view(state, runtime, view_data, internal_tx);
            false
        }
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            emit_status(state, view_data, internal_tx, "help shown");
            false
        }
        _ => false,
    }
}

fn selection_key_for(key: KeyEvent) -> Option<SelectionKey> {
    match (key.code, key.modifiers) {
        (KeyCode::Char(' '), _) => Some(SelectionKey::ToggleRow),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(SelectionKey::SelectAll),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(SelectionKey::Clear),
        (KeyCode::Char('F'), _) => Some(SelectionKey::TriggerFilter),
        _ => None,
    }
}

fn handle_selection_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    selection_key: SelectionKey,
) {
    let kind = state.active_view;
    let command = match selection_key {
        SelectionKey::ToggleRow => {
            let Some(id) = cursor_row_id(state, view_data) else {
                emit_status(state, view_data, internal_tx, "no row to select");
                return;
            };
            ViewCommand::Toggle(id)
        }
        SelectionKey::SelectAll => ViewCommand::SelectAll,
        SelectionKey::Clear => ViewCommand::Clear,
        SelectionKey::TriggerFilter => ViewCommand::TriggerFilter,
    };

    let events = view_data.views.dispatch(kind, command);
    if selection_key == SelectionKey::TriggerFilter {
        clamp_table_cursor(state, view_data);
    }
    if let Some(message) = view_event_status(&events, selection_key) {
        emit_status(state, view_data, internal_tx, message);
    }
}

fn view_event_status(events: &[ViewEvent], selection_key: SelectionKey) -> Option<String> {
    for event in events {
        match event {
            ViewEvent::FilterLatched { shown, .. } => {
                return Some(format!("filter on: {shown} ready to sync"));
            }
            ViewEvent::FilterUnavailable(_) => {
                return Some("filter only on orders".to_owned());
            }
            ViewEvent::SelectionChanged(_, summary) => {
                if selection_key == SelectionKey::Clear {
                    return Some("selection cleared".to_owned());
                }
                return Some(format!("sel {}", summary.label()));
            }
        }
    }
    None
}

fn cursor_row_id(state: &AppState, view_data: &ViewData) -> Option<String> {
    let projection = active_projection(state, view_data);
    projection
        .rows
        .get(view_data.table_state.selected_row)
        .map(|row| row.id.clone())
}

fn switch_view<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: AppCommand,
) {
    let events = state.dispatch(command);
    if events
        .iter()
        .any(|event| matches!(event, AppEvent::ViewChanged(_)))
    {
        for kind in ViewKind::ALL {
            view_data.views.reset(kind);
        }
        view_data.table_state = TableUiState::default();
        reload_active_view(state, runtime, view_data, internal_tx);
    }
}

fn reload_active_view<R: DashboardRuntime>(
    state: &mut AppState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    let kind = state.active_view;
    if view_data.table_state.view != Some(kind) {
        view_data.table_state = TableUiState {
            view: Some(kind),
            ..TableUiState::default()
        };
    }

    match load_view(runtime, &mut view_data.views, kind) {
        Ok(outcome) => {
            view_data.load_error = None;
            clamp_table_cursor(state, view_data);
            let message = match outcome {
                ReceiveOutcome::Displayed(shown) => format!("loaded {shown} {}", kind.label()),
                ReceiveOutcome::Pinned => "refreshed; filtered list kept".to_owned(),
            };
            debug!(view = kind.label(), ?outcome, "view loaded");
            emit_status(state, view_data, internal_tx, message);
        }
        Err(error) => {
            let message = format!("load failed: {error:#}");
            warn!(view = kind.label(), error = %message, "view load failed");
            view_data.load_error = Some(message.clone());
            emit_status(state, view_data, internal_tx, message);
        }
    }
}

fn load_view<R: DashboardRuntime>(
    runtime: &mut R,
    views: &mut Views,
    kind: ViewKind,
) -> Result<ReceiveOutcome> {
    let outcome = match kind {
        ViewKind::Orders => views
            .orders
            .receive(runtime.load_orders().context("load orders")?),
        ViewKind::Inventory => views
            .inventory
            .receive(runtime.load_inventory().context("load inventory")?),
        ViewKind::Tracking => views
            .tracking
            .receive(runtime.load_tracking().context("load tracking")?),
    };
    Ok(outcome)
}

fn handle_table_key(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if view_data.load_error.is_some() {
        return false;
    }
    let Some(command) = table_command_for_key(key) else {
        return false;
    };

    let event = apply_table_command(state, view_data, command);
    if let TableEvent::Status(status) = event {
        emit_status(state, view_data, internal_tx, status.message());
    }
    true
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableCommand::MoveColumn(1)),
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TableCommand::MoveHalfPageDown)
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TableCommand::MoveHalfPageUp)
        }
        (KeyCode::Char('g'), _) => Some(TableCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(TableCommand::JumpLastRow),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableCommand::CycleSort),
        (KeyCode::Char('S'), _) => Some(TableCommand::ClearSort),
        _ => None,
    }
}

fn apply_table_command(
    state: &AppState,
    view_data: &mut ViewData,
    command: TableCommand,
) -> TableEvent {
    match command {
        TableCommand::MoveRow(delta) => {
            move_row(state, view_data, delta);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveColumn(delta) => {
            move_col(state, view_data, delta);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveHalfPageDown => {
            move_row(state, view_data, HALF_PAGE_ROWS);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveHalfPageUp => {
            move_row(state, view_data, -HALF_PAGE_ROWS);
            TableEvent::CursorUpdated
        }
        TableCommand::JumpFirstRow => {
            view_data.table_state.selected_row = 0;
            TableEvent::CursorUpdated
        }
        TableCommand::JumpLastRow => {
            let rows = view_data.views.row_count(state.active_view);
            view_data.table_state.selected_row = rows.saturating_sub(1);
            TableEvent::CursorUpdated
        }
        TableCommand::CycleSort => TableEvent::Status(cycle_sort(state, view_data)),
        TableCommand::ClearSort => {
            view_data.table_state.sorts.clear();
            clamp_table_cursor(state, view_data);
            TableEvent::Status(TableStatus::SortCleared)
        }
    }
}

fn move_row(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let row_count = view_data.views.row_count(state.active_view);
    if row_count == 0 {
        view_data.table_state.selected_row = 0;
        return;
    }

    let current = view_data.table_state.selected_row;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.table_state.selected_row = next.min(row_count.saturating_sub(1));
}

fn move_col(state: &AppState, view_data: &mut ViewData, delta: isize) {
    let column_count = columns_for(state.active_view).len();
    let current = view_data.table_state.selected_col;
    let next = if delta.is_negative() {
        current.saturating_sub(delta.unsigned_abs())
    } else {
        current.saturating_add(delta as usize)
    };
    view_data.table_state.selected_col = next.min(column_count.saturating_sub(1));
}

fn cycle_sort(state: &AppState, view_data: &mut ViewData) -> TableStatus {
    let columns = columns_for(state.active_view);
    let column = view_data.table_state.selected_col;
    let Some(label) = columns.get(column).copied() else {
        return TableStatus::SortUnavailable;
    };

    if let Some(index) = view_data
        .table_state
        .sorts
        .iter()
        .position(|sort| sort.column == column)
    {
        match view_data.table_state.sorts[index].direction {
            SortDirection::Asc => {
                view_data.table_state.sorts[index].direction = SortDirection::Desc;
            }
            SortDirection::Desc => {
                view_data.table_state.sorts.remove(index);
            }
        }
    } else {
        view_data.table_state.sorts.push(SortSpec {
            column,
            direction: SortDirection::Asc,
        });
    }

    clamp_table_cursor(state, view_data);
    match view_data
        .table_state
        .sorts
        .iter()
        .find(|sort| sort.column == column)
        .map(|sort| sort.direction)
    {
        Some(SortDirection::Asc) => TableStatus::SortAsc(label),
        Some(SortDirection::Desc) => TableStatus::SortDesc(label),
        None => TableStatus::SortCleared,
    }
}

fn clamp_table_cursor(state: &AppState, view_data: &mut ViewData) {
    let column_count = columns_for(state.active_view).len();
    view_data
        .table_state
        .sorts
        .retain(|sort| sort.column < column_count);
    view_data.table_state.selected_col = view_data
        .table_state
        .selected_col
        .min(column_count.saturating_sub(1));

    let row_count = view_data.views.row_count(state.active_view);
    view_data.table_state.selected_row = if row_count == 0 {
        0
    } else {
        view_data
            .table_state
            .selected_row
            .min(row_count.saturating_sub(1))
    };
}

fn columns_for(kind: ViewKind) -> &'static [&'static str] {
    match kind {
        ViewKind::Orders | ViewKind::Tracking => &ORDER_COLUMNS,
        ViewKind::Inventory => &INVENTORY_COLUMNS,
    }
}

fn active_projection(state: &AppState, view_data: &ViewData) -> TableProjection {
    projection_for_view(&view_data.views, state.active_view, &view_data.table_state)
}

fn projection_for_view(
    views: &Views,
    kind: ViewKind,
    table_state: &TableUiState,
) -> TableProjection {
    let mut projection = base_projection(views, kind);

    if !table_state.sorts.is_empty() {
        let column_count = projection.column_count();
        projection.rows.sort_by(|left, right| {
            for sort in &table_state.sorts {
                if sort.column >= column_count {
                    continue;
                }
                let left_value = left.cells.get(sort.column);
                let right_value = right.cells.get(sort.column);
                let left_null = left_value.is_none_or(TableCell::is_null);
                let right_null = right_value.is_none_or(TableCell::is_null);
                if left_null && right_null {
                    continue;
                }
                if left_null {
                    return Ordering::Greater;
                }
                if right_null {
                    return Ordering::Less;
                }
                let order = match (left_value, right_value) {
                    (Some(left), Some(right)) => match sort.direction {
                        SortDirection::Asc => left.cmp_value(right),
                        SortDirection::Desc => left.cmp_value(right).reverse(),
                    },
                    _ => Ordering::Equal,
                };
                if order != Ordering::Equal {
                    return order;
                }
            }
            Ordering::Equal
        });
    }

    projection
}

fn base_projection(views: &Views, kind: ViewKind) -> TableProjection {
    let rows = match kind {
        ViewKind::Orders => order_rows(views.orders.records().displayed(), |id| {
            views.is_selected(kind, id)
        }),
        ViewKind::Tracking => order_rows(views.tracking.records().displayed(), |id| {
            views.is_selected(kind, id)
        }),
        ViewKind::Inventory => views
            .inventory
            .records()
            .displayed()
            .iter()
            .map(|variant| {
                let selected = views.is_selected(kind, variant.id.as_str());
                TableRowProjection {
                    id: variant.id.to_string(),
                    cells: vec![
                        TableCell::Selected(selected),
                        TableCell::Text(variant.display_name.clone()),
                        TableCell::Text(variant.sku.clone()),
                        TableCell::Timestamp(variant.updated_at),
                        TableCell::Money(Some(variant.price_cents)),
                        TableCell::Flag(variant.available_for_sale),
                        TableCell::OptionalInteger(variant.inventory_quantity),
                    ],
                    selected,
                }
            })
            .collect(),
    };

    TableProjection {
        title: kind.label(),
        columns: columns_for(kind).to_vec(),
        rows,
    }
}

fn order_rows(
    orders: &[OrderRecord],
    is_selected: impl Fn(&str) -> bool,
) -> Vec<TableRowProjection> {
    orders
        .iter()
        .map(|order| {
            let selected = is_selected(order.id.as_str());
            TableRowProjection {
                id: order.id.to_string(),
                cells: vec![
                    TableCell::Selected(selected),
                    TableCell::Text(order.name.clone()),
                    TableCell::Timestamp(Some(order.created_at)),
                    TableCell::Text(order.customer_display()),
                    TableCell::Money(order.subtotal_cents),
                    TableCell::Payment(order.payment_status()),
                ],
                selected,
            }
        })
        .collect()
}

fn tab_title(kind: ViewKind, state: &AppState, views: &Views) -> String {
    if state.active_view == kind && kind == ViewKind::Orders && views.orders.latch().is_engaged() {
        format!(" {} {} ", kind.label(), FILTER_MARK_ACTIVE)
    } else {
        format!(" {} ", kind.label())
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &AppState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected = ViewKind::ALL
        .iter()
        .position(|kind| *kind == state.active_view)
        .unwrap_or(0);
    let tab_titles = ViewKind::ALL
        .iter()
        .map(|kind| tab_title(*kind, state, &view_data.views))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("shopdeck").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    if let Some(error) = &view_data.load_error {
        let body = Paragraph::new(format!("{error}\n\npress r to retry"))
            .style(Style::default().fg(Color::Red))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(state.active_view.label()),
            );
        frame.render_widget(body, layout[1]);
    } else {
        render_table(frame, layout[1], state, view_data);
    }

    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn help_overlay_text() -> &'static str {
    "global: q or ctrl+q quit | ? help\n\
views: f/tab next | b/shift+tab prev | 1-3 jump | r reload\n\
table: j/k rows | h/l columns | g/G first/last | ctrl+d/u half page | s/S sort\n\
selection: space toggle row | a select all | x clear\n\
orders: F show only ready-to-sync orders (stays on until the view is switched)"
}

fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, state: &AppState, view_data: &ViewData) {
    let projection = active_projection(state, view_data);
    let widths = vec![Constraint::Min(6); projection.column_count().max(1)];

    let header_cells = (0..projection.column_count()).map(|column_index| {
        let label = header_label_for_column(&projection, &view_data.table_state, column_index);
        Cell::from(label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells);

    let rows = projection.rows.iter().enumerate().map(|(row_index, row)| {
        let cursor_row = row_index == view_data.table_state.selected_row;
        let cells = row
            .cells
            .iter()
            .enumerate()
            .map(|(column_index, cell)| {
                let mut style = Style::default();
                if row.selected {
                    style = style.fg(Color::Green);
                }
                if cursor_row {
                    style = style.bg(Color::DarkGray);
                }
                if cursor_row && column_index == view_data.table_state.selected_col {
                    style = Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD);
                }
                Cell::from(cell.display()).style(style)
            })
            .collect::<Vec<_>>();
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(&projection, state, view_data))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn header_label_for_column(
    projection: &TableProjection,
    table_state: &TableUiState,
    column_index: usize,
) -> String {
    let mut label = projection.columns[column_index].to_owned();
    if let Some((position, sort)) = table_state
        .sorts
        .iter()
        .enumerate()
        .find(|(_, sort)| sort.column == column_index)
    {
        if table_state.sorts.len() == 1 {
            let suffix = match sort.direction {
                SortDirection::Asc => " ↑",
                SortDirection::Desc => " ↓",
            };
            label.push_str(suffix);
        } else {
            let marker = match sort.direction {
                SortDirection::Asc => " ▲",
                SortDirection::Desc => " ▼",
            };
            label.push_str(marker);
            label.push_str(&(position + 1).to_string());
        }
    }
    label
}

fn table_title(projection: &TableProjection, state: &AppState, view_data: &ViewData) -> String {
    let summary = view_data.views.selection_summary(state.active_view);
    let mut parts = vec![format!(
        "{} r:{} sel:{}",
        projection.title,
        projection.row_count(),
        summary.label(),
    )];

    if state.active_view == ViewKind::Orders && view_data.views.orders.latch().is_engaged() {
        parts.push("filter on".to_owned());
    }

    if !view_data.table_state.sorts.is_empty() {
        let labels = view_data
            .table_state
            .sorts
            .iter()
            .enumerate()
            .filter_map(|(index, sort)| {
                projection.columns.get(sort.column).map(|label| {
                    let direction = match sort.direction {
                        SortDirection::Asc => "asc",
                        SortDirection::Desc => "desc",
                    };
                    format!("{label}:{direction}#{}", index + 1)
                })
            })
            .collect::<Vec<_>>();
        if !labels.is_empty() {
            parts.push(format!("sort {}", labels.join(",")));
        }
    }

    parts.join(" | ")
}

fn status_text(state: &AppState, view_data: &ViewData) -> String {
    if view_data.help_visible {
        return String::new();
    }

    let mut hints = "j/k/h/l g/G | space/a/x sel | s/S sort | f/b views | r reload".to_owned();
    if state.active_view == ViewKind::Orders {
        hints.push_str(" | F filter");
    }
    hints.push_str(" | ? help | q");
    if view_data.views.selection_summary(state.active_view).phase == SelectionPhase::AllSelected {
        hints = format!("all selected | {hints}");
    }
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints,
    }
}

fn format_timestamp(value: OffsetDateTime) -> String {
    let utc = value.to_offset(UtcOffset::UTC);
    format!("{} {:02}:{:02}", utc.date(), utc.hour(), utc.minute())
}

fn format_money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let absolute = cents.unsigned_abs();
    format!("{sign}{}.{:02}", absolute / 100, absolute % 100)
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
