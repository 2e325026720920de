// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use escola_app::{
    AlertLevel, ChartKind, ChartSpec, DashboardStats, FormDraft, ModalKind, PageCommand,
    PageEvent, PageState, RequerimentoFormInput, RequerimentoId, SortDirection, TabKind,
    TableModel, Theme, format::format_date_time,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{
    BarChart, Block, Borders, Cell, Clear, Paragraph, Row as TableRow, Table as TableWidget, Tabs,
};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

const ALERT_TTL: Duration = Duration::from_secs(5);
const DEFAULT_EXPORT_NAME: &str = "export.csv";
const PRINT_VIEW_NAME: &str = "impressao.html";

/// Data and persistence the page needs, behind a trait so the UI never
/// touches the HTTP client or the database directly.
pub trait AppRuntime {
    fn load_dashboard_stats(&mut self) -> Result<DashboardStats>;
    fn load_chart(&mut self) -> Result<Option<ChartSpec>>;
    /// `None` for tabs without a roster (the dashboard).
    fn load_roster(&mut self, tab: TabKind) -> Result<Option<TableModel>>;
    fn save_form_draft(&mut self, form_id: &str, snapshot: &BTreeMap<String, String>)
    -> Result<()>;
    fn load_form_draft(&mut self, form_id: &str) -> Result<Option<BTreeMap<String, String>>>;
    fn load_theme(&mut self) -> Result<Theme>;
    fn save_theme(&mut self, theme: Theme) -> Result<()>;
    fn submit_requerimento(&mut self, input: &RequerimentoFormInput) -> Result<RequerimentoId>;
    fn export_dir(&mut self) -> Result<PathBuf>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Modal(ModalKind),
    Tooltip,
}

/// Capability surface for the widget layer. Page logic mounts, shows and
/// hides overlays through this trait and reacts to `take_hidden`; the
/// terminal implementation below and test doubles both satisfy it, so
/// nothing else depends on the rendering library's widget lifecycle.
pub trait Overlay {
    fn mount(&mut self, kind: OverlayKind);
    fn show(&mut self, kind: OverlayKind);
    fn hide(&mut self, kind: OverlayKind);
    /// Drains overlays that finished hiding since the last call. The page
    /// resets the forms inside a dismissed modal from here.
    fn take_hidden(&mut self) -> Vec<OverlayKind>;
}

#[derive(Debug, Default)]
pub struct TermOverlay {
    mounted: Vec<OverlayKind>,
    visible: Vec<OverlayKind>,
    hidden_queue: Vec<OverlayKind>,
}

impl TermOverlay {
    pub fn is_visible(&self, kind: OverlayKind) -> bool {
        self.visible.contains(&kind)
    }
}

impl Overlay for TermOverlay {
    fn mount(&mut self, kind: OverlayKind) {
        if !self.mounted.contains(&kind) {
            self.mounted.push(kind);
        }
    }

    fn show(&mut self, kind: OverlayKind) {
        self.mount(kind);
        if !self.visible.contains(&kind) {
            self.visible.push(kind);
        }
    }

    fn hide(&mut self, kind: OverlayKind) {
        let before = self.visible.len();
        self.visible.retain(|visible| *visible != kind);
        if self.visible.len() != before {
            self.hidden_queue.push(kind);
        }
    }

    fn take_hidden(&mut self) -> Vec<OverlayKind> {
        std::mem::take(&mut self.hidden_queue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Browse,
    Search,
    Form,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    DismissAlert { id: u64 },
}

struct ViewData {
    stats: DashboardStats,
    chart: Option<ChartSpec>,
    table: Option<TableModel>,
    search_query: String,
    selected_row: usize,
    selected_col: usize,
    mode: InputMode,
    form: Option<FormDraft>,
    form_field: usize,
    pending_submit: Option<RequerimentoFormInput>,
    overlay: TermOverlay,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            stats: DashboardStats::default(),
            chart: None,
            table: None,
            search_query: String::new(),
            selected_row: 0,
            selected_col: 0,
            mode: InputMode::Browse,
            form: None,
            form_field: 0,
            pending_submit: None,
            overlay: TermOverlay::default(),
        }
    }
}

pub fn run_app<R: AppRuntime>(state: &mut PageState, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    state.theme = runtime.load_theme().unwrap_or(Theme::Light);
    if let Ok(size) = terminal.size() {
        state.dispatch(PageCommand::Resize { width: size.width });
    }
    refresh_view_data(state, runtime, &mut view_data);

    let mut result = Ok(());
    loop {
        process_internal_events(state, &internal_rx);
        process_hidden_overlays(&mut view_data);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = event::poll(Duration::from_millis(120)).context("poll event")?;
        if has_event {
            match event::read().context("read event")? {
                Event::Key(key) => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Event::Resize(width, _) => {
                    state.dispatch(PageCommand::Resize { width });
                }
                _ => {}
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(state: &mut PageState, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::DismissAlert { id } => {
                state.dispatch(PageCommand::DismissAlert(id));
            }
        }
    }
}

fn process_hidden_overlays(view_data: &mut ViewData) {
    for kind in view_data.overlay.take_hidden() {
        if let (OverlayKind::Modal(ModalKind::Requerimento), Some(form)) =
            (kind, view_data.form.as_mut())
        {
            form.reset();
        }
    }
}

/// Pushes an alert and schedules its auto-dismiss. Timers are
/// fire-and-forget; nothing guarantees delivery at shutdown.
fn push_alert(
    state: &mut PageState,
    tx: &Sender<InternalEvent>,
    message: String,
    level: AlertLevel,
    permanent: bool,
) {
    let events = state.dispatch(PageCommand::PushAlert {
        message,
        level,
        permanent,
    });
    if permanent {
        return;
    }
    for event in events {
        if let PageEvent::AlertShown(id) = event {
            let sender = tx.clone();
            thread::spawn(move || {
                thread::sleep(ALERT_TTL);
                let _ = sender.send(InternalEvent::DismissAlert { id });
            });
        }
    }
}

fn refresh_view_data<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
) {
    // Failed stats refreshes keep the last-known-good counters on screen.
    match runtime.load_dashboard_stats() {
        Ok(stats) => view_data.stats = stats,
        Err(error) => log::error!("dashboard stats refresh failed: {error:#}"),
    }
    match runtime.load_chart() {
        Ok(chart) => view_data.chart = chart,
        Err(error) => log::error!("dashboard chart refresh failed: {error:#}"),
    }

    match runtime.load_roster(state.active_tab) {
        Ok(table) => {
            view_data.table = table;
            view_data.selected_row = 0;
            view_data.selected_col = 0;
            view_data.search_query.clear();
        }
        Err(error) => {
            view_data.table = None;
            state.dispatch(PageCommand::SetStatus(format!("falha ao carregar: {error}")));
        }
    }
}

fn handle_key_event<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if view_data.mode == InputMode::Search {
        handle_search_key(view_data, key);
        return false;
    }
    if state.modal == Some(ModalKind::Confirmacao) {
        handle_confirm_key(state, runtime, view_data, tx, key);
        return false;
    }
    if state.modal == Some(ModalKind::Requerimento) {
        handle_form_key(state, runtime, view_data, tx, key);
        return false;
    }
    if state.modal == Some(ModalKind::Ajuda) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
            close_modal(state, view_data);
        }
        return false;
    }

    handle_browse_key(state, runtime, view_data, tx, key)
}

fn handle_browse_key<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        (KeyCode::Tab, _) => {
            state.dispatch(PageCommand::NextTab);
            refresh_view_data(state, runtime, view_data);
        }
        (KeyCode::BackTab, _) => {
            state.dispatch(PageCommand::PrevTab);
            refresh_view_data(state, runtime, view_data);
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => move_row(view_data, 1),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => move_row(view_data, -1),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => move_col(view_data, -1),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => move_col(view_data, 1),
        (KeyCode::Char('s'), KeyModifiers::NONE) => sort_selected_column(state, view_data),
        (KeyCode::Char('/'), _) => {
            if view_data.table.is_some() {
                view_data.mode = InputMode::Search;
                state.dispatch(PageCommand::SetStatus("busca: digite para filtrar".to_owned()));
            }
        }
        (KeyCode::Char('e'), KeyModifiers::NONE) => {
            export_active_table(state, runtime, view_data, tx);
        }
        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            write_print_view(state, runtime, view_data, tx);
        }
        (KeyCode::Char('p'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            write_print_view(state, runtime, view_data, tx);
        }
        (KeyCode::Char('t'), KeyModifiers::NONE) => {
            state.dispatch(PageCommand::ToggleTheme);
            if let Err(error) = runtime.save_theme(state.theme) {
                log::error!("persist theme failed: {error:#}");
            }
            state.dispatch(PageCommand::SetStatus(format!(
                "tema {}",
                match state.theme {
                    Theme::Light => "claro",
                    Theme::Dark => "escuro",
                }
            )));
        }
        (KeyCode::Char('i'), KeyModifiers::NONE) => {
            if view_data.overlay.is_visible(OverlayKind::Tooltip) {
                view_data.overlay.hide(OverlayKind::Tooltip);
            } else {
                view_data.overlay.show(OverlayKind::Tooltip);
            }
        }
        (KeyCode::Char('?'), _) => {
            state.dispatch(PageCommand::OpenModal(ModalKind::Ajuda));
            view_data.overlay.show(OverlayKind::Modal(ModalKind::Ajuda));
        }
        (KeyCode::Char('n'), KeyModifiers::NONE) => open_requerimento_form(state, runtime, view_data),
        (KeyCode::Esc, _) => {
            if view_data.overlay.is_visible(OverlayKind::Tooltip) {
                view_data.overlay.hide(OverlayKind::Tooltip);
            }
            state.dispatch(PageCommand::ClearStatus);
        }
        _ => {}
    }
    false
}

fn handle_search_key(view_data: &mut ViewData, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            view_data.mode = InputMode::Browse;
        }
        KeyCode::Backspace => {
            view_data.search_query.pop();
            apply_filter(view_data);
        }
        KeyCode::Char(ch) => {
            view_data.search_query.push(ch);
            apply_filter(view_data);
        }
        _ => {}
    }
}

fn apply_filter(view_data: &mut ViewData) {
    let query = view_data.search_query.clone();
    if let Some(table) = view_data.table.as_mut() {
        table.filter(&query);
        view_data.selected_row = 0;
    }
}

fn handle_form_key<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => close_modal(state, view_data),
        (KeyCode::Up, _) => {
            view_data.form_field = view_data.form_field.saturating_sub(1);
        }
        (KeyCode::Down, _) | (KeyCode::Tab, _) => {
            let field_count = view_data.form.as_ref().map(|form| form.fields.len());
            if let Some(count) = field_count
                && count > 0
            {
                view_data.form_field = (view_data.form_field + 1).min(count - 1);
            }
        }
        (KeyCode::Char('s'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            save_form_draft(state, runtime, view_data);
        }
        (KeyCode::Enter, _) => {
            let Some(form) = view_data.form.as_ref() else {
                return;
            };
            match RequerimentoFormInput::from_draft(form).and_then(|input| {
                input.validate()?;
                Ok(input)
            }) {
                Ok(input) => {
                    view_data.pending_submit = Some(input);
                    state.dispatch(PageCommand::OpenModal(ModalKind::Confirmacao));
                    view_data
                        .overlay
                        .show(OverlayKind::Modal(ModalKind::Confirmacao));
                }
                Err(error) => {
                    push_alert(state, tx, error.to_string(), AlertLevel::Warning, false);
                }
            }
        }
        (KeyCode::Backspace, _) => {
            edit_current_field(runtime, view_data, |value| {
                value.pop();
            });
        }
        (KeyCode::Char(ch), modifiers)
            if modifiers.is_empty() || modifiers == KeyModifiers::SHIFT =>
        {
            edit_current_field(runtime, view_data, |value| value.push(ch));
        }
        _ => {}
    }
}

/// Applies one edit to the focused field, then snapshots the whole form.
/// The draft is written on every change, so a crash never loses more
/// than the current keystroke.
fn edit_current_field<R: AppRuntime>(
    runtime: &mut R,
    view_data: &mut ViewData,
    edit: impl FnOnce(&mut String),
) {
    let field_index = view_data.form_field;
    let Some(form) = view_data.form.as_mut() else {
        return;
    };
    let Some(field) = form.fields.get_mut(field_index) else {
        return;
    };
    edit(&mut field.value);

    let snapshot = form.snapshot();
    let form_id = form.id.clone();
    if let Err(error) = runtime.save_form_draft(&form_id, &snapshot) {
        log::warn!("auto-save of form {form_id} failed: {error:#}");
    }
}

fn save_form_draft<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
) {
    let Some(form) = view_data.form.as_ref() else {
        return;
    };
    match runtime.save_form_draft(&form.id, &form.snapshot()) {
        Ok(()) => {
            state.dispatch(PageCommand::SetStatus("rascunho salvo".to_owned()));
        }
        Err(error) => {
            state.dispatch(PageCommand::SetStatus(format!("falha ao salvar: {error}")));
        }
    }
}

fn handle_confirm_key<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Enter => {
            state.dispatch(PageCommand::CloseModal);
            view_data
                .overlay
                .hide(OverlayKind::Modal(ModalKind::Confirmacao));

            let Some(input) = view_data.pending_submit.take() else {
                return;
            };
            match runtime.submit_requerimento(&input) {
                Ok(id) => {
                    push_alert(
                        state,
                        tx,
                        format!("requerimento #{} enviado", id.get()),
                        AlertLevel::Success,
                        false,
                    );
                    // The draft served its purpose; hide the form modal too.
                    view_data
                        .overlay
                        .hide(OverlayKind::Modal(ModalKind::Requerimento));
                    view_data.mode = InputMode::Browse;
                }
                Err(error) => {
                    push_alert(state, tx, format!("envio falhou: {error}"), AlertLevel::Error, false);
                    // Back to the form, draft intact.
                    state.dispatch(PageCommand::OpenModal(ModalKind::Requerimento));
                }
            }
        }
        KeyCode::Esc => {
            view_data.pending_submit = None;
            state.dispatch(PageCommand::CloseModal);
            view_data
                .overlay
                .hide(OverlayKind::Modal(ModalKind::Confirmacao));
            state.dispatch(PageCommand::OpenModal(ModalKind::Requerimento));
        }
        _ => {}
    }
}

fn open_requerimento_form<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
) {
    let mut draft = FormDraft::requerimento();
    match runtime.load_form_draft(&draft.id) {
        Ok(Some(snapshot)) => draft.restore(&snapshot),
        Ok(None) => {}
        Err(error) => log::warn!("load draft for form {} failed: {error:#}", draft.id),
    }
    view_data.form = Some(draft);
    view_data.form_field = 0;
    view_data.mode = InputMode::Form;
    state.dispatch(PageCommand::OpenModal(ModalKind::Requerimento));
    view_data
        .overlay
        .show(OverlayKind::Modal(ModalKind::Requerimento));
}

fn close_modal(state: &mut PageState, view_data: &mut ViewData) {
    if let Some(kind) = state.modal {
        state.dispatch(PageCommand::CloseModal);
        view_data.overlay.hide(OverlayKind::Modal(kind));
    }
    view_data.mode = InputMode::Browse;
    process_hidden_overlays(view_data);
}

fn move_row(view_data: &mut ViewData, delta: isize) {
    let Some(table) = view_data.table.as_ref() else {
        return;
    };
    let count = table.visible_count();
    if count == 0 {
        view_data.selected_row = 0;
        return;
    }
    let current = view_data.selected_row as isize;
    view_data.selected_row = (current + delta).clamp(0, count as isize - 1) as usize;
}

fn move_col(view_data: &mut ViewData, delta: isize) {
    let Some(table) = view_data.table.as_ref() else {
        return;
    };
    let count = table.columns().len();
    if count == 0 {
        return;
    }
    let current = view_data.selected_col as isize;
    view_data.selected_col = (current + delta).clamp(0, count as isize - 1) as usize;
}

fn sort_selected_column(state: &mut PageState, view_data: &mut ViewData) {
    let Some(table) = view_data.table.as_mut() else {
        return;
    };
    let Some(column) = table.columns().get(view_data.selected_col).cloned() else {
        return;
    };
    table.sort(&column.key);

    match table.sort_state().direction {
        Some(direction) if table.sort_state().column.as_deref() == Some(column.key.as_str()) => {
            let label = match direction {
                SortDirection::Asc => "asc",
                SortDirection::Desc => "desc",
            };
            state.dispatch(PageCommand::SetStatus(format!(
                "ordenado por {} {label}",
                column.label
            )));
        }
        _ => {
            state.dispatch(PageCommand::SetStatus("coluna não ordenável".to_owned()));
        }
    }
}

fn export_active_table<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    // No table on this tab: silently do nothing.
    let Some(table) = view_data.table.as_ref() else {
        return;
    };
    let Ok(dir) = runtime.export_dir() else {
        log::error!("export dir unavailable");
        return;
    };
    match export_csv(table, &dir, None) {
        Ok(path) => {
            push_alert(
                state,
                tx,
                format!("exportado para {}", path.display()),
                AlertLevel::Success,
                false,
            );
        }
        Err(error) => {
            push_alert(state, tx, format!("exportação falhou: {error}"), AlertLevel::Error, false);
        }
    }
}

/// Writes the table's CSV to `dir`, under `filename` or the default
/// `export.csv`.
pub fn export_csv(table: &TableModel, dir: &Path, filename: Option<&str>) -> Result<PathBuf> {
    let path = dir.join(filename.unwrap_or(DEFAULT_EXPORT_NAME));
    fs::write(&path, table.to_csv())
        .with_context(|| format!("write CSV export {}", path.display()))?;
    Ok(path)
}

fn write_print_view<R: AppRuntime>(
    state: &mut PageState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
) {
    let Some(table) = view_data.table.as_ref() else {
        return;
    };
    let Ok(dir) = runtime.export_dir() else {
        log::error!("export dir unavailable");
        return;
    };

    let html = print_view_html(
        state.active_tab.label(),
        table,
        state.theme,
        OffsetDateTime::now_utc(),
    );
    let path = dir.join(PRINT_VIEW_NAME);
    match fs::write(&path, html).with_context(|| format!("write print view {}", path.display())) {
        Ok(()) => {
            push_alert(
                state,
                tx,
                format!("impressão em {}", path.display()),
                AlertLevel::Info,
                false,
            );
        }
        Err(error) => {
            push_alert(state, tx, format!("impressão falhou: {error}"), AlertLevel::Error, false);
        }
    }
}

/// A standalone, styled copy of the table, the print-window document the
/// web page opened. Hidden rows are carried along with their hidden mark,
/// exactly like the element markup they came from.
pub fn print_view_html(
    title: &str,
    table: &TableModel,
    theme: Theme,
    generated_at: OffsetDateTime,
) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    out.push_str(&format!("<title>{title}</title>\n"));
    out.push_str("<style>\n");
    out.push_str("body { font-family: sans-serif; margin: 2em; }\n");
    out.push_str("body.dark-theme { background: #1e1e1e; color: #eee; }\n");
    out.push_str("table { border-collapse: collapse; width: 100%; }\n");
    out.push_str("th, td { border: 1px solid #999; padding: 4px 8px; text-align: left; }\n");
    out.push_str("@media print { .no-print { display: none !important; } }\n");
    out.push_str("</style>\n</head>\n");
    match theme {
        Theme::Dark => out.push_str("<body class=\"dark-theme\">\n"),
        Theme::Light => out.push_str("<body>\n"),
    }
    out.push_str(&format!("<h1>{title}</h1>\n"));
    out.push_str(&format!(
        "<p class=\"no-print\">gerado em {}</p>\n",
        format_date_time(generated_at)
    ));
    out.push_str("<table>\n<thead>\n<tr>");
    for column in table.columns() {
        out.push_str(&format!("<th>{}</th>", column.label));
    }
    out.push_str("</tr>\n</thead>\n<tbody>\n");
    for row in table.rows() {
        if row.is_hidden() {
            out.push_str("<tr style=\"display:none\">");
        } else {
            out.push_str("<tr>");
        }
        for cell in row.cells() {
            out.push_str(&format!("<td>{cell}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    out
}

fn theme_style(theme: Theme) -> Style {
    match theme {
        Theme::Light => Style::default().fg(Color::Black).bg(Color::White),
        Theme::Dark => Style::default().fg(Color::Gray).bg(Color::Black),
    }
}

fn accent_style(theme: Theme) -> Style {
    match theme {
        Theme::Light => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        Theme::Dark => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &PageState, view_data: &ViewData) {
    let alert_height = if state.alerts.is_empty() {
        0
    } else {
        state.alerts.len() as u16 + 2
    };
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(alert_height),
            Constraint::Length(2),
        ])
        .split(frame.area());

    frame.render_widget(
        Block::default().style(theme_style(state.theme)),
        frame.area(),
    );

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let titles = TabKind::ALL
        .iter()
        .map(|tab| format!(" {} ", tab.label()))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(titles)
        .block(Block::default().title("escola").borders(Borders::ALL))
        .style(theme_style(state.theme))
        .highlight_style(accent_style(state.theme))
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let body = if state.sidebar_collapsed {
        layout[1]
    } else {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(1)])
            .split(layout[1]);
        render_sidebar(frame, split[0], state);
        split[1]
    };

    if state.active_tab == TabKind::Dashboard {
        render_dashboard(frame, body, state, view_data);
    } else {
        render_roster(frame, body, state, view_data);
    }

    if alert_height > 0 {
        render_alerts(frame, layout[2], state);
    }

    let status = state.status_line.clone().unwrap_or_default();
    let status_widget = Paragraph::new(status)
        .style(accent_style(state.theme))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[3]);

    render_overlays(frame, state, view_data);
}

fn render_sidebar(frame: &mut ratatui::Frame<'_>, area: Rect, state: &PageState) {
    let lines = vec![
        Line::from("tab/⇧tab  abas"),
        Line::from("j/k h/l   navegar"),
        Line::from("s         ordenar"),
        Line::from("/         buscar"),
        Line::from("e         exportar csv"),
        Line::from("p         imprimir"),
        Line::from("n         requerimento"),
        Line::from("t         tema"),
        Line::from("?         ajuda"),
        Line::from("q         sair"),
    ];
    let sidebar = Paragraph::new(lines)
        .style(theme_style(state.theme))
        .block(Block::default().title("atalhos").borders(Borders::ALL));
    frame.render_widget(sidebar, area);
}

fn render_dashboard(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &PageState,
    view_data: &ViewData,
) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(1)])
        .split(area);

    let stats = view_data.stats;
    let lines = vec![
        Line::from(format!("alunos       {}", stats.students)),
        Line::from(format!("professores  {}", stats.teachers)),
        Line::from(format!("turmas       {}", stats.classes)),
        Line::from(format!("disciplinas  {}", stats.subjects)),
    ];
    let counters = Paragraph::new(lines)
        .style(theme_style(state.theme))
        .block(Block::default().title("painel").borders(Borders::ALL));
    frame.render_widget(counters, split[0]);

    if let Some(chart) = &view_data.chart
        && chart.kind == ChartKind::Bar
    {
        let data = chart
            .labels
            .iter()
            .zip(&chart.values)
            .map(|(label, value)| (label.as_str(), value.max(0.0) as u64))
            .collect::<Vec<(&str, u64)>>();
        let bars = BarChart::default()
            .block(Block::default().title("totais").borders(Borders::ALL))
            .bar_width(12)
            .bar_gap(2)
            .bar_style(accent_style(state.theme))
            .data(&data);
        frame.render_widget(bars, split[1]);
    }
}

fn render_roster(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &PageState,
    view_data: &ViewData,
) {
    let split = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    let search_label = if view_data.mode == InputMode::Search {
        format!("busca: {}▏", view_data.search_query)
    } else if view_data.search_query.is_empty() {
        "busca: (pressione /)".to_owned()
    } else {
        format!("busca: {}", view_data.search_query)
    };
    let search = Paragraph::new(search_label)
        .style(theme_style(state.theme))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(search, split[0]);

    let Some(table) = &view_data.table else {
        let empty = Paragraph::new("sem dados")
            .style(theme_style(state.theme))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, split[1]);
        return;
    };

    let header_cells = table
        .columns()
        .iter()
        .enumerate()
        .map(|(index, column)| {
            let mut label = column.label.clone();
            if table.sort_state().column.as_deref() == Some(column.key.as_str()) {
                match table.sort_state().direction {
                    Some(SortDirection::Asc) => label.push_str(" ↑"),
                    Some(SortDirection::Desc) => label.push_str(" ↓"),
                    None => {}
                }
            }
            let style = if index == view_data.selected_col {
                accent_style(state.theme)
            } else {
                theme_style(state.theme).add_modifier(Modifier::BOLD)
            };
            Cell::from(label).style(style)
        })
        .collect::<Vec<Cell>>();

    let rows = table
        .visible_rows()
        .enumerate()
        .map(|(index, row)| {
            let style = if index == view_data.selected_row {
                accent_style(state.theme)
            } else {
                theme_style(state.theme)
            };
            TableRow::new(
                row.cells()
                    .iter()
                    .map(|cell| Cell::from(cell.clone()))
                    .collect::<Vec<Cell>>(),
            )
            .style(style)
        })
        .collect::<Vec<TableRow>>();

    let column_count = table.columns().len().max(1) as u32;
    let widths = table
        .columns()
        .iter()
        .map(|_| Constraint::Ratio(1, column_count))
        .collect::<Vec<Constraint>>();

    let title = format!(
        "{} ({}/{})",
        state.active_tab.label(),
        table.visible_count(),
        table.row_count()
    );
    let widget = TableWidget::new(rows, widths)
        .header(TableRow::new(header_cells))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(widget, split[1]);
}

fn render_alerts(frame: &mut ratatui::Frame<'_>, area: Rect, state: &PageState) {
    let lines = state
        .alerts
        .iter()
        .map(|alert| {
            let style = match alert.level {
                AlertLevel::Info => Style::default().fg(Color::Blue),
                AlertLevel::Success => Style::default().fg(Color::Green),
                AlertLevel::Warning => Style::default().fg(Color::Yellow),
                AlertLevel::Error => Style::default().fg(Color::Red),
            };
            Line::styled(alert.message.clone(), style)
        })
        .collect::<Vec<Line>>();
    let widget = Paragraph::new(lines)
        .block(Block::default().title("avisos").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn render_overlays(frame: &mut ratatui::Frame<'_>, state: &PageState, view_data: &ViewData) {
    if view_data.overlay.is_visible(OverlayKind::Tooltip) {
        let area = centered_rect(frame.area(), 44, 4);
        frame.render_widget(Clear, area);
        let tip = Paragraph::new(format!(
            "aba {}: use 's' para ordenar a coluna selecionada",
            state.active_tab.label()
        ))
        .style(theme_style(state.theme))
        .block(Block::default().title("dica").borders(Borders::ALL));
        frame.render_widget(tip, area);
    }

    match state.modal {
        Some(ModalKind::Ajuda) => {
            let area = centered_rect(frame.area(), 50, 10);
            frame.render_widget(Clear, area);
            let help = Paragraph::new(vec![
                Line::from("s ordena, / busca, e exporta, p imprime"),
                Line::from("n abre um requerimento, ctrl+s salva o rascunho"),
                Line::from("t alterna o tema claro/escuro"),
                Line::from("esc fecha esta janela"),
            ])
            .style(theme_style(state.theme))
            .block(Block::default().title("ajuda").borders(Borders::ALL));
            frame.render_widget(help, area);
        }
        Some(ModalKind::Confirmacao) => {
            let area = centered_rect(frame.area(), 40, 5);
            frame.render_widget(Clear, area);
            let confirm = Paragraph::new("enviar requerimento? enter confirma, esc volta")
                .style(theme_style(state.theme))
                .block(Block::default().title("confirmação").borders(Borders::ALL));
            frame.render_widget(confirm, area);
        }
        Some(ModalKind::Requerimento) => {
            if let Some(form) = &view_data.form {
                let area = centered_rect(frame.area(), 56, form.fields.len() as u16 + 4);
                frame.render_widget(Clear, area);
                let lines = form
                    .fields
                    .iter()
                    .enumerate()
                    .map(|(index, field)| {
                        let marker = if index == view_data.form_field { "> " } else { "  " };
                        Line::from(format!("{marker}{}: {}", field.name, field.value))
                    })
                    .collect::<Vec<Line>>();
                let widget = Paragraph::new(lines)
                    .style(theme_style(state.theme))
                    .block(
                        Block::default()
                            .title("requerimento (enter envia, esc fecha)")
                            .borders(Borders::ALL),
                    );
                frame.render_widget(widget, area);
            }
        }
        None => {}
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AppRuntime, InputMode, InternalEvent, Overlay, OverlayKind, TermOverlay, ViewData,
        close_modal, export_csv, handle_browse_key, handle_form_key, handle_key_event,
        handle_search_key, open_requerimento_form, print_view_html, process_internal_events,
        process_hidden_overlays, push_alert, sort_selected_column,
    };
    use anyhow::{Result, bail};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use escola_app::{
        AlertLevel, ChartSpec, Column, DashboardStats, ModalKind, PageCommand, PageState,
        RequerimentoFormInput, RequerimentoId, TabKind, TableModel, Theme,
    };
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use time::OffsetDateTime;

    #[derive(Default)]
    struct FakeRuntime {
        drafts: BTreeMap<String, BTreeMap<String, String>>,
        theme: Option<Theme>,
        submitted: Vec<RequerimentoFormInput>,
        fail_stats: bool,
        export_dir: Option<PathBuf>,
    }

    impl AppRuntime for FakeRuntime {
        fn load_dashboard_stats(&mut self) -> Result<DashboardStats> {
            if self.fail_stats {
                bail!("rede fora do ar");
            }
            Ok(DashboardStats {
                students: 10,
                teachers: 2,
                classes: 3,
                subjects: 4,
            })
        }

        fn load_chart(&mut self) -> Result<Option<ChartSpec>> {
            Ok(None)
        }

        fn load_roster(&mut self, tab: TabKind) -> Result<Option<TableModel>> {
            if tab == TabKind::Dashboard {
                return Ok(None);
            }
            let mut table = TableModel::new(vec![
                Column::sortable("nome", "Nome"),
                Column::sortable("turma", "Turma"),
            ]);
            table.push_row(vec!["Érica".to_owned(), "3B".to_owned()]);
            table.push_row(vec!["Álvaro".to_owned(), "1A".to_owned()]);
            Ok(Some(table))
        }

        fn save_form_draft(
            &mut self,
            form_id: &str,
            snapshot: &BTreeMap<String, String>,
        ) -> Result<()> {
            self.drafts.insert(form_id.to_owned(), snapshot.clone());
            Ok(())
        }

        fn load_form_draft(&mut self, form_id: &str) -> Result<Option<BTreeMap<String, String>>> {
            Ok(self.drafts.get(form_id).cloned())
        }

        fn load_theme(&mut self) -> Result<Theme> {
            Ok(self.theme.unwrap_or(Theme::Light))
        }

        fn save_theme(&mut self, theme: Theme) -> Result<()> {
            self.theme = Some(theme);
            Ok(())
        }

        fn submit_requerimento(&mut self, input: &RequerimentoFormInput) -> Result<RequerimentoId> {
            self.submitted.push(input.clone());
            Ok(RequerimentoId::new(42))
        }

        fn export_dir(&mut self) -> Result<PathBuf> {
            match &self.export_dir {
                Some(dir) => Ok(dir.clone()),
                None => bail!("sem diretório de exportação"),
            }
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn roster_view(runtime: &mut FakeRuntime) -> ViewData {
        let mut view = ViewData::default();
        view.table = runtime.load_roster(TabKind::Alunos).expect("roster loads");
        view
    }

    #[test]
    fn overlay_queues_hidden_surfaces_once() {
        let mut overlay = TermOverlay::default();
        overlay.show(OverlayKind::Tooltip);
        overlay.hide(OverlayKind::Tooltip);
        // Hiding something already hidden queues nothing.
        overlay.hide(OverlayKind::Tooltip);
        assert_eq!(overlay.take_hidden(), vec![OverlayKind::Tooltip]);
        assert!(overlay.take_hidden().is_empty());
    }

    #[test]
    fn dismissed_requerimento_modal_resets_the_form() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();

        open_requerimento_form(&mut state, &mut runtime, &mut view);
        handle_form_key(
            &mut state,
            &mut runtime,
            &mut view,
            &mpsc::channel().0,
            key(KeyCode::Char('x')),
        );
        assert_eq!(
            view.form.as_ref().and_then(|f| f.field("tipo")).map(|f| f.value.as_str()),
            Some("declaracaox"),
        );

        close_modal(&mut state, &mut view);
        assert_eq!(
            view.form.as_ref().and_then(|f| f.field("tipo")).map(|f| f.value.as_str()),
            Some("declaracao"),
        );
    }

    #[test]
    fn form_edits_auto_save_a_snapshot() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        open_requerimento_form(&mut state, &mut runtime, &mut view);
        // Move to descricao and type.
        handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Down));
        for ch in "giz".chars() {
            handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Char(ch)));
        }

        let saved = runtime.drafts.get("requerimento").expect("draft saved");
        assert_eq!(saved.get("descricao").map(String::as_str), Some("giz"));
    }

    #[test]
    fn reopened_form_restores_the_saved_draft() {
        let mut runtime = FakeRuntime::default();
        runtime.drafts.insert(
            "requerimento".to_owned(),
            [
                ("tipo".to_owned(), "material".to_owned()),
                ("descricao".to_owned(), "giz".to_owned()),
            ]
            .into_iter()
            .collect(),
        );
        let mut state = PageState::default();
        let mut view = ViewData::default();

        open_requerimento_form(&mut state, &mut runtime, &mut view);
        let form = view.form.as_ref().expect("form open");
        assert_eq!(form.field("tipo").map(|f| f.value.as_str()), Some("material"));
        assert_eq!(form.field("descricao").map(|f| f.value.as_str()), Some("giz"));
    }

    #[test]
    fn invalid_form_submit_raises_a_warning_alert() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        open_requerimento_form(&mut state, &mut runtime, &mut view);
        handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Enter));

        assert!(runtime.submitted.is_empty());
        assert_eq!(state.alerts.len(), 1);
        assert_eq!(state.alerts[0].level, AlertLevel::Warning);
        assert_eq!(state.modal, Some(ModalKind::Requerimento));
    }

    #[test]
    fn confirmed_submit_sends_the_requerimento() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        open_requerimento_form(&mut state, &mut runtime, &mut view);
        handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Down));
        for ch in "Giz para a sala 12".chars() {
            handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Char(ch)));
        }
        handle_form_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Enter));
        assert_eq!(state.modal, Some(ModalKind::Confirmacao));

        handle_key_event(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Enter));
        assert_eq!(runtime.submitted.len(), 1);
        assert_eq!(state.modal, None);
        assert!(state.alerts.iter().any(|a| a.level == AlertLevel::Success));
    }

    #[test]
    fn search_mode_filters_and_empty_query_restores() {
        let mut runtime = FakeRuntime::default();
        let mut view = roster_view(&mut runtime);
        view.mode = InputMode::Search;

        for ch in "érica".chars() {
            handle_search_key(&mut view, key(KeyCode::Char(ch)));
        }
        assert_eq!(view.table.as_ref().map(|t| t.visible_count()), Some(1));

        for _ in 0.."érica".chars().count() {
            handle_search_key(&mut view, key(KeyCode::Backspace));
        }
        assert_eq!(view.table.as_ref().map(|t| t.visible_count()), Some(2));

        handle_search_key(&mut view, key(KeyCode::Esc));
        assert_eq!(view.mode, InputMode::Browse);
    }

    #[test]
    fn sort_key_sorts_the_selected_column() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = roster_view(&mut runtime);

        sort_selected_column(&mut state, &mut view);
        let first = view
            .table
            .as_ref()
            .and_then(|t| t.rows().first())
            .map(|row| row.cells()[0].clone());
        assert_eq!(first.as_deref(), Some("Álvaro"));
        assert!(state.status_line.as_deref().unwrap_or("").contains("asc"));
    }

    #[test]
    fn theme_key_toggles_and_persists() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        handle_browse_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Char('t')));
        assert_eq!(state.theme, Theme::Dark);
        assert_eq!(runtime.theme, Some(Theme::Dark));
    }

    #[test]
    fn export_without_a_table_is_a_silent_no_op() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();
        let (tx, _rx) = mpsc::channel();

        handle_browse_key(&mut state, &mut runtime, &mut view, &tx, key(KeyCode::Char('e')));
        assert!(state.alerts.is_empty());
    }

    #[test]
    fn export_writes_default_file_name() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut table = TableModel::new(vec![Column::plain("a", "A"), Column::plain("b", "B")]);
        table.push_row(vec!["1".to_owned(), "2".to_owned()]);

        let path = export_csv(&table, temp.path(), None)?;
        assert!(path.ends_with("export.csv"));
        assert_eq!(std::fs::read_to_string(path)?, "\"A\",\"B\"\n\"1\",\"2\"");
        Ok(())
    }

    #[test]
    fn print_view_keeps_hidden_rows_marked() {
        let mut table = TableModel::new(vec![Column::sortable("nome", "Nome")]);
        table.push_row(vec!["Érica".to_owned()]);
        table.push_row(vec!["Bruno".to_owned()]);
        table.filter("bruno");

        let html = print_view_html("alunos", &table, Theme::Dark, OffsetDateTime::UNIX_EPOCH);
        assert!(html.contains("<body class=\"dark-theme\">"));
        assert!(html.contains("<th>Nome</th>"));
        assert!(html.contains("<tr style=\"display:none\"><td>Érica</td></tr>"));
        assert!(html.contains("<tr><td>Bruno</td></tr>"));
    }

    #[test]
    fn internal_dismiss_event_removes_the_alert() {
        let mut state = PageState::default();
        let (tx, rx) = mpsc::channel();

        push_alert(
            &mut state,
            &tx,
            "feito".to_owned(),
            AlertLevel::Success,
            false,
        );
        let id = state.alerts[0].id;
        // Deliver the timer's event directly instead of sleeping.
        tx.send(InternalEvent::DismissAlert { id }).expect("send");
        process_internal_events(&mut state, &rx);
        assert!(state.alerts.is_empty());
    }

    #[test]
    fn failed_stats_refresh_keeps_previous_counters() {
        let mut runtime = FakeRuntime::default();
        let mut state = PageState::default();
        let mut view = ViewData::default();

        super::refresh_view_data(&mut state, &mut runtime, &mut view);
        assert_eq!(view.stats.students, 10);

        runtime.fail_stats = true;
        state.dispatch(PageCommand::SetTab(TabKind::Alunos));
        super::refresh_view_data(&mut state, &mut runtime, &mut view);
        assert_eq!(view.stats.students, 10);
    }

    #[test]
    fn hidden_overlay_processing_only_resets_requerimento_forms() {
        let mut view = ViewData::default();
        view.form = Some(escola_app::FormDraft::requerimento());
        view.overlay.show(OverlayKind::Modal(ModalKind::Ajuda));
        view.overlay.hide(OverlayKind::Modal(ModalKind::Ajuda));

        view.form
            .as_mut()
            .expect("form present")
            .set_value("descricao", "giz");
        process_hidden_overlays(&mut view);
        assert_eq!(
            view.form.as_ref().and_then(|f| f.field("descricao")).map(|f| f.value.as_str()),
            Some("giz"),
        );
    }
}
