//! Interactive three-pane browser: sidebar, feed and inspector.
//!
//! All state changes go through [`App::dispatch`]; this module only owns
//! cursor position, input modes and the transient status line.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use linkstack_core::filter;
use linkstack_core::render::domain_of;
use linkstack_core::{
    normalize_url, parse_tags, App, Entries, Feed, IconCategory, Inspection, Inspector, ItemId,
    Locator, NewLink, Outcome, Preview, Selector, Sidebar, ToggleField, UiEvent,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};

use crate::files;
use crate::theme::TuiTheme;

const TOAST_TTL: Duration = Duration::from_millis(2500);
const FORM_LABELS: [&str; 4] = ["URL", "Title", "Folder", "Tags"];

pub trait EventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

pub struct RealEventSource;

impl EventSource for RealEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout)? {
            Ok(Some(event::read()?))
        } else {
            Ok(None)
        }
    }
}

pub struct BrowserContext {
    pub theme: TuiTheme,
    pub download_dir: std::path::PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LinkForm {
    fields: [String; 4],
    focus: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Query,
    Note { id: ItemId, buffer: String },
    AddLink(LinkForm),
}

struct UiState {
    mode: Mode,
    cursor: usize,
    toast: Option<(String, Instant)>,
    quit: bool,
}

impl UiState {
    fn new() -> Self {
        UiState {
            mode: Mode::Normal,
            cursor: 0,
            toast: None,
            quit: false,
        }
    }

    /// Fresh state, toasting a load failure so an empty library is not silent.
    fn opening(app: &App) -> Self {
        let mut ui = UiState::new();
        if let Some(reason) = app.library().load_error() {
            ui.say(format!("Stored items unreadable, started empty: {reason}"));
        }
        ui
    }

    fn say(&mut self, msg: impl Into<String>) {
        self.toast = Some((msg.into(), Instant::now() + TOAST_TTL));
    }

    fn toast(&self) -> Option<&str> {
        match &self.toast {
            Some((msg, until)) if Instant::now() <= *until => Some(msg),
            _ => None,
        }
    }
}

pub fn run_browser(app: &mut App, ctx: &BrowserContext) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    let mut es = RealEventSource;
    let res = run_on(&mut terminal, app, &mut es, ctx);
    disable_raw_mode()?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

pub fn run_on<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    es: &mut dyn EventSource,
    ctx: &BrowserContext,
) -> Result<()> {
    event_loop(app, es, ctx, false, |app, ui| {
        terminal
            .draw(|f| draw(f, app, ui, &ctx.theme))
            .map_err(|e| anyhow::anyhow!("draw failed: {e}"))?;
        Ok(())
    })
}

/// Processes events without a terminal and returns once the source is empty.
pub fn run_headless(app: &mut App, es: &mut dyn EventSource, ctx: &BrowserContext) -> Result<()> {
    event_loop(app, es, ctx, true, |_, _| Ok(()))
}

fn event_loop(
    app: &mut App,
    es: &mut dyn EventSource,
    ctx: &BrowserContext,
    headless: bool,
    mut paint: impl FnMut(&App, &UiState) -> Result<()>,
) -> Result<()> {
    let mut ui = UiState::opening(app);
    loop {
        clamp_cursor(app, &mut ui);
        paint(app, &ui)?;
        match es.poll(Duration::from_millis(100))? {
            Some(Event::Key(k)) if k.kind == KeyEventKind::Press => handle_key(app, &mut ui, ctx, k),
            Some(_) => {}
            None if headless => break,
            None => {}
        }
        if ui.quit {
            break;
        }
    }
    // an open editor still counts as a blur
    if let Mode::Note { id, buffer } = std::mem::replace(&mut ui.mode, Mode::Normal) {
        apply(app, &mut ui, UiEvent::NoteBlurred { id, text: buffer });
    }
    Ok(())
}

fn handle_key(app: &mut App, ui: &mut UiState, ctx: &BrowserContext, k: KeyEvent) {
    if k.code == KeyCode::Char('c') && k.modifiers.contains(KeyModifiers::CONTROL) {
        ui.quit = true;
        return;
    }
    let mode = std::mem::replace(&mut ui.mode, Mode::Normal);
    ui.mode = match mode {
        Mode::Normal => normal_key(app, ui, ctx, k),
        Mode::Query => query_key(app, ui, k),
        Mode::Note { id, buffer } => note_key(app, ui, id, buffer, k),
        Mode::AddLink(form) => form_key(app, ui, form, k),
    };
}

fn normal_key(app: &mut App, ui: &mut UiState, ctx: &BrowserContext, k: KeyEvent) -> Mode {
    if let Some(pending) = app.view().pending_delete.clone() {
        if k.code == KeyCode::Char('y') {
            if let Some(Outcome::Deleted(Some(_))) = apply(app, ui, UiEvent::DeleteConfirmed(pending)) {
                ui.say("Deleted");
            }
        } else {
            apply(app, ui, UiEvent::DeleteCancelled);
            ui.say("Kept");
        }
        return Mode::Normal;
    }
    match k.code {
        KeyCode::Char('q') => ui.quit = true,
        KeyCode::Esc => {
            if app.view().inspection == Inspection::Idle {
                ui.quit = true;
            } else {
                apply(app, ui, UiEvent::ItemDeselected);
            }
        }
        KeyCode::Char('/') => return Mode::Query,
        KeyCode::Tab => cycle_selector(app, ui, 1),
        KeyCode::BackTab => cycle_selector(app, ui, -1),
        KeyCode::Char('v') => {
            let mode = app.view().mode.toggled();
            apply(app, ui, UiEvent::ViewModeSelected(mode));
        }
        KeyCode::Up | KeyCode::Char('k') => ui.cursor = ui.cursor.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => ui.cursor += 1,
        KeyCode::Enter => {
            if let Some(id) = cursor_id(app, ui) {
                apply(app, ui, UiEvent::ItemSelected(id));
            }
        }
        KeyCode::Char('f') => toggle(app, ui, ToggleField::Fav),
        KeyCode::Char('p') => toggle(app, ui, ToggleField::Pinned),
        KeyCode::Char('l') => toggle(app, ui, ToggleField::Later),
        KeyCode::Char('x') | KeyCode::Delete => {
            if let Some(id) = target_id(app, ui) {
                apply(app, ui, UiEvent::DeleteRequested(id));
                ui.say("Press y to delete, any other key keeps it");
            }
        }
        KeyCode::Char('n') => {
            if let Some(item) = target_id(app, ui).and_then(|id| app.library().get(&id)) {
                return Mode::Note {
                    id: item.id.clone(),
                    buffer: item.note.clone(),
                };
            }
        }
        KeyCode::Char('d') => download(app, ui, ctx),
        KeyCode::Char('a') => return Mode::AddLink(LinkForm::default()),
        _ => {}
    }
    Mode::Normal
}

fn query_key(app: &mut App, ui: &mut UiState, k: KeyEvent) -> Mode {
    let mut query = app.view().query.clone();
    match k.code {
        KeyCode::Enter => return Mode::Normal,
        KeyCode::Esc => {
            apply(app, ui, UiEvent::SearchChanged(String::new()));
            return Mode::Normal;
        }
        KeyCode::Backspace => {
            query.pop();
        }
        KeyCode::Char(ch) => query.push(ch),
        _ => return Mode::Query,
    }
    apply(app, ui, UiEvent::SearchChanged(query));
    ui.cursor = 0;
    Mode::Query
}

fn note_key(app: &mut App, ui: &mut UiState, id: ItemId, mut buffer: String, k: KeyEvent) -> Mode {
    match k.code {
        KeyCode::Esc | KeyCode::Tab => {
            if apply(app, ui, UiEvent::NoteBlurred { id, text: buffer }).is_some() {
                ui.say("Note saved");
            }
            return Mode::Normal;
        }
        KeyCode::Enter => buffer.push('\n'),
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(ch) => buffer.push(ch),
        _ => {}
    }
    Mode::Note { id, buffer }
}

fn form_key(app: &mut App, ui: &mut UiState, mut form: LinkForm, k: KeyEvent) -> Mode {
    let n = FORM_LABELS.len();
    match k.code {
        KeyCode::Esc => return Mode::Normal,
        KeyCode::Enter => return submit_link(app, ui, form),
        KeyCode::Tab | KeyCode::Down => form.focus = (form.focus + 1) % n,
        KeyCode::BackTab | KeyCode::Up => form.focus = (form.focus + n - 1) % n,
        KeyCode::Backspace => {
            form.fields[form.focus].pop();
        }
        KeyCode::Char(ch) => form.fields[form.focus].push(ch),
        _ => {}
    }
    Mode::AddLink(form)
}

fn submit_link(app: &mut App, ui: &mut UiState, form: LinkForm) -> Mode {
    let [url, title, folder, tags] = &form.fields;
    if url.trim().is_empty() {
        ui.say("URL is required");
        return Mode::AddLink(form);
    }
    let title = if title.trim().is_empty() {
        domain_of(&normalize_url(url))
    } else {
        title.trim().to_string()
    };
    let input = NewLink {
        title,
        url: url.clone(),
        folder: Some(folder.clone()),
        tags: parse_tags(tags),
    };
    match apply(app, ui, UiEvent::CreateLinkSubmitted(input)) {
        Some(Outcome::Created(id)) => {
            if let Some(pos) = app.visible().iter().position(|i| i.id == id) {
                ui.cursor = pos;
            }
            ui.say("Added");
            Mode::Normal
        }
        _ => Mode::AddLink(form),
    }
}

/// Dispatch and surface failures on the status line instead of aborting.
fn apply(app: &mut App, ui: &mut UiState, ev: UiEvent) -> Option<Outcome> {
    match app.dispatch(ev) {
        Ok(out) => Some(out),
        Err(e) => {
            tracing::warn!(error = %e, "browser action failed");
            ui.say(format!("Error: {e}"));
            None
        }
    }
}

fn cycle_selector(app: &mut App, ui: &mut UiState, step: isize) {
    let mut order: Vec<Selector> = Selector::SMART.to_vec();
    order.extend(
        filter::folders(app.library().items())
            .into_iter()
            .map(Selector::Folder),
    );
    let len = order.len() as isize;
    let next = match order.iter().position(|s| s == &app.view().selector) {
        Some(pos) => (pos as isize + step).rem_euclid(len) as usize,
        None => 0,
    };
    apply(app, ui, UiEvent::TabSelected(order[next].clone()));
    ui.cursor = 0;
}

fn toggle(app: &mut App, ui: &mut UiState, field: ToggleField) {
    let Some(id) = target_id(app, ui) else {
        return;
    };
    let Some(current) = app.library().get(&id).map(|i| i.flag(field)) else {
        return;
    };
    if apply(app, ui, UiEvent::FieldToggled { id, field, value: !current }).is_some() {
        ui.say(format!("{field} {}", if current { "off" } else { "on" }));
    }
}

fn download(app: &App, ui: &mut UiState, ctx: &BrowserContext) {
    let Some(id) = target_id(app, ui) else {
        return;
    };
    match app.download(&id) {
        Ok(Some(dl)) => match files::save_download(&ctx.download_dir, &dl) {
            Ok(path) => ui.say(format!("Saved {}", path.display())),
            Err(e) => ui.say(format!("Download failed: {e}")),
        },
        Ok(None) => ui.say("Only files can be downloaded"),
        Err(e) => ui.say(format!("Download failed: {e}")),
    }
}

fn cursor_id(app: &App, ui: &UiState) -> Option<ItemId> {
    app.visible().get(ui.cursor).map(|i| i.id.clone())
}

/// The inspected item when the inspector is open, else the one under the cursor.
fn target_id(app: &App, ui: &UiState) -> Option<ItemId> {
    match &app.view().inspection {
        Inspection::Inspecting(id) => Some(id.clone()),
        Inspection::Idle => cursor_id(app, ui),
    }
}

fn clamp_cursor(app: &App, ui: &mut UiState) {
    let n = app.visible().len();
    if ui.cursor >= n {
        ui.cursor = n.saturating_sub(1);
    }
}

fn glyph(icon: IconCategory) -> &'static str {
    match icon {
        IconCategory::Globe => "[web]",
        IconCategory::Image => "[img]",
        IconCategory::Video => "[vid]",
        IconCategory::Audio => "[aud]",
        IconCategory::Pdf => "[pdf]",
        IconCategory::Document => "[doc]",
        IconCategory::Spreadsheet => "[xls]",
        IconCategory::File => "[file]",
    }
}

fn draw(f: &mut Frame, app: &App, ui: &UiState, theme: &TuiTheme) {
    let projection = app.projection();
    let area = f.area();
    let show_search = ui.mode == Mode::Query || !app.view().query.is_empty();

    let mut rows = Vec::new();
    if show_search {
        rows.push(Constraint::Length(3));
    }
    rows.push(Constraint::Min(5));
    rows.push(Constraint::Length(4));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(area);
    let (body, footer) = if show_search {
        let title = if ui.mode == Mode::Query {
            "Search (Enter keep, Esc clear)"
        } else {
            "Search"
        };
        let q = Paragraph::new(app.view().query.as_str()).block(bordered(title, theme));
        f.render_widget(q, chunks[0]);
        (chunks[1], chunks[2])
    } else {
        (chunks[0], chunks[1])
    };

    let mut cols = vec![Constraint::Length(26), Constraint::Min(20)];
    if projection.inspector.is_some() {
        cols.push(Constraint::Length(44));
    }
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(cols)
        .split(body);
    draw_sidebar(f, panes[0], &projection.sidebar, theme);
    draw_feed(f, panes[1], &projection.feed, ui.cursor, theme);
    if let Some(insp) = &projection.inspector {
        draw_inspector(f, panes[2], insp, ui, theme);
    }
    draw_footer(f, footer, app, ui, theme);
    if let Mode::AddLink(form) = &ui.mode {
        draw_form(f, area, form, theme);
    }
}

fn bordered<'a>(title: impl Into<Line<'a>>, theme: &TuiTheme) -> Block<'a> {
    let title: Line<'a> = title.into();
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(theme.border_fg))
}

fn heading(text: &str) -> Line<'_> {
    Line::styled(text, Style::default().add_modifier(Modifier::DIM))
}

fn draw_sidebar(f: &mut Frame, area: Rect, sb: &Sidebar, theme: &TuiTheme) {
    let active = Style::default()
        .fg(theme.accent_fg)
        .add_modifier(Modifier::BOLD);
    let entry = |label: String, selector: &Selector| {
        if *selector == sb.active {
            Line::styled(format!("> {label}"), active)
        } else {
            Line::raw(format!("  {label}"))
        }
    };

    let mut lines = vec![heading("LIBRARY")];
    for sc in &sb.smart {
        lines.push(entry(format!("{} ({})", sc.selector.label(), sc.count), &sc.selector));
    }
    lines.push(Line::raw(""));
    lines.push(heading("FOLDERS"));
    for folder in &sb.folders {
        lines.push(entry(folder.clone(), &Selector::Folder(folder.clone())));
    }
    if !sb.tags.is_empty() {
        lines.push(Line::raw(""));
        lines.push(heading("TAGS"));
        let cloud = sb
            .tags
            .iter()
            .map(|t| format!("#{t}"))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::styled(cloud, Style::default().fg(theme.accent_fg)));
    }
    let p = Paragraph::new(lines)
        .block(bordered("LinkStack", theme))
        .wrap(Wrap { trim: true });
    f.render_widget(p, area);
}

fn draw_feed(f: &mut Frame, area: Rect, feed: &Feed, cursor: usize, theme: &TuiTheme) {
    let block = bordered(format!("{} ({})", feed.heading, feed.count), theme);
    let star = |fav: bool| {
        if fav {
            Span::styled("* ", Style::default().fg(theme.accent_fg))
        } else {
            Span::raw("  ")
        }
    };
    let marker = |selected: bool| if selected { "> " } else { "" };
    let dim = Style::default().add_modifier(Modifier::DIM);

    let items: Vec<ListItem> = match &feed.entries {
        Entries::Empty => {
            let p = Paragraph::new("Nothing here yet. Press a to add a link.")
                .block(block)
                .style(dim);
            f.render_widget(p, area);
            return;
        }
        Entries::Grid(cards) => cards
            .iter()
            .map(|c| {
                let icon = match &c.preview {
                    Preview::Image { .. } => glyph(IconCategory::Globe),
                    Preview::Icon { category } => glyph(*category),
                };
                let tags = c
                    .tags
                    .iter()
                    .map(|t| format!("#{t}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                ListItem::new(vec![
                    Line::from(vec![
                        star(c.fav),
                        Span::raw(marker(c.selected)),
                        Span::styled(c.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                    ]),
                    Line::styled(format!("  {icon} {}", c.subtitle), dim),
                    Line::styled(format!("  {tags}"), Style::default().fg(theme.accent_fg)),
                ])
            })
            .collect(),
        Entries::List(rows) => rows
            .iter()
            .map(|r| {
                ListItem::new(Line::from(vec![
                    star(r.fav),
                    Span::raw(marker(r.selected)),
                    Span::raw(format!("{} ", glyph(r.icon))),
                    Span::raw(r.title.clone()),
                    Span::styled(format!("  {}", r.detail), dim),
                ]))
            })
            .collect(),
    };
    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .fg(theme.highlight_fg)
            .bg(theme.highlight_bg)
            .add_modifier(Modifier::REVERSED),
    );
    f.render_stateful_widget(list, area, &mut ListState::default().with_selected(Some(cursor)));
}

fn draw_inspector(f: &mut Frame, area: Rect, insp: &Inspector, ui: &UiState, theme: &TuiTheme) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let check = |on: bool, label: &str| format!("[{}] {label}", if on { "x" } else { " " });

    let mut lines = vec![Line::styled(
        insp.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    lines.push(match &insp.locator {
        Locator::Link { url } => Line::raw(url.clone()),
        Locator::File { file_name, size } => Line::raw(format!("{file_name} ({size})")),
    });
    lines.push(match &insp.preview {
        Preview::Image { url } if url.is_empty() => Line::styled("preview: none", dim),
        Preview::Image { url } => Line::styled(format!("preview: {url}"), dim),
        Preview::Icon { category } => Line::styled(format!("icon: {}", category.name()), dim),
    });
    lines.push(Line::raw(""));
    lines.push(Line::raw(format!("Folder: {}", insp.folder)));
    if insp.tags.is_empty() {
        lines.push(Line::styled("No tags", dim));
    } else {
        lines.push(Line::styled(
            format!("Tags: {}", insp.tags.join(", ")),
            Style::default().fg(theme.accent_fg),
        ));
    }
    lines.push(Line::raw(format!(
        "{}  {}  {}",
        check(insp.fav, "Favourite"),
        check(insp.pinned, "Pinned"),
        check(insp.later, "Later")
    )));
    lines.push(Line::styled(format!("Added {}", insp.created_at), dim));
    lines.push(Line::raw(""));

    let editing = match &ui.mode {
        Mode::Note { id, buffer } if *id == insp.id => Some(buffer),
        _ => None,
    };
    match editing {
        Some(buffer) => {
            lines.push(heading("NOTE (Esc saves)"));
            let text = format!("{buffer}_");
            lines.extend(text.lines().map(|l| Line::raw(l.to_string())));
        }
        None => {
            lines.push(heading("NOTE"));
            if insp.note.is_empty() {
                lines.push(Line::styled("press n to write one", dim));
            } else {
                lines.extend(insp.note.lines().map(|l| Line::raw(l.to_string())));
            }
        }
    }
    if insp.downloadable {
        lines.push(Line::raw(""));
        lines.push(Line::styled("d download", Style::default().fg(theme.help_fg)));
    }
    let p = Paragraph::new(lines)
        .block(bordered("Details", theme))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

fn draw_footer(f: &mut Frame, area: Rect, app: &App, ui: &UiState, theme: &TuiTheme) {
    let ln1 = format!(
        "/ search | Tab folders | v view({}) | f fav | p pin | l later | n note | d download",
        app.view().mode
    );
    let mut ln2 = String::from("Enter inspect | a add link | x delete | Esc close | q quit");
    if app.view().pending_delete.is_some() {
        ln2 = String::from("Delete this item? y confirms, any other key keeps it");
    }
    if let Some(msg) = ui.toast() {
        ln2.push_str(&format!("  | {msg}"));
    }
    let footer = Paragraph::new(vec![Line::raw(ln1), Line::raw(ln2)])
        .block(bordered("Shortcuts", theme))
        .style(Style::default().fg(theme.help_fg))
        .wrap(Wrap { trim: true });
    f.render_widget(footer, area);
}

fn draw_form(f: &mut Frame, area: Rect, form: &LinkForm, theme: &TuiTheme) {
    let popup = centered(area, 60, (FORM_LABELS.len() + 3) as u16);
    let focused = Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg);
    let mut lines: Vec<Line> = FORM_LABELS
        .iter()
        .zip(form.fields.iter())
        .enumerate()
        .map(|(i, (label, value))| {
            let text = format!("{label:>6}: {value}");
            if i == form.focus {
                Line::styled(text, focused)
            } else {
                Line::raw(text)
            }
        })
        .collect();
    lines.push(Line::styled(
        "Tab next field | Enter save | Esc cancel",
        Style::default().fg(theme.help_fg),
    ));
    f.render_widget(Clear, popup);
    f.render_widget(Paragraph::new(lines).block(bordered("Add link", theme)), popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}
