use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};

use sizing_terminal::config::{self, AppConfig};
use sizing_terminal::dataset::RowRecord;
use sizing_terminal::export;
use sizing_terminal::filter::FilterColumn;
use sizing_terminal::loader::{self, LoaderHandle};
use sizing_terminal::logging;
use sizing_terminal::notes_fetch::NoteStatus;
use sizing_terminal::platform::{Platform, platform_label};
use sizing_terminal::state::{AppState, Delta, apply_delta};

const PAGE: usize = 10;
const MAX_COLUMN_WIDTH: usize = 28;

struct App {
    state: AppState,
    config: AppConfig,
    should_quit: bool,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let mut state = AppState::new();
        state.push_log(format!("[INFO] Source: {}", config.source.label()));
        Self {
            state,
            config,
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.state.help_overlay = false;
            } else if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => self.state.next_platform(),
            KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => self.state.prev_platform(),
            KeyCode::Char(c @ '1'..='7') => {
                let idx = (c as u8 - b'1') as usize;
                if let Some(platform) = Platform::from_index(idx) {
                    self.state.select_platform(platform);
                }
            }
            KeyCode::Char('p') => self.state.cycle_filter(FilterColumn::Product),
            KeyCode::Char('r') => self.state.cycle_filter(FilterColumn::Release),
            KeyCode::Char('c') => self.state.cycle_filter(FilterColumn::Configuration),
            KeyCode::Char('x') => self.state.clear_filters(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(1),
            KeyCode::PageDown => self.state.scroll_down(PAGE),
            KeyCode::PageUp => self.state.scroll_up(PAGE),
            KeyCode::Char('e') => self.export_active(),
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn export_active(&mut self) {
        let platform = self.state.active;
        let columns = self.state.active_columns();
        if self.state.filtered_rows().is_empty() {
            self.state.push_log("[INFO] Nothing to export");
            return;
        }
        let result = {
            let rows = self.state.filtered_rows();
            export::export_view(&self.config.export_dir, platform, &columns, &rows)
        };
        self.state.export.finished_at = Some(Instant::now());
        match result {
            Ok(path) => {
                let path = path.display().to_string();
                self.state.push_log(format!("[INFO] Exported {path}"));
                self.state.export.last_path = Some(path);
                self.state.export.last_error = None;
            }
            Err(err) => {
                let msg = format!("{err:#}");
                tracing::warn!(error = %msg, "export failed");
                self.state.push_log(format!("[WARN] Export failed: {msg}"));
                self.state.export.last_error = Some(msg);
            }
        }
    }
}

fn main() -> io::Result<()> {
    config::load_dotenv();
    let config = AppConfig::from_env();
    let _log_guard = logging::init_file(&config.log_dir);

    let fetcher = config.build_fetcher().map_err(startup_error)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let loaders = loader::spawn_loaders(fetcher, tx, config.parallelism);

    let mut app = App::new(config);
    let res = run_app(&mut terminal, &mut app, rx, &loaders);

    // Late results from in-flight requests are dropped.
    loaders.cancel();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Setup failures end the process with a non-zero exit status.
fn startup_error(err: anyhow::Error) -> io::Error {
    tracing::error!(error = %format!("{err:#}"), "startup failed");
    io::Error::other(format!("{err:#}"))
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
    loaders: &LoaderHandle,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();
    let mut announced_done = false;

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        if !announced_done && app.state.all_loaded() {
            app.state.push_log("[INFO] All platforms loaded");
            announced_done = true;
        }
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, &app.state))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            loaders.cancel();
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(7),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_tabs(frame, chunks[0], state);
    render_filter_bar(frame, chunks[1], state);
    render_table(frame, chunks[2], state);
    render_notes(frame, chunks[3], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[4]);

    let footer = match (&state.export.last_path, &state.export.last_error) {
        (_, Some(err)) => Paragraph::new(format!("Export failed: {err}"))
            .style(Style::default().fg(Color::Red)),
        (Some(path), None) => Paragraph::new(format!("Exported to {path}"))
            .style(Style::default().fg(Color::Green)),
        (None, None) => Paragraph::new(
            "←/→ Tab | 1-7 Jump | p/r/c Filter | x Clear | j/k Scroll | e Export | ? Help | q Quit",
        )
        .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, chunks[5]);

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_tabs(frame: &mut Frame, area: Rect, state: &AppState) {
    let titles: Vec<String> = Platform::ALL
        .iter()
        .enumerate()
        .map(|(idx, p)| format!("{} {}", idx + 1, platform_label(*p)))
        .collect();
    let tabs = Tabs::new(titles)
        .select(state.active.index())
        .block(Block::default().title("Sizing").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .divider("│");
    frame.render_widget(tabs, area);
}

fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = Vec::new();
    for column in FilterColumn::ALL {
        let value = state
            .filters
            .get(column)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "All".to_string());
        let style = if state.filters.get(column).is_some() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        spans.push(Span::styled(
            format!(" {}: ", column.column_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled(value, style));
        spans.push(Span::raw("  "));
    }
    let shown = state.filtered_rows().len();
    let total = state.active_dataset().rows.len();
    spans.push(Span::styled(
        format!("{shown}/{total} rows"),
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default()
        .title(platform_label(state.active))
        .borders(Borders::ALL);
    let rows = state.filtered_rows();
    let columns = state.active_columns();

    if rows.is_empty() || columns.is_empty() {
        let msg = if state.active_dataset().rows.is_empty() {
            state.empty_table_message()
        } else {
            "No rows match the current filters"
        };
        let empty = Paragraph::new(msg)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let start = state.scroll.min(rows.len().saturating_sub(1));
    let end = (start + visible).min(rows.len());
    let window = &rows[start..end];

    let widths = column_widths(&columns, window);
    let header = Row::new(columns.iter().map(|c| Cell::from(c.clone())))
        .style(Style::default().add_modifier(Modifier::BOLD));
    let body = window.iter().map(|row| {
        Row::new(
            columns
                .iter()
                .map(|c| Cell::from(row.get(c).map(|v| v.to_string()).unwrap_or_default())),
        )
    });

    let table = Table::new(body, widths).header(header).block(block);
    frame.render_widget(table, area);
}

fn column_widths(columns: &[String], rows: &[&RowRecord]) -> Vec<Constraint> {
    columns
        .iter()
        .map(|name| {
            let widest = rows
                .iter()
                .filter_map(|row| row.get(name))
                .map(|v| v.to_string().chars().count())
                .max()
                .unwrap_or(0)
                .max(name.chars().count());
            Constraint::Length(widest.clamp(4, MAX_COLUMN_WIDTH) as u16)
        })
        .collect()
}

fn render_notes(frame: &mut Frame, area: Rect, state: &AppState) {
    let note = state.active_note();
    let mut lines: Vec<Line> = note
        .content
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();
    if let Some(hint) = note.hint() {
        let color = match note.status {
            NoteStatus::Error => Color::Red,
            NoteStatus::Fallback => Color::Yellow,
            _ => Color::DarkGray,
        };
        lines.push(Line::styled(hint, Style::default().fg(color)));
    }
    let notes = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Notes").borders(Borders::ALL));
    frame.render_widget(notes, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Sizing Terminal - Help",
        "",
        "Tabs:",
        "  ←/→ Tab/BackTab   Previous/next platform",
        "  1-7               Jump to platform",
        "",
        "Filters (reset on tab change):",
        "  p                 Cycle Product",
        "  r                 Cycle Release",
        "  c                 Cycle Configuration",
        "  x                 Clear all filters",
        "",
        "Table:",
        "  j/k or ↑/↓        Scroll",
        "  PgUp/PgDn         Page",
        "  e                 Export filtered view to xlsx",
        "",
        "  ?                 Toggle help",
        "  q                 Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
