use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeDelta, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use jamtrack_core::{
    models::format_delta,
    prefs::{self, PrefStore},
    AppConfig, FetchCommand, FetchEvent, GameJam, JamCategory, JamList, JamStatus, Paginator,
};

const TICK_RATE: Duration = Duration::from_millis(250);
const PAGE_SIZE_STEPS: [usize; 5] = [5, 10, 15, 20, 25];
const REFILTER_INTERVAL_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
    danger: Color,
    info: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
            info: Color::Blue,
        }
    }
}

impl Theme {
    fn status_color(&self, status: JamStatus) -> Color {
        match status {
            JamStatus::Active => self.success,
            JamStatus::Voting => self.warning,
            JamStatus::Upcoming => self.info,
            JamStatus::Ended => self.danger,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Filter,
}

#[derive(Debug)]
enum AppEvent {
    Input(Event),
    Tick,
}

pub struct JamTrackerApp {
    list: JamList,
    paginator: Paginator,
    prefs: Box<dyn PrefStore>,
    fetch_tx: mpsc::Sender<FetchCommand>,
    fetch_rx: Option<mpsc::Receiver<FetchEvent>>,
    selection_rx: watch::Receiver<Option<GameJam>>,
    theme: Theme,
    state: UiState,
    show_overlay: bool,
    last_refilter: DateTime<Utc>,
}

impl JamTrackerApp {
    pub fn new(
        config: &AppConfig,
        list: JamList,
        prefs: Box<dyn PrefStore>,
        fetch_tx: mpsc::Sender<FetchCommand>,
    ) -> Self {
        let selection_rx = list.subscribe();
        let show_overlay = prefs::load_show_overlay(prefs.as_ref());
        Self {
            paginator: Paginator::new(config.page_size),
            list,
            prefs,
            fetch_tx,
            fetch_rx: None,
            selection_rx,
            theme: Theme::default(),
            state: UiState::default(),
            show_overlay,
            last_refilter: Utc::now(),
        }
    }

    pub fn attach_fetch(&mut self, receiver: mpsc::Receiver<FetchEvent>) {
        self.fetch_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        self.refresh_snapshot();
        let mut status = "Fetching jams from itch.io...".to_string();
        if let Some(jam) = self.list.selected() {
            status.push_str(" • ");
            status.push_str(&format!("Restored selection: {}", jam.title));
        }
        self.state.set_status(status);

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        let mut fetch_rx = self.fetch_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            if let Some(rx) = fetch_rx.as_mut() {
                let mut fetch_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_fetch = rx.recv() => {
                        match maybe_fetch {
                            Some(event) => self.handle_fetch_event(event),
                            None => fetch_closed = true,
                        }
                    }
                }
                if fetch_closed {
                    fetch_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            self.persist_selection_if_changed();
        }

        restore_terminal(&mut terminal)?;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                if let Err(err) = self.handle_input(event) {
                    self.state.set_status(format!("Error: {err}"));
                }
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            None => false,
        }
    }

    fn handle_fetch_event(&mut self, event: FetchEvent) {
        match event {
            FetchEvent::Loaded { jams, fetched_at } => {
                let count = jams.len();
                self.list.load_all(jams, fetched_at);
                self.refresh_snapshot();
                self.state.set_status(format!("Loaded {count} jams"));
            }
            FetchEvent::Error(err) => {
                error!(?err, "Background fetch failed");
                self.list.load_all(Vec::new(), Utc::now());
                self.refresh_snapshot();
                self.state.set_status(format!("Fetch failed: {err}"));
            }
        }
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Filter {
            self.state.set_status(format!("Filter: {}", self.state.query));
        }
        let now = Utc::now();
        if now - self.last_refilter >= TimeDelta::seconds(REFILTER_INTERVAL_SECS) {
            self.last_refilter = now;
            self.list.refilter(now);
            self.refresh_snapshot();
        }
    }

    fn handle_input(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            self.handle_key(key)?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state.mode {
            Mode::Filter => self.handle_filter_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.state.set_status("Filter cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.state
                    .set_status(format!("Filter applied: {}", self.state.query));
            }
            KeyCode::Backspace => {
                self.state.query.pop();
                self.apply_query();
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.state.query.push(c);
                    self.apply_query();
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => self.previous_page(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.go_to_page(0),
            KeyCode::Char('G') | KeyCode::End => {
                self.go_to_page(self.paginator.total_pages().saturating_sub(1));
            }
            KeyCode::Home => self.go_to_page(0),
            KeyCode::Tab => self.cycle_category(1),
            KeyCode::BackTab => self.cycle_category(-1),
            KeyCode::Char(c @ '1'..='5') if key.modifiers.is_empty() => {
                self.select_category_index(c as usize - '1' as usize);
            }
            KeyCode::Char('/') => {
                self.state.mode = Mode::Filter;
                self.state.set_status("Enter filter text".to_string());
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.step_page_size(1),
            KeyCode::Char('-') => self.step_page_size(-1),
            KeyCode::Enter => self.select_under_cursor(),
            KeyCode::Char('d') if key.modifiers.is_empty() => self.deselect_current(),
            KeyCode::Char('o') if key.modifiers.is_empty() => self.open_jam_page()?,
            KeyCode::Char('b') if key.modifiers.is_empty() => self.toggle_overlay(),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_refresh();
            }
            KeyCode::Esc => self.clear_query(),
            _ => {}
        }
        Ok(())
    }

    fn apply_query(&mut self) {
        let now = Utc::now();
        self.list.set_query(self.state.query.clone(), now);
        self.paginator.set_current_page(0);
        self.state.cursor = 0;
        self.refresh_snapshot();
        self.state.set_status(format!("Filter: {}", self.state.query));
    }

    fn clear_query(&mut self) {
        if self.state.query.is_empty() {
            return;
        }
        self.state.query.clear();
        self.apply_query();
        self.state.set_status("Filter cleared".to_string());
    }

    fn set_category(&mut self, category: JamCategory) {
        let now = Utc::now();
        self.list.set_category(category, now);
        self.paginator.set_current_page(0);
        self.state.cursor = 0;
        self.refresh_snapshot();
        self.state
            .set_status(format!("Category: {}", category.label()));
    }

    fn cycle_category(&mut self, step: isize) {
        let values = JamCategory::VALUES;
        let current = self.list.category();
        let idx = values
            .iter()
            .position(|category| *category == current)
            .unwrap_or(0) as isize;
        let next = (idx + step).rem_euclid(values.len() as isize) as usize;
        self.set_category(values[next]);
    }

    fn select_category_index(&mut self, index: usize) {
        if let Some(category) = JamCategory::VALUES.get(index).copied() {
            self.set_category(category);
        }
    }

    fn step_page_size(&mut self, step: isize) {
        let current = self.paginator.page_size();
        let idx = PAGE_SIZE_STEPS
            .iter()
            .position(|size| *size == current)
            .unwrap_or(1) as isize;
        let clamped = (idx + step).clamp(0, PAGE_SIZE_STEPS.len() as isize - 1) as usize;
        let size = PAGE_SIZE_STEPS[clamped];
        if size != current {
            self.paginator.set_page_size(size);
            self.refresh_snapshot();
            self.state.set_status(format!("{size} jams per page"));
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.page_slice().len();
        if len == 0 {
            return;
        }
        let mut idx = self.state.cursor as isize + delta;
        if idx < 0 {
            idx = 0;
        } else if idx >= len as isize {
            idx = len as isize - 1;
        }
        self.state.cursor = idx as usize;
    }

    fn next_page(&mut self) {
        let before = self.paginator.current_page();
        self.paginator.next_page();
        if self.paginator.current_page() != before {
            self.state.cursor = 0;
        }
    }

    fn previous_page(&mut self) {
        let before = self.paginator.current_page();
        self.paginator.previous_page();
        if self.paginator.current_page() != before {
            self.state.cursor = 0;
        }
    }

    fn go_to_page(&mut self, page: usize) {
        self.paginator.set_current_page(page);
        self.state.cursor = 0;
    }

    fn select_under_cursor(&mut self) {
        let Some(jam) = self.jam_under_cursor().cloned() else {
            self.state.set_status("Nothing to select".to_string());
            return;
        };
        let now = Utc::now();
        if self.list.select(jam.id, now) {
            self.refresh_snapshot();
            info!(id = jam.id, title = %jam.title, "Jam selected");
            self.state.set_status(format!("Selected: {}", jam.title));
        }
    }

    fn deselect_current(&mut self) {
        if self.list.selected().is_none() {
            self.state.set_status("No jam selected".to_string());
            return;
        }
        self.list.deselect();
        self.refresh_snapshot();
        self.state.set_status("Selection cleared".to_string());
    }

    fn open_jam_page(&mut self) -> Result<()> {
        let Some(jam) = self.jam_under_cursor() else {
            self.state.set_status("Nothing to open".to_string());
            return Ok(());
        };
        let url = jam.url.clone();
        open::that(&url).with_context(|| format!("failed to open {url}"))?;
        self.state.set_status(format!("Opened {url}"));
        Ok(())
    }

    fn toggle_overlay(&mut self) {
        self.show_overlay = !self.show_overlay;
        if let Err(err) = prefs::store_show_overlay(self.prefs.as_mut(), self.show_overlay) {
            error!(?err, "Failed to persist overlay preference");
        }
        let message = if self.show_overlay {
            "Overlay enabled"
        } else {
            "Overlay hidden"
        };
        self.state.set_status(message.to_string());
    }

    fn request_refresh(&mut self) {
        self.list.set_loading(true);
        match self.fetch_tx.try_send(FetchCommand::Refresh) {
            Ok(()) => self.state.set_status("Refreshing jams...".to_string()),
            Err(err) => {
                self.list.set_loading(false);
                self.state.set_status(format!("Refresh failed: {err}"));
            }
        }
    }

    fn persist_selection_if_changed(&mut self) {
        let Ok(true) = self.selection_rx.has_changed() else {
            return;
        };
        let selected = self.selection_rx.borrow_and_update().as_ref().cloned();
        if let Err(err) = prefs::store_selection(self.prefs.as_mut(), selected.as_ref()) {
            error!(?err, "Failed to persist selection");
            self.state
                .set_status(format!("Failed to save selection: {err}"));
        }
    }

    fn refresh_snapshot(&mut self) {
        self.state.jams = self.list.filtered();
        self.paginator.set_item_count(self.state.jams.len());
        let len = self.page_slice().len();
        if len == 0 {
            self.state.cursor = 0;
        } else if self.state.cursor >= len {
            self.state.cursor = len - 1;
        }
    }

    fn page_slice(&self) -> &[GameJam] {
        self.state
            .jams
            .get(self.paginator.page_range())
            .unwrap_or(&[])
    }

    fn jam_under_cursor(&self) -> Option<&GameJam> {
        self.page_slice().get(self.state.cursor)
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let now = Utc::now();
        let selected = self.list.selected();
        let show_overlay = self.show_overlay && selected.is_some();

        let mut constraints = Vec::new();
        if show_overlay {
            constraints.push(Constraint::Length(5));
        }
        constraints.push(Constraint::Length(3));
        constraints.push(Constraint::Min(8));
        constraints.push(Constraint::Length(4));

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(size);

        let mut chunk_iter = chunks.iter();
        let overlay_chunk = if show_overlay { chunk_iter.next() } else { None };
        let tabs_chunk = chunk_iter.next().copied().unwrap_or(size);
        let body_chunk = chunk_iter.next().copied().unwrap_or(size);
        let status_chunk = chunk_iter.next().copied().unwrap_or(size);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(body_chunk);

        self.render_tabs(frame, tabs_chunk);
        self.render_jam_list(frame, body_chunks[0], now);
        self.render_jam_details(frame, body_chunks[1], now);
        self.render_status(frame, status_chunk);
        if let (Some(jam), Some(area)) = (selected.as_ref(), overlay_chunk.copied()) {
            self.render_overlay(frame, area, jam, now);
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = JamCategory::VALUES
            .iter()
            .map(|category| Line::from(category.label()))
            .collect();
        let current = self.list.category();
        let selected = JamCategory::VALUES
            .iter()
            .position(|category| *category == current)
            .unwrap_or(0);
        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::ALL).title("Categories"))
            .select(selected)
            .style(Style::default().fg(self.theme.muted))
            .highlight_style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_jam_list(&self, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
        let title = format!(
            "Jams ({} total, page {}/{})",
            self.state.jams.len(),
            self.paginator.current_page() + 1,
            self.paginator.total_pages()
        );
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.list.is_loading() {
            let paragraph = Paragraph::new("Loading jams from itch.io...").block(block);
            frame.render_widget(paragraph, area);
            return;
        }
        let jams = self.page_slice();
        if jams.is_empty() {
            let paragraph = Paragraph::new("No jams found matching your criteria.").block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let mut list_state = ListState::default();
        list_state.select(Some(self.state.cursor.min(jams.len() - 1)));

        let items: Vec<ListItem> = jams
            .iter()
            .map(|jam| {
                let status = jam.status_at(now);
                let mut spans = vec![Span::styled(
                    "● ",
                    Style::default().fg(self.theme.status_color(status)),
                )];
                if jam.highlighted {
                    spans.push(Span::styled("★ ", Style::default().fg(self.theme.warning)));
                }
                let mut title_style = Style::default().fg(self.theme.primary_fg);
                if jam.is_selected() {
                    title_style = title_style.add_modifier(Modifier::BOLD);
                }
                spans.push(Span::styled(jam.title.clone(), title_style));
                spans.push(Span::styled(
                    format!("  {}", jam_date_info(jam, now)),
                    Style::default().fg(self.theme.muted),
                ));
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(self.theme.selection_bg));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_jam_details(&self, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(jam) = self.jam_under_cursor() else {
            let paragraph = Paragraph::new("No jam under the cursor").block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let status = jam.status_at(now);
        let mut lines = Vec::new();
        lines.push(Line::from(Span::styled(
            jam.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(vec![
            Span::raw("Status: "),
            Span::styled(
                status.to_string(),
                Style::default().fg(self.theme.status_color(status)),
            ),
        ]));
        lines.push(Line::from(format!(
            "Starts: {}",
            format_local(jam.start_date)
        )));
        lines.push(Line::from(format!("Ends: {}", format_local(jam.end_date))));
        if let Some(voting_end) = jam.voting_end_date {
            lines.push(Line::from(format!(
                "Voting ends: {}",
                format_local(voting_end)
            )));
        }
        lines.push(Line::from(format!("Participants: {}", jam.joined_count)));
        if jam.highlighted {
            lines.push(Line::from(Span::styled(
                "Featured on the calendar",
                Style::default().fg(self.theme.warning),
            )));
        }
        lines.push(Line::from(format!("URL: {}", jam.url)));
        lines.push(Line::from(""));
        match status {
            JamStatus::Active => {
                let progress = jam.progress_at(now);
                lines.push(Line::from(format!("Progress: {:.1}%", progress * 100.0)));
                lines.push(Line::from(format!(
                    "Time remaining: {}",
                    format_delta(jam.time_remaining_at(now))
                )));
            }
            JamStatus::Voting => {
                lines.push(Line::from(
                    "Submission period has ended. Voting is now open!",
                ));
                lines.push(Line::from(format!(
                    "Voting ends in: {}",
                    format_delta(jam.voting_time_remaining_at(now))
                )));
            }
            JamStatus::Upcoming => {
                lines.push(Line::from("This jam hasn't started yet."));
                lines.push(Line::from(format!(
                    "Starts in: {}",
                    format_delta(jam.time_until_start(now))
                )));
            }
            JamStatus::Ended => {
                lines.push(Line::from("This jam has ended."));
            }
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_overlay(&self, frame: &mut Frame, area: Rect, jam: &GameJam, now: DateTime<Utc>) {
        let block = Block::default().borders(Borders::ALL).title("Current Jam");
        let inner = block.inner(area);
        frame.render_widget(block, area);
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(inner);

        let title = Paragraph::new(Line::from(Span::styled(
            jam.title.clone(),
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(title, rows[0]);

        match jam.status_at(now) {
            JamStatus::Active => {
                let progress = jam.progress_at(now);
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(progress_color(progress)))
                    .ratio(progress)
                    .label(format!("{:.1}%", progress * 100.0));
                frame.render_widget(gauge, rows[1]);
                let info = format!(
                    "Elapsed: {} • Remaining: {}",
                    format_delta(now - jam.start_date),
                    format_delta(jam.time_remaining_at(now))
                );
                frame.render_widget(Paragraph::new(info).alignment(Alignment::Center), rows[2]);
            }
            JamStatus::Voting => {
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(self.theme.danger))
                    .ratio(1.0)
                    .label("Completed");
                frame.render_widget(gauge, rows[1]);
                let info = format!(
                    "Jam completed • Voting: {}",
                    format_delta(jam.voting_time_remaining_at(now))
                );
                frame.render_widget(Paragraph::new(info).alignment(Alignment::Center), rows[2]);
            }
            JamStatus::Upcoming => {
                let info = format!("Starts in: {}", format_delta(jam.time_until_start(now)));
                frame.render_widget(Paragraph::new(info).alignment(Alignment::Center), rows[2]);
            }
            JamStatus::Ended => {
                let gauge = Gauge::default()
                    .gauge_style(Style::default().fg(self.theme.danger))
                    .ratio(1.0)
                    .label("Completed");
                frame.render_widget(gauge, rows[1]);
                frame.render_widget(
                    Paragraph::new("Jam completed").alignment(Alignment::Center),
                    rows[2],
                );
            }
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Filter {
            format!("Filter: {}", self.state.query)
        } else {
            self.state.status.clone()
        };
        let secondary = format!(
            "{} per page  /: search  Tab: category  Enter: select  d: deselect  o: open  b: overlay  Ctrl+R: refresh  q: quit",
            self.paginator.page_size()
        );
        let paragraph = Paragraph::new(vec![Line::from(primary), Line::from(secondary)])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    jams: Vec<GameJam>,
    cursor: usize,
    query: String,
    status: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            jams: Vec::new(),
            cursor: 0,
            query: String::new(),
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_status(&mut self, message: String) {
        self.status = message;
    }
}

fn jam_date_info(jam: &GameJam, now: DateTime<Utc>) -> String {
    match jam.status_at(now) {
        JamStatus::Active => format!(
            "Ends {} ({} left)",
            format_local_date(jam.end_date),
            format_delta(jam.time_remaining_at(now))
        ),
        JamStatus::Voting => {
            let voting_end = jam
                .voting_end_date
                .map(format_local_date)
                .unwrap_or_default();
            format!(
                "Voting ends {} ({} left)",
                voting_end,
                format_delta(jam.voting_time_remaining_at(now))
            )
        }
        JamStatus::Upcoming => format!(
            "Starts {} (in {})",
            format_local_date(jam.start_date),
            format_delta(jam.time_until_start(now))
        ),
        JamStatus::Ended => format!("Ended {}", format_local_date(jam.end_date)),
    }
}

fn format_local(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn format_local_date(date: DateTime<Utc>) -> String {
    date.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

// Deadline gradient: green through yellow and orange into red as an
// active jam runs out of time.
fn progress_color(progress: f64) -> Color {
    const GREEN: (u8, u8, u8) = (51, 204, 51);
    const YELLOW: (u8, u8, u8) = (230, 230, 51);
    const ORANGE: (u8, u8, u8) = (230, 153, 26);
    const RED: (u8, u8, u8) = (230, 51, 51);
    if progress < 0.33 {
        lerp_rgb(GREEN, YELLOW, progress / 0.33)
    } else if progress < 0.66 {
        lerp_rgb(YELLOW, ORANGE, (progress - 0.33) / 0.33)
    } else {
        lerp_rgb(ORANGE, RED, (progress - 0.66) / 0.34)
    }
}

fn lerp_rgb(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
    Color::Rgb(
        channel(from.0, to.0),
        channel(from.1, to.1),
        channel(from.2, to.2),
    )
}
