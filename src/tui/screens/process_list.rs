//! Process list screen
//!
//! Holds the last snapshot together with the filter and sort applied to it.
//! Filter and sort edits re-derive the visible rows immediately and also ask
//! for a fresh snapshot.

use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use tracing::debug;

use super::render_helpers::{render_notice, truncate, InputState};
use super::{RefreshTracker, Screen, StatusMessage, Transition};
use crate::config::AppConfig;
use crate::core::models::ProcessInfo;
use crate::core::query::{ProcessFilter, ProcessSort, SortField};
use crate::shortcuts::Context;
use crate::tui::event::{AppEvent, Mode, ViewAction};
use crate::tui::tasks::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Search,
    Filter,
}

#[derive(Debug, Clone)]
struct Prompt {
    kind: PromptKind,
    input: InputState,
}

pub struct ProcessListScreen {
    snapshot: Vec<ProcessInfo>,
    visible: Vec<ProcessInfo>,
    filter: ProcessFilter,
    sort: ProcessSort,
    default_sort: ProcessSort,
    selected: usize,
    table_state: TableState,
    page_size: usize,
    refresh: RefreshTracker,
    refresh_interval: Duration,
    auto_refresh: bool,
    loaded_at: Option<DateTime<Local>>,
    last_error: Option<String>,
    prompt: Option<Prompt>,
    /// Stored alongside the processes in backups.
    config: AppConfig,
}

impl ProcessListScreen {
    pub fn new(config: &AppConfig) -> Self {
        let mut filter = config.default_filter.clone();
        filter.show_system = config.show_system;
        Self {
            snapshot: Vec::new(),
            visible: Vec::new(),
            filter,
            sort: config.default_sort,
            default_sort: config.default_sort,
            selected: 0,
            table_state: TableState::default(),
            page_size: 10,
            refresh: RefreshTracker::default(),
            refresh_interval: config.refresh_interval(),
            auto_refresh: config.auto_refresh,
            loaded_at: None,
            last_error: None,
            prompt: None,
            config: config.clone(),
        }
    }

    pub fn processes(&self) -> &[ProcessInfo] {
        &self.visible
    }

    pub fn snapshot(&self) -> &[ProcessInfo] {
        &self.snapshot
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn sort(&self) -> ProcessSort {
        self.sort
    }

    pub fn filter(&self) -> &ProcessFilter {
        &self.filter
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh.in_flight()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Show the snapshot persisted by the previous session until the first
    /// refresh lands.
    pub fn seed(&mut self, processes: Vec<ProcessInfo>) {
        if self.loaded_at.is_none() {
            self.snapshot = processes;
            self.rebuild();
        }
    }

    fn refresh_task(&mut self) -> Task {
        Task::Refresh {
            origin: Mode::ProcessList,
            request: self.refresh.issue(),
        }
    }

    fn timer_task(&self) -> Option<Task> {
        self.auto_refresh.then_some(Task::ArmTimer {
            origin: Mode::ProcessList,
            after: self.refresh_interval,
        })
    }

    /// Re-derive the visible rows, keeping the selected process when it is
    /// still listed and clamping the index otherwise.
    fn rebuild(&mut self) {
        let keep = self.visible.get(self.selected).map(|p| p.pid);
        self.visible = self
            .snapshot
            .iter()
            .filter(|process| self.filter.matches(process))
            .cloned()
            .collect();
        self.sort.apply(&mut self.visible);

        if let Some(index) = keep.and_then(|pid| self.visible.iter().position(|p| p.pid == pid)) {
            self.selected = index;
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.visible.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.visible.len() {
            self.selected = self.visible.len() - 1;
        }
    }

    fn move_by(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let last = self.visible.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }

    fn apply_snapshot(&mut self, processes: Vec<ProcessInfo>) {
        self.snapshot = processes;
        self.loaded_at = Some(Local::now());
        self.last_error = None;
        self.rebuild();
    }

    fn handle_action(&mut self, action: ViewAction) -> Transition {
        match action {
            ViewAction::Refresh => Transition::tasks(vec![self.refresh_task()]),
            ViewAction::Kill { force } => match self.visible.get(self.selected) {
                Some(process) => {
                    let verb = if force { "Force killing" } else { "Terminating" };
                    let status = StatusMessage::info(format!(
                        "{verb} {} (PID {})",
                        process.name, process.pid
                    ));
                    Transition::tasks(vec![Task::Kill {
                        origin: Mode::ProcessList,
                        pid: process.pid,
                        force,
                    }])
                    .with_status(status)
                }
                None => Transition::none().with_status(StatusMessage::error("No process selected")),
            },
            ViewAction::Export(format) => Transition::tasks(vec![Task::Export {
                origin: Mode::ProcessList,
                format,
                processes: self.visible.clone(),
            }])
            .with_status(StatusMessage::info(format!("Exporting {} processes…", self.visible.len()))),
            ViewAction::Backup => Transition::tasks(vec![Task::Backup {
                origin: Mode::ProcessList,
                processes: self.snapshot.clone(),
                config: Some(self.config.clone()),
            }]),
            ViewAction::OpenSearch => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::Search,
                    input: InputState::new("Search", "Enter apply · Esc cancel")
                        .with_value(self.filter.search.clone()),
                });
                Transition::none()
            }
            ViewAction::OpenFilter => {
                self.prompt = Some(Prompt {
                    kind: PromptKind::Filter,
                    input: InputState::new(
                        "Filter",
                        "cpu>N cpu<N mem>N mem<N user=NAME status=S system=on|off words…",
                    ),
                });
                Transition::none()
            }
            ViewAction::SubmitInput => self.submit_prompt(),
            ViewAction::CancelInput => {
                self.prompt = None;
                Transition::none()
            }
            ViewAction::ClearFilters => {
                self.filter.clear();
                self.rebuild();
                Transition::tasks(vec![self.refresh_task()])
                    .with_status(StatusMessage::info("Filters cleared"))
            }
            ViewAction::ToggleSystem => {
                self.filter.show_system = !self.filter.show_system;
                self.rebuild();
                let state = if self.filter.show_system { "shown" } else { "hidden" };
                Transition::tasks(vec![self.refresh_task()])
                    .with_status(StatusMessage::info(format!("System processes {state}")))
            }
            ViewAction::SortBy(field) => self.change_sort(|sort| sort.select(field)),
            ViewAction::ResetSort => {
                let default_sort = self.default_sort;
                self.change_sort(|sort| *sort = default_sort)
            }
            _ => Transition::none(),
        }
    }

    fn change_sort(&mut self, edit: impl FnOnce(&mut ProcessSort)) -> Transition {
        edit(&mut self.sort);
        self.rebuild();
        debug!(sort = %self.sort, "sort changed");
        Transition::tasks(vec![self.refresh_task()])
            .with_status(StatusMessage::info(format!("Sorted by {}", self.sort)))
    }

    fn submit_prompt(&mut self) -> Transition {
        let Some(prompt) = self.prompt.take() else {
            return Transition::none();
        };
        let value = prompt.input.value().trim().to_string();
        match prompt.kind {
            PromptKind::Search => {
                self.filter.search = value;
            }
            PromptKind::Filter => {
                match ProcessFilter::parse_expression(&value, self.filter.show_system) {
                    Ok(filter) => self.filter = filter,
                    Err(err) => {
                        let message = err.user_message();
                        self.prompt = Some(prompt);
                        return Transition::none().with_status(StatusMessage::error(message));
                    }
                }
            }
        }
        self.rebuild();
        let status = if self.filter.is_narrowing() {
            format!("Filter: {}", self.filter.describe())
        } else {
            "Showing all processes".to_string()
        };
        Transition::tasks(vec![self.refresh_task()]).with_status(StatusMessage::info(status))
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Transition {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input.handle_key(key);
            return Transition::none();
        }
        let page = self.page_size.max(1) as isize;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_by(1),
            KeyCode::PageUp => self.move_by(-page),
            KeyCode::PageDown => self.move_by(page),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => {
                self.selected = self.visible.len().saturating_sub(1);
            }
            _ => {}
        }
        Transition::none()
    }

    fn summary_line(&self) -> Line<'static> {
        let refreshed = match self.loaded_at {
            Some(ts) => format!("Updated {}", ts.format("%H:%M:%S")),
            None => "Loading…".to_string(),
        };
        let mut spans = vec![
            Span::styled(
                format!("{} of {} processes", self.visible.len(), self.snapshot.len()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("  Sort: {}", self.sort)),
        ];
        if self.filter.is_narrowing() {
            spans.push(Span::styled(
                format!("  Filter: {}", self.filter.describe()),
                Style::default().fg(Color::Yellow),
            ));
        }
        if !self.filter.show_system {
            spans.push(Span::styled("  (system hidden)", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::raw(format!("  {refreshed}")));
        if self.refresh.in_flight() {
            spans.push(Span::styled(" ⟳", Style::default().fg(Color::Green)));
        }
        Line::from(spans)
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        let sort_field = self.sort.field;
        let header_cell = |label: &'static str, field: SortField| {
            let style = if field == sort_field {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            Cell::from(label).style(style)
        };
        let header = Row::new(vec![
            header_cell("PID", SortField::Pid),
            header_cell("NAME", SortField::Name),
            header_cell("CPU%", SortField::Cpu),
            header_cell("MEM%", SortField::Memory),
            header_cell("RSS", SortField::Memory),
            header_cell("USER", SortField::User),
            header_cell("THR", SortField::Threads),
            header_cell("NI", SortField::Nice),
            header_cell("STATUS", SortField::Status),
        ]);

        let rows: Vec<Row> = self
            .visible
            .iter()
            .map(|process| {
                Row::new(vec![
                    Cell::from(process.pid.to_string()),
                    Cell::from(truncate(&process.name, 28)),
                    Cell::from(format!("{:.1}", process.cpu)),
                    Cell::from(format!("{:.1}", process.memory)),
                    Cell::from(process.memory_display()),
                    Cell::from(truncate(&process.username, 12)),
                    Cell::from(process.num_threads.to_string()),
                    Cell::from(process.nice.to_string()),
                    Cell::from(process.status.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Min(16),
            Constraint::Length(6),
            Constraint::Length(6),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title("Processes"))
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
            .highlight_symbol("> ");

        self.page_size = area.height.saturating_sub(3).max(1) as usize;
        self.table_state.select(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }
}

impl Screen for ProcessListScreen {
    fn mode(&self) -> Mode {
        Mode::ProcessList
    }

    fn init(&mut self) -> Vec<Task> {
        let mut tasks = vec![self.refresh_task()];
        tasks.extend(self.timer_task());
        tasks
    }

    fn update(&mut self, event: &AppEvent) -> Transition {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Action(action) => self.handle_action(*action),
            AppEvent::TimerFired { .. } => {
                let mut tasks = Vec::new();
                if self.refresh.in_flight() {
                    debug!("previous refresh still running, skipping tick");
                } else {
                    tasks.push(self.refresh_task());
                }
                tasks.extend(self.timer_task());
                Transition::tasks(tasks)
            }
            AppEvent::ProcessesLoaded {
                request, result, ..
            } => {
                if !self.refresh.accept(*request) {
                    debug!(request, latest = self.refresh.latest(), "dropping stale refresh");
                    return Transition::none();
                }
                match result {
                    Ok(processes) => {
                        self.apply_snapshot(processes.clone());
                        Transition::none()
                    }
                    Err(err) => {
                        self.last_error = Some(err.clone());
                        Transition::none()
                            .with_status(StatusMessage::error(format!("Refresh failed: {err}")))
                    }
                }
            }
            AppEvent::KillFinished {
                pid, force, result, ..
            } => match result {
                Ok(()) => {
                    if self.selected + 1 < self.visible.len() {
                        self.selected += 1;
                    } else {
                        self.selected = self.selected.saturating_sub(1);
                    }
                    let signal = if *force { "SIGKILL" } else { "SIGTERM" };
                    Transition::tasks(vec![self.refresh_task()])
                        .with_status(StatusMessage::info(format!("Sent {signal} to PID {pid}")))
                }
                Err(err) => Transition::none()
                    .with_status(StatusMessage::error(format!("Kill failed: {err}"))),
            },
            AppEvent::FileWritten { label, result, .. } => match result {
                Ok(path) => Transition::none().with_status(StatusMessage::info(format!(
                    "{label} saved to {}",
                    path.display()
                ))),
                Err(err) => Transition::none()
                    .with_status(StatusMessage::error(format!("{label} failed: {err}"))),
            },
            _ => Transition::none(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(area);

        frame.render_widget(Paragraph::new(self.summary_line()), layout[0]);

        if self.visible.is_empty() {
            let message = match (&self.last_error, self.loaded_at) {
                (Some(err), _) => format!("Failed to load processes: {err}"),
                (None, None) => "Loading processes…".to_string(),
                (None, Some(_)) => "No processes match the current filter.".to_string(),
            };
            render_notice(frame, layout[1], "Processes", &message);
        } else {
            self.render_table(frame, layout[1]);
        }

        if let Some(prompt) = &self.prompt {
            prompt.input.render(frame, layout[1]);
        }
    }

    fn resize(&mut self, _width: u16, height: u16) {
        // title, summary, table borders and header, footer
        self.page_size = height.saturating_sub(10).max(1) as usize;
    }

    fn input_context(&self) -> Option<Context> {
        self.prompt.as_ref().map(|prompt| match prompt.kind {
            PromptKind::Search => Context::Search,
            PromptKind::Filter => Context::Filter,
        })
    }

    fn selected_pid(&self) -> Option<u32> {
        self.visible.get(self.selected).map(|process| process.pid)
    }

    fn configure(&mut self, config: &AppConfig) {
        self.config = config.clone();
        self.refresh_interval = config.refresh_interval();
        self.auto_refresh = config.auto_refresh;
        self.default_sort = config.default_sort;
        if self.filter.show_system != config.show_system {
            self.filter.show_system = config.show_system;
            self.rebuild();
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::screens::render_helpers::buffer_to_string;
    use crate::tui::screens::ScreenAction;
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;
    use ratatui::{backend::TestBackend, Terminal};

    fn process(pid: u32, name: &str, cpu: f64) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: name.to_string(),
            cpu,
            username: "alice".into(),
            ..Default::default()
        }
    }

    fn loaded(screen: &mut ProcessListScreen, processes: Vec<ProcessInfo>) {
        let request = screen.refresh.issue();
        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request,
            result: Ok(processes),
        });
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn init_refreshes_and_arms_timer() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        let tasks = screen.init();
        assert!(matches!(tasks[0], Task::Refresh { request: 1, .. }));
        assert!(matches!(
            tasks[1],
            Task::ArmTimer { after, .. } if after == Duration::from_secs(2)
        ));
        assert!(screen.is_refreshing());
    }

    #[test]
    fn no_timer_without_auto_refresh() {
        let config = AppConfig {
            auto_refresh: false,
            ..AppConfig::default()
        };
        let mut screen = ProcessListScreen::new(&config);
        assert_eq!(screen.init().len(), 1);
    }

    #[test]
    fn results_older_than_the_applied_one_are_ignored() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        screen.init();
        screen.update(&AppEvent::Action(ViewAction::Refresh));

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request: 2,
            result: Ok(vec![process(2, "new", 0.0)]),
        });
        assert!(!screen.is_refreshing());

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request: 1,
            result: Ok(vec![process(1, "old", 0.0)]),
        });
        assert_eq!(screen.processes()[0].name, "new");
    }

    #[test]
    fn slow_refreshes_still_land_when_ticks_outpace_them() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        let tasks = screen.init();
        let Task::Refresh { request: first, .. } = tasks[0] else {
            panic!("expected refresh");
        };

        // Ticks while the first refresh runs only re-arm the timer.
        for _ in 0..5 {
            let transition = screen.update(&AppEvent::TimerFired {
                origin: Mode::ProcessList,
            });
            assert!(matches!(transition.tasks[..], [Task::ArmTimer { .. }]));
        }

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request: first,
            result: Ok(vec![process(1, "late", 0.0)]),
        });
        assert_eq!(screen.processes().len(), 1);
        assert!(!screen.is_refreshing());

        let transition = screen.update(&AppEvent::TimerFired {
            origin: Mode::ProcessList,
        });
        assert!(matches!(
            transition.tasks[..],
            [Task::Refresh { .. }, Task::ArmTimer { .. }]
        ));
    }

    #[test]
    fn an_older_result_arriving_first_is_still_applied() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        screen.init();
        screen.update(&AppEvent::Action(ViewAction::Refresh));

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request: 1,
            result: Ok(vec![process(1, "first", 0.0)]),
        });
        assert_eq!(screen.processes()[0].name, "first");
        assert!(screen.is_refreshing());

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request: 2,
            result: Ok(vec![process(2, "second", 0.0)]),
        });
        assert_eq!(screen.processes()[0].name, "second");
        assert!(!screen.is_refreshing());
    }

    #[test]
    fn failed_refresh_keeps_snapshot() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        screen.init();
        loaded(&mut screen, vec![process(1, "a", 0.0)]);

        let refresh = screen.update(&AppEvent::Action(ViewAction::Refresh));
        let Task::Refresh { request, .. } = refresh.tasks[0] else {
            panic!("expected refresh");
        };
        let transition = screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::ProcessList,
            request,
            result: Err("boom".into()),
        });
        assert_eq!(screen.processes().len(), 1);
        assert_eq!(screen.last_error(), Some("boom"));
        assert!(transition.status.unwrap().text.contains("boom"));
    }

    #[test]
    fn navigation_is_clamped() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        loaded(
            &mut screen,
            vec![process(1, "a", 3.0), process(2, "b", 2.0), process(3, "c", 1.0)],
        );
        screen.update(&key(KeyCode::Up));
        assert_eq!(screen.selected_index(), 0);
        screen.update(&key(KeyCode::Char('G')));
        assert_eq!(screen.selected_index(), 2);
        screen.update(&key(KeyCode::Char('j')));
        assert_eq!(screen.selected_index(), 2);
        screen.update(&key(KeyCode::PageUp));
        assert_eq!(screen.selected_index(), 0);
        assert_eq!(screen.selected_pid(), Some(1));
    }

    #[test]
    fn selection_follows_process_across_refresh() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        loaded(&mut screen, vec![process(1, "a", 3.0), process(2, "b", 2.0)]);
        screen.update(&key(KeyCode::Down));
        assert_eq!(screen.selected_pid(), Some(2));

        loaded(
            &mut screen,
            vec![process(3, "c", 9.0), process(1, "a", 3.0), process(2, "b", 2.0)],
        );
        assert_eq!(screen.selected_pid(), Some(2));
        assert_eq!(screen.selected_index(), 2);
    }

    #[test]
    fn search_prompt_captures_text_and_filters() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        loaded(&mut screen, vec![process(1, "nginx", 1.0), process(2, "postgres", 2.0)]);

        screen.update(&AppEvent::Action(ViewAction::OpenSearch));
        assert_eq!(screen.input_context(), Some(Context::Search));
        for c in "ngi".chars() {
            screen.update(&key(KeyCode::Char(c)));
        }
        let transition = screen.update(&AppEvent::Action(ViewAction::SubmitInput));

        assert_eq!(screen.input_context(), None);
        assert_eq!(screen.processes().len(), 1);
        assert_eq!(screen.processes()[0].name, "nginx");
        assert!(matches!(transition.tasks[..], [Task::Refresh { .. }]));
    }

    #[test]
    fn invalid_filter_keeps_prompt_open() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        screen.update(&AppEvent::Action(ViewAction::OpenFilter));
        for c in "cpu>lots".chars() {
            screen.update(&key(KeyCode::Char(c)));
        }
        let transition = screen.update(&AppEvent::Action(ViewAction::SubmitInput));
        assert_eq!(screen.input_context(), Some(Context::Filter));
        assert!(transition.tasks.is_empty());
        assert!(transition.status.is_some());
    }

    #[test]
    fn backups_carry_the_current_config() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        loaded(&mut screen, vec![process(1, "a", 3.0)]);
        screen.configure(&AppConfig {
            theme: "dark".into(),
            ..AppConfig::default()
        });

        let transition = screen.update(&AppEvent::Action(ViewAction::Backup));
        match &transition.tasks[..] {
            [Task::Backup {
                processes,
                config: Some(config),
                ..
            }] => {
                assert_eq!(processes.len(), 1);
                assert_eq!(config.theme, "dark");
            }
            other => panic!("unexpected tasks: {other:?}"),
        }
    }

    #[test]
    fn seeded_rows_show_until_the_first_refresh() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        screen.seed(vec![process(1, "previous", 1.0)]);
        assert_eq!(screen.processes()[0].name, "previous");

        screen.init();
        loaded(&mut screen, vec![process(2, "live", 1.0)]);
        assert_eq!(screen.processes()[0].name, "live");

        screen.seed(vec![process(3, "ignored", 1.0)]);
        assert_eq!(screen.processes()[0].name, "live");
    }

    #[test]
    fn kill_failure_only_reports() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        loaded(&mut screen, vec![process(1, "a", 3.0), process(2, "b", 2.0)]);
        let transition = screen.update(&AppEvent::KillFinished {
            origin: Mode::ProcessList,
            pid: 1,
            force: false,
            result: Err("permission denied".into()),
        });
        assert!(transition.tasks.is_empty());
        assert_eq!(screen.selected_index(), 0);
    }

    #[test]
    fn kill_without_selection_is_rejected() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        let transition = screen.update(&AppEvent::Action(ViewAction::Kill { force: true }));
        assert!(transition.tasks.is_empty());
        assert_eq!(transition.action, ScreenAction::None);
    }

    #[test]
    fn renders_rows_and_empty_state() {
        let mut screen = ProcessListScreen::new(&AppConfig::default());
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal.draw(|frame| screen.render(frame, frame.size())).unwrap();
        assert!(buffer_to_string(terminal.backend().buffer()).contains("Loading processes"));

        loaded(&mut screen, vec![process(4242, "postgres", 12.5)]);
        terminal.draw(|frame| screen.render(frame, frame.size())).unwrap();
        let rendered = buffer_to_string(terminal.backend().buffer());
        assert!(rendered.contains("4242"), "missing row:\n{rendered}");
        assert!(rendered.contains("postgres"));
        assert!(rendered.contains("12.5"));
    }
}
