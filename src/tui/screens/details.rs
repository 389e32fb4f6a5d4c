//! Process details screen
//!
//! Shows every field of one process plus its place in the process tree.
//! Up/down step through processes in PID order, left jumps to the parent and
//! right to the first child.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

use super::render_helpers::{detail_line, render_notice, section_title, truncate};
use super::{RefreshTracker, Screen, StatusMessage, Transition};
use crate::common::constants::duration::DETAILS_REFRESH_INTERVAL;
use crate::config::AppConfig;
use crate::core::models::{format_bytes, ProcessInfo};
use crate::core::process_tree::ProcessTree;
use crate::tui::event::{AppEvent, Mode, ViewAction};
use crate::tui::tasks::Task;

const MAX_CHILDREN_SHOWN: usize = 12;

pub struct DetailsScreen {
    processes: Vec<ProcessInfo>,
    tree: ProcessTree,
    selected: usize,
    /// Process to select once the next snapshot arrives.
    focus_pid: Option<u32>,
    refresh: RefreshTracker,
    auto_refresh: bool,
    loaded_at: Option<DateTime<Local>>,
}

impl DetailsScreen {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            processes: Vec::new(),
            tree: ProcessTree::default(),
            selected: 0,
            focus_pid: None,
            refresh: RefreshTracker::default(),
            auto_refresh: config.auto_refresh,
            loaded_at: None,
        }
    }

    pub fn current(&self) -> Option<&ProcessInfo> {
        self.processes.get(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    fn refresh_task(&mut self) -> Task {
        Task::Refresh {
            origin: Mode::Details,
            request: self.refresh.issue(),
        }
    }

    fn timer_task(&self) -> Option<Task> {
        self.auto_refresh.then_some(Task::ArmTimer {
            origin: Mode::Details,
            after: DETAILS_REFRESH_INTERVAL,
        })
    }

    fn apply_snapshot(&mut self, mut processes: Vec<ProcessInfo>) {
        let keep = self
            .focus_pid
            .take()
            .or_else(|| self.current().map(|p| p.pid));
        processes.sort_by_key(|p| p.pid);
        self.tree = ProcessTree::build(&processes);
        self.processes = processes;
        self.loaded_at = Some(Local::now());

        if let Some(index) = keep.and_then(|pid| self.index_of(pid)) {
            self.selected = index;
        }
        self.clamp_selection();
    }

    fn index_of(&self, pid: u32) -> Option<usize> {
        self.processes.binary_search_by_key(&pid, |p| p.pid).ok()
    }

    fn clamp_selection(&mut self) {
        if self.processes.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.processes.len() {
            self.selected = self.processes.len() - 1;
        }
    }

    fn jump_to(&mut self, pid: Option<u32>) {
        if let Some(index) = pid.and_then(|pid| self.index_of(pid)) {
            self.selected = index;
        }
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let current = self.current().map(|p| p.pid);
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.processes.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => {
                self.jump_to(current.and_then(|pid| self.tree.parent(pid)));
            }
            KeyCode::Right | KeyCode::Char('l') => {
                let child = current.and_then(|pid| self.tree.children(pid).first().copied());
                self.jump_to(child);
            }
            _ => {}
        }
    }

    fn name_of(&self, pid: u32) -> String {
        self.index_of(pid)
            .map(|i| format!("{} ({pid})", self.processes[i].name))
            .unwrap_or_else(|| pid.to_string())
    }

    fn detail_lines(&self, process: &ProcessInfo) -> Vec<Line<'static>> {
        let started: DateTime<Local> = DateTime::from(process.create_time);
        let mut lines = vec![
            detail_line("PID", process.pid.to_string()),
            detail_line("Parent", self.name_of(process.ppid)),
            detail_line("Name", process.name.clone()),
            detail_line("Status", process.status.clone()),
            detail_line("User", process.username.clone()),
            detail_line("CPU", format!("{:.2}%", process.cpu)),
            detail_line(
                "Memory",
                format!("{:.2}% ({})", process.memory, format_bytes(process.memory_bytes)),
            ),
            detail_line("Threads", process.num_threads.to_string()),
            detail_line("Nice", process.nice.to_string()),
            detail_line("Started", started.format("%Y-%m-%d %H:%M:%S").to_string()),
            detail_line("Working dir", process.working_dir.clone()),
            detail_line("Command", process.command.clone()),
        ];
        if process.is_system() {
            lines.push(Line::from(Span::styled(
                "System process",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines
    }

    fn tree_lines(&self, pid: u32) -> Vec<Line<'static>> {
        let mut lines = vec![section_title("Ancestry")];
        let ancestry = self.tree.ancestry(pid);
        if ancestry.is_empty() {
            lines.push(Line::from("  (root)"));
        }
        for (depth, ancestor) in ancestry.iter().rev().enumerate() {
            lines.push(Line::from(format!(
                "{}└ {}",
                "  ".repeat(depth + 1),
                self.name_of(*ancestor)
            )));
        }

        lines.push(Line::from(""));
        let children = self.tree.children(pid);
        lines.push(section_title(&format!(
            "Children ({} direct, {} total)",
            children.len(),
            self.tree.descendant_count(pid)
        )));
        for child in children.iter().take(MAX_CHILDREN_SHOWN) {
            lines.push(Line::from(format!("  {}", truncate(&self.name_of(*child), 40))));
        }
        if children.len() > MAX_CHILDREN_SHOWN {
            lines.push(Line::from(format!(
                "  … {} more",
                children.len() - MAX_CHILDREN_SHOWN
            )));
        }
        lines
    }
}

impl Screen for DetailsScreen {
    fn mode(&self) -> Mode {
        Mode::Details
    }

    fn init(&mut self) -> Vec<Task> {
        let mut tasks = vec![self.refresh_task()];
        tasks.extend(self.timer_task());
        tasks
    }

    fn update(&mut self, event: &AppEvent) -> Transition {
        match event {
            AppEvent::Key(key) => {
                self.handle_key(key);
                Transition::none()
            }
            AppEvent::Action(ViewAction::Refresh) => Transition::tasks(vec![self.refresh_task()]),
            AppEvent::Action(ViewAction::Kill { force }) => match self.current() {
                Some(process) => Transition::tasks(vec![Task::Kill {
                    origin: Mode::Details,
                    pid: process.pid,
                    force: *force,
                }]),
                None => Transition::none().with_status(StatusMessage::error("No process selected")),
            },
            AppEvent::TimerFired { .. } => {
                let mut tasks = Vec::new();
                if !self.refresh.in_flight() {
                    tasks.push(self.refresh_task());
                }
                tasks.extend(self.timer_task());
                Transition::tasks(tasks)
            }
            AppEvent::ProcessesLoaded {
                request, result, ..
            } => {
                if !self.refresh.accept(*request) {
                    debug!(request, "dropping stale details refresh");
                    return Transition::none();
                }
                match result {
                    Ok(processes) => {
                        self.apply_snapshot(processes.clone());
                        Transition::none()
                    }
                    Err(err) => Transition::none()
                        .with_status(StatusMessage::error(format!("Refresh failed: {err}"))),
                }
            }
            AppEvent::KillFinished { pid, result, .. } => match result {
                Ok(()) => {
                    if self.selected + 1 < self.processes.len() {
                        self.selected += 1;
                    } else {
                        self.selected = self.selected.saturating_sub(1);
                    }
                    Transition::tasks(vec![self.refresh_task()])
                        .with_status(StatusMessage::info(format!("Terminated PID {pid}")))
                }
                Err(err) => Transition::none()
                    .with_status(StatusMessage::error(format!("Kill failed: {err}"))),
            },
            _ => Transition::none(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let Some(process) = self.current() else {
            let message = if self.loaded_at.is_none() {
                "Loading process details…"
            } else {
                "No processes available."
            };
            render_notice(frame, area, "Details", message);
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(5)])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(layout[1]);

        let mut position = vec![Span::styled(
            format!("Process {} of {}", self.selected + 1, self.processes.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if self.refresh.in_flight() {
            position.push(Span::styled(" ⟳", Style::default().fg(Color::Green)));
        }
        frame.render_widget(Paragraph::new(Line::from(position)), layout[0]);

        let details = Paragraph::new(self.detail_lines(process))
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!("{} ({})", process.name, process.pid)),
            );
        frame.render_widget(details, body[0]);

        let tree = Paragraph::new(self.tree_lines(process.pid))
            .block(Block::default().borders(Borders::ALL).title("Process Tree"));
        frame.render_widget(tree, body[1]);
    }

    fn selected_pid(&self) -> Option<u32> {
        self.current().map(|p| p.pid)
    }

    fn focus(&mut self, pid: Option<u32>) {
        self.focus_pid = pid;
        self.jump_to(pid);
    }

    fn configure(&mut self, config: &AppConfig) {
        self.auto_refresh = config.auto_refresh;
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
    use crossterm::event::KeyModifiers;
    use ratatui::{backend::TestBackend, Terminal};

    fn process(pid: u32, ppid: u32, name: &str) -> ProcessInfo {
        ProcessInfo {
            pid,
            ppid,
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn tree() -> Vec<ProcessInfo> {
        vec![
            process(30, 10, "worker"),
            process(1, 0, "init"),
            process(10, 1, "server"),
            process(31, 10, "worker"),
        ]
    }

    fn load(screen: &mut DetailsScreen) {
        let tasks = screen.init();
        assert_eq!(tasks.len(), 2);
        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::Details,
            request: screen.refresh.latest(),
            result: Ok(tree()),
        });
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn focuses_requested_pid_on_load() {
        let mut screen = DetailsScreen::new(&AppConfig::default());
        screen.focus(Some(30));
        load(&mut screen);
        assert_eq!(screen.selected_pid(), Some(30));
    }

    #[test]
    fn walks_the_tree_with_arrow_keys() {
        let mut screen = DetailsScreen::new(&AppConfig::default());
        screen.focus(Some(31));
        load(&mut screen);

        screen.update(&key(KeyCode::Left));
        assert_eq!(screen.selected_pid(), Some(10));
        screen.update(&key(KeyCode::Right));
        assert_eq!(screen.selected_pid(), Some(30));
        screen.update(&key(KeyCode::Down));
        assert_eq!(screen.selected_pid(), Some(31));
        screen.update(&key(KeyCode::Down));
        assert_eq!(screen.selected_pid(), Some(31));
    }

    #[test]
    fn kill_targets_current_process() {
        let mut screen = DetailsScreen::new(&AppConfig::default());
        screen.focus(Some(10));
        load(&mut screen);
        let transition = screen.update(&AppEvent::Action(ViewAction::Kill { force: false }));
        assert!(matches!(
            transition.tasks[..],
            [Task::Kill { pid: 10, force: false, origin: Mode::Details }]
        ));
    }

    #[test]
    fn slow_refresh_lands_after_ticks_pass_it() {
        let mut screen = DetailsScreen::new(&AppConfig::default());
        screen.focus(Some(10));
        screen.init();
        let first = screen.refresh.latest();

        for _ in 0..3 {
            let tick = screen.update(&AppEvent::TimerFired {
                origin: Mode::Details,
            });
            assert!(matches!(tick.tasks[..], [Task::ArmTimer { .. }]));
        }

        screen.update(&AppEvent::ProcessesLoaded {
            origin: Mode::Details,
            request: first,
            result: Ok(tree()),
        });
        assert_eq!(screen.selected_pid(), Some(10));
    }

    #[test]
    fn renders_fields_and_tree() {
        let mut screen = DetailsScreen::new(&AppConfig::default());
        screen.focus(Some(30));
        load(&mut screen);

        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| screen.render(frame, frame.size())).unwrap();
        let rendered = buffer_to_string(terminal.backend().buffer());
        assert!(rendered.contains("Process 3 of 4"), "{rendered}");
        assert!(rendered.contains("server (10)"));
        assert!(rendered.contains("init (1)"));
    }
}
