//! Statistics screen
//!
//! Aggregates over the latest snapshot: totals, averages, status and user
//! breakdowns and the heaviest processes by CPU and memory.

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Table},
    Frame,
};
use tracing::debug;

use super::render_helpers::{detail_line, render_notice, truncate};
use super::{RefreshTracker, Screen, StatusMessage, Transition};
use crate::common::constants::duration::STATS_REFRESH_INTERVAL;
use crate::config::AppConfig;
use crate::core::models::{format_bytes, ProcessInfo};
use crate::core::stats::ProcessStats;
use crate::tui::event::{AppEvent, Mode, ViewAction};
use crate::tui::tasks::Task;

pub struct StatsScreen {
    stats: Option<ProcessStats>,
    refresh: RefreshTracker,
    auto_refresh: bool,
    loaded_at: Option<DateTime<Local>>,
}

impl StatsScreen {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            stats: None,
            refresh: RefreshTracker::default(),
            auto_refresh: config.auto_refresh,
            loaded_at: None,
        }
    }

    pub fn stats(&self) -> Option<&ProcessStats> {
        self.stats.as_ref()
    }

    fn refresh_task(&mut self) -> Task {
        Task::Refresh {
            origin: Mode::Stats,
            request: self.refresh.issue(),
        }
    }

    fn timer_task(&self) -> Option<Task> {
        self.auto_refresh.then_some(Task::ArmTimer {
            origin: Mode::Stats,
            after: STATS_REFRESH_INTERVAL,
        })
    }

    fn summary_line(&self) -> String {
        let refreshed = match self.loaded_at {
            Some(ts) => format!("Last refresh: {}", ts.format("%Y-%m-%d %H:%M:%S")),
            None => "Last refresh: pending".to_string(),
        };
        match &self.stats {
            Some(stats) => format!(
                "Processes: {} (Running: {})    {}",
                stats.total, stats.running, refreshed
            ),
            None => refreshed,
        }
    }

    fn render_overview(stats: &ProcessStats, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(4)])
            .split(area);

        let ratio = (stats.total_memory / 100.0).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Memory in use"))
            .gauge_style(Style::default().fg(Color::Green).bg(Color::DarkGray))
            .ratio(ratio)
            .label(format!(
                "{:.1}% ({})",
                stats.total_memory,
                format_bytes(stats.total_memory_bytes)
            ));
        frame.render_widget(gauge, layout[0]);

        let mut lines = vec![
            detail_line("Total CPU", format!("{:.2}%", stats.total_cpu)),
            detail_line("Average CPU", format!("{:.2}%", stats.avg_cpu)),
            detail_line("Average mem", format!("{:.2}%", stats.avg_memory)),
            Line::from(""),
        ];
        for (status, count) in &stats.status_counts {
            lines.push(detail_line(status, count.to_string()));
        }
        let overview = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Overview"));
        frame.render_widget(overview, layout[1]);
    }

    fn render_users(stats: &ProcessStats, frame: &mut Frame, area: Rect) {
        let rows: Vec<Row> = stats
            .user_counts
            .iter()
            .map(|(user, count)| {
                let user = if user.is_empty() { "(unknown)" } else { user.as_str() };
                Row::new(vec![Cell::from(truncate(user, 20)), Cell::from(count.to_string())])
            })
            .collect();
        let table = Table::new(rows, [Constraint::Min(12), Constraint::Length(8)])
            .header(Row::new(vec!["USER", "PROCS"]).style(Style::default().add_modifier(Modifier::BOLD)))
            .block(Block::default().borders(Borders::ALL).title("Top Users"));
        frame.render_widget(table, area);
    }

    fn render_top(
        title: &str,
        processes: &[ProcessInfo],
        value: impl Fn(&ProcessInfo) -> String,
        frame: &mut Frame,
        area: Rect,
    ) {
        let rows: Vec<Row> = processes
            .iter()
            .map(|p| {
                Row::new(vec![
                    Cell::from(p.pid.to_string()),
                    Cell::from(truncate(&p.name, 24)),
                    Cell::from(value(p)),
                ])
            })
            .collect();
        let table = Table::new(
            rows,
            [Constraint::Length(8), Constraint::Min(12), Constraint::Length(18)],
        )
        .header(Row::new(vec!["PID", "NAME", "USAGE"]).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
        frame.render_widget(table, area);
    }
}

impl Screen for StatsScreen {
    fn mode(&self) -> Mode {
        Mode::Stats
    }

    fn init(&mut self) -> Vec<Task> {
        let mut tasks = vec![self.refresh_task()];
        tasks.extend(self.timer_task());
        tasks
    }

    fn update(&mut self, event: &AppEvent) -> Transition {
        match event {
            AppEvent::Action(ViewAction::Refresh) => Transition::tasks(vec![self.refresh_task()]),
            AppEvent::Action(ViewAction::ExportStats) => match &self.stats {
                Some(stats) => Transition::tasks(vec![Task::ExportStats {
                    origin: Mode::Stats,
                    stats: stats.clone(),
                }]),
                None => Transition::none()
                    .with_status(StatusMessage::error("No statistics to export yet")),
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
                    debug!(request, "dropping stale stats refresh");
                    return Transition::none();
                }
                match result {
                    Ok(processes) => {
                        self.stats = Some(ProcessStats::compute(processes));
                        self.loaded_at = Some(Local::now());
                        Transition::none()
                    }
                    Err(err) => Transition::none()
                        .with_status(StatusMessage::error(format!("Refresh failed: {err}"))),
                }
            }
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
        let Some(stats) = &self.stats else {
            render_notice(frame, area, "Statistics", "Collecting statistics…");
            return;
        };

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(9),
            ])
            .split(area);

        let header = Paragraph::new(self.summary_line())
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, layout[0]);

        let middle = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(layout[1]);
        Self::render_overview(stats, frame, middle[0]);
        Self::render_users(stats, frame, middle[1]);

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(layout[2]);
        Self::render_top("Top CPU", &stats.top_cpu, |p| format!("{:.2}%", p.cpu), frame, bottom[0]);
        Self::render_top(
            "Top Memory",
            &stats.top_memory,
            |p| format!("{:.2}% {}", p.memory, p.memory_display()),
            frame,
            bottom[1],
        );
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
