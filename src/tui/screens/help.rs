//! Help screen
//!
//! Renders the live shortcut set, so rebinding or switching presets is
//! reflected immediately.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render_helpers::section_title;
use super::{Screen, Transition};
use crate::shortcuts::help::{conflicts_help, sections, HelpSection};
use crate::shortcuts::{Context, ShortcutManager};
use crate::tui::event::{AppEvent, Mode, ViewAction};
use crate::tui::tasks::Task;

/// Snapshot of what the help screen shows.
#[derive(Debug, Clone, Default)]
pub struct HelpContent {
    pub preset: String,
    pub sections: Vec<HelpSection>,
    pub conflicts: String,
    pub conflict_count: usize,
}

impl HelpContent {
    pub fn from_manager(manager: &ShortcutManager) -> Self {
        Self {
            preset: manager.active_preset().to_string(),
            sections: sections(manager),
            conflicts: conflicts_help(manager),
            conflict_count: manager.conflicts().len(),
        }
    }
}

pub struct HelpScreen {
    content: HelpContent,
    show_conflicts: bool,
    scroll: usize,
    viewport: usize,
}

impl HelpScreen {
    pub fn new(content: HelpContent) -> Self {
        Self {
            content,
            show_conflicts: false,
            scroll: 0,
            viewport: 10,
        }
    }

    pub fn set_content(&mut self, content: HelpContent) {
        self.content = content;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn content(&self) -> &HelpContent {
        &self.content
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn showing_conflicts(&self) -> bool {
        self.show_conflicts
    }

    fn lines(&self) -> Vec<Line<'static>> {
        if self.show_conflicts {
            return self
                .content
                .conflicts
                .lines()
                .map(|line| Line::from(line.to_string()))
                .collect();
        }

        let mut lines = Vec::new();
        for section in &self.content.sections {
            lines.push(section_title(&section.title));
            for entry in &section.entries {
                let mut spans = vec![
                    Span::styled(
                        format!("  {:<22}", entry.key),
                        Style::default().fg(Color::Cyan),
                    ),
                    Span::raw(entry.description.clone()),
                ];
                if entry.context != Context::Global {
                    spans.push(Span::styled(
                        format!("  [{}]", entry.context),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                lines.push(Line::from(spans));
            }
            lines.push(Line::from(""));
        }
        lines
    }

    fn max_scroll(&self) -> usize {
        self.lines().len().saturating_sub(self.viewport)
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.max_scroll();
        self.scroll = self.scroll.saturating_add_signed(delta).min(max);
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        let page = self.viewport.max(1) as isize;
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::PageDown => self.scroll_by(page),
            KeyCode::Home | KeyCode::Char('g') => self.scroll = 0,
            KeyCode::End | KeyCode::Char('G') => self.scroll = self.max_scroll(),
            _ => {}
        }
    }
}

impl Screen for HelpScreen {
    fn mode(&self) -> Mode {
        Mode::Help
    }

    fn init(&mut self) -> Vec<Task> {
        self.scroll = 0;
        Vec::new()
    }

    fn update(&mut self, event: &AppEvent) -> Transition {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Action(ViewAction::ToggleConflicts) => {
                self.show_conflicts = !self.show_conflicts;
                self.scroll = 0;
            }
            _ => {}
        }
        Transition::none()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        self.viewport = layout[0].height.saturating_sub(2) as usize;
        self.scroll = self.scroll.min(self.max_scroll());

        let title = if self.show_conflicts {
            format!("Shortcut Conflicts ({})", self.content.conflict_count)
        } else {
            format!("Keyboard Shortcuts - {} preset", self.content.preset)
        };
        let body = Paragraph::new(self.lines())
            .scroll((self.scroll as u16, 0))
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(body, layout[0]);

        let hint = Line::from(vec![
            Span::styled("↑/↓", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" scroll  "),
            Span::styled("c", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" toggle conflicts  "),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" back"),
        ]);
        frame.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::Gray)),
            layout[1],
        );
    }

    fn resize(&mut self, _width: u16, height: u16) {
        self.viewport = height.saturating_sub(6) as usize;
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
