//! Settings screen
//!
//! Edits a draft of the application config. Loading and saving go through
//! background tasks; nothing touches disk on the event loop.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::render_helpers::{detail_line, render_notice};
use super::{Screen, StatusMessage, Transition};
use crate::config::AppConfig;
use crate::tui::event::{AppEvent, Mode, ViewAction};
use crate::tui::tasks::Task;

pub struct SettingsScreen {
    /// Last config read from or written to disk.
    saved: Option<AppConfig>,
    draft: AppConfig,
    loading: bool,
    saving: bool,
    preset: String,
}

impl SettingsScreen {
    pub fn new(config: &AppConfig, preset: impl Into<String>) -> Self {
        Self {
            saved: None,
            draft: config.clone(),
            loading: false,
            saving: false,
            preset: preset.into(),
        }
    }

    pub fn draft(&self) -> &AppConfig {
        &self.draft
    }

    pub fn is_dirty(&self) -> bool {
        self.saved.as_ref().is_some_and(|saved| *saved != self.draft)
    }

    pub fn set_preset(&mut self, preset: impl Into<String>) {
        self.preset = preset.into();
    }

    fn handle_key(&mut self, key: &KeyEvent) -> Transition {
        if self.loading {
            return Transition::none();
        }
        let draft = &mut self.draft;
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => draft.step_refresh_interval(1),
            KeyCode::Char('-') | KeyCode::Char('_') => draft.step_refresh_interval(-1),
            KeyCode::Char('s') => draft.show_system = !draft.show_system,
            KeyCode::Char('o') => draft.default_sort.field = draft.default_sort.field.next(),
            KeyCode::Char('d') => draft.default_sort.order = draft.default_sort.order.flipped(),
            KeyCode::Char('a') => draft.auto_refresh = !draft.auto_refresh,
            KeyCode::Char('t') => draft.cycle_theme(),
            _ => return Transition::none(),
        }
        Transition::none()
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let draft = &self.draft;
        let on_off = |flag: bool| if flag { "on" } else { "off" }.to_string();
        vec![
            detail_line("Refresh", format!("{}s   [+/-]", draft.refresh_interval)),
            detail_line("System procs", format!("{}   [s]", on_off(draft.show_system))),
            detail_line(
                "Default sort",
                format!(
                    "{} {}   [o] field  [d] order",
                    draft.default_sort.field, draft.default_sort.order.arrow()
                ),
            ),
            detail_line("Auto refresh", format!("{}   [a]", on_off(draft.auto_refresh))),
            detail_line("Theme", format!("{}   [t]", draft.theme)),
            detail_line("Data dir", draft.data_dir.clone()),
            detail_line("Shortcuts", format!("{} preset   [p] next", self.preset)),
        ]
    }
}

impl Screen for SettingsScreen {
    fn mode(&self) -> Mode {
        Mode::Settings
    }

    fn init(&mut self) -> Vec<Task> {
        // A save answered while another view was active never reaches us.
        self.saving = false;
        self.loading = true;
        vec![Task::LoadConfig {
            origin: Mode::Settings,
        }]
    }

    fn update(&mut self, event: &AppEvent) -> Transition {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Action(ViewAction::SaveSettings) => {
                if self.saving {
                    return Transition::none();
                }
                self.saving = true;
                Transition::tasks(vec![Task::SaveConfig {
                    origin: Mode::Settings,
                    config: self.draft.clone(),
                }])
                .with_status(StatusMessage::info("Saving settings…"))
            }
            AppEvent::Action(ViewAction::ReloadSettings) | AppEvent::Action(ViewAction::Refresh) => {
                Transition::tasks(self.init()).with_status(StatusMessage::info("Reloading settings…"))
            }
            AppEvent::ConfigLoaded { result, .. } => {
                self.loading = false;
                match result {
                    Ok(config) => {
                        self.saved = Some(config.clone());
                        self.draft = config.clone();
                        Transition::none()
                    }
                    Err(err) => Transition::none()
                        .with_status(StatusMessage::error(format!("Could not load settings: {err}"))),
                }
            }
            AppEvent::ConfigSaved { result, .. } => {
                self.saving = false;
                match result {
                    Ok(config) => {
                        self.saved = Some(config.clone());
                        self.draft = config.clone();
                        Transition::none().with_status(StatusMessage::info("Settings saved"))
                    }
                    Err(err) => Transition::none()
                        .with_status(StatusMessage::error(format!("Could not save settings: {err}"))),
                }
            }
            _ => Transition::none(),
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if self.loading && self.saved.is_none() {
            render_notice(frame, area, "Settings", "Loading settings…");
            return;
        }

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(9), Constraint::Length(3)])
            .split(area);

        let title = if self.is_dirty() {
            "Settings (unsaved)"
        } else {
            "Settings"
        };
        let settings = Paragraph::new(self.lines())
            .block(Block::default().borders(Borders::ALL).title(title));
        frame.render_widget(settings, layout[0]);

        let hint = Line::from(vec![
            Span::styled("Ctrl+s", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" save   "),
            Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(" reload from disk"),
        ]);
        let footer = Paragraph::new(hint)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, layout[1]);
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
    use crate::core::query::{SortField, SortOrder};
    use crossterm::event::KeyModifiers;

    fn key(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    fn loaded_screen() -> SettingsScreen {
        let mut screen = SettingsScreen::new(&AppConfig::default(), "default");
        let tasks = screen.init();
        assert!(matches!(tasks[..], [Task::LoadConfig { origin: Mode::Settings }]));
        screen.update(&AppEvent::ConfigLoaded {
            origin: Mode::Settings,
            result: Ok(AppConfig::default()),
        });
        screen
    }

    #[test]
    fn edits_mark_draft_dirty() {
        let mut screen = loaded_screen();
        assert!(!screen.is_dirty());

        for c in ['+', '+', 's', 'o', 'd', 'a', 't'] {
            screen.update(&key(c));
        }
        let draft = screen.draft();
        assert_eq!(draft.refresh_interval, 4);
        assert!(draft.show_system);
        assert_eq!(draft.default_sort.field, SortField::Cpu.next());
        assert_eq!(draft.default_sort.order, SortOrder::Asc);
        assert!(!draft.auto_refresh);
        assert_eq!(draft.theme, "dark");
        assert!(screen.is_dirty());
    }

    #[test]
    fn save_round_trip_clears_dirty_flag() {
        let mut screen = loaded_screen();
        screen.update(&key('-'));
        let transition = screen.update(&AppEvent::Action(ViewAction::SaveSettings));
        let Task::SaveConfig { config, .. } = &transition.tasks[0] else {
            panic!("expected save task");
        };
        assert_eq!(config.refresh_interval, 1);

        let saved = config.clone();
        screen.update(&AppEvent::ConfigSaved {
            origin: Mode::Settings,
            result: Ok(saved),
        });
        assert!(!screen.is_dirty());
    }

    #[test]
    fn reentering_after_an_unanswered_save_allows_saving_again() {
        let mut screen = loaded_screen();
        let first = screen.update(&AppEvent::Action(ViewAction::SaveSettings));
        assert_eq!(first.tasks.len(), 1);
        assert!(screen
            .update(&AppEvent::Action(ViewAction::SaveSettings))
            .tasks
            .is_empty());

        screen.init();
        screen.update(&AppEvent::ConfigLoaded {
            origin: Mode::Settings,
            result: Ok(AppConfig::default()),
        });
        let again = screen.update(&AppEvent::Action(ViewAction::SaveSettings));
        assert!(matches!(again.tasks[..], [Task::SaveConfig { .. }]));
    }

    #[test]
    fn load_failure_keeps_defaults() {
        let mut screen = SettingsScreen::new(&AppConfig::default(), "default");
        screen.init();
        let transition = screen.update(&AppEvent::ConfigLoaded {
            origin: Mode::Settings,
            result: Err("bad yaml".into()),
        });
        assert!(transition.status.unwrap().text.contains("bad yaml"));
        assert_eq!(screen.draft().refresh_interval, 2);
    }
}
