//! Terminal UI
//!
//! [`App`] is the controller: it owns one screen per [`Mode`], turns key
//! events into commands through the shortcut manager and hands the
//! resulting [`Task`]s back to the event loop in [`app`].

use std::any::Any;
use std::collections::HashMap;
use std::time::Instant;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::debug;

pub mod app;
pub mod event;
pub mod screens;
pub mod tasks;

pub use event::{builtin_actions, AppEvent, Command, Mode, ViewAction};
pub use screens::{Screen, ScreenAction, StatusLevel, StatusMessage, Transition};
pub use tasks::{Task, TaskRunner};

use crate::common::constants::{duration::FLASH_DURATION, layout};
use crate::config::AppConfig;
use crate::shortcuts::help::quick_reference;
use crate::shortcuts::{ActionTable, ShortcutManager};
use screens::{
    DetailsScreen, HelpContent, HelpScreen, ProcessListScreen, SettingsScreen, StatsScreen,
};

pub struct App {
    mode: Mode,
    screens: HashMap<Mode, Box<dyn Screen>>,
    shortcuts: ShortcutManager,
    actions: ActionTable<Command>,
    config: AppConfig,
    status: Option<(StatusMessage, Instant)>,
    should_quit: bool,
    size: (u16, u16),
}

impl App {
    pub fn new(config: AppConfig, shortcuts: ShortcutManager) -> Self {
        let mut screens: HashMap<Mode, Box<dyn Screen>> = HashMap::new();
        screens.insert(Mode::ProcessList, Box::new(ProcessListScreen::new(&config)));
        screens.insert(Mode::Details, Box::new(DetailsScreen::new(&config)));
        screens.insert(Mode::Stats, Box::new(StatsScreen::new(&config)));
        screens.insert(
            Mode::Settings,
            Box::new(SettingsScreen::new(&config, shortcuts.active_preset())),
        );
        screens.insert(
            Mode::Help,
            Box::new(HelpScreen::new(HelpContent::from_manager(&shortcuts))),
        );

        Self {
            mode: Mode::ProcessList,
            screens,
            shortcuts,
            actions: builtin_actions(),
            config,
            status: None,
            should_quit: false,
            size: (layout::MIN_WIDTH, layout::MIN_HEIGHT),
        }
    }

    /// Tasks for the initial view.
    pub fn start(&mut self) -> Vec<Task> {
        self.shortcuts.set_context(self.mode.context());
        self.screens
            .get_mut(&self.mode)
            .map(|screen| screen.init())
            .unwrap_or_default()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn shortcuts(&self) -> &ShortcutManager {
        &self.shortcuts
    }

    /// Last known terminal size.
    pub fn size(&self) -> (u16, u16) {
        self.size
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref().map(|(status, _)| status)
    }

    /// Concrete view of type `T`, for inspection.
    pub fn screen_as<T: Any>(&self) -> Option<&T> {
        self.screens
            .values()
            .find_map(|screen| screen.as_any().downcast_ref::<T>())
    }

    pub fn screen_as_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.screens
            .values_mut()
            .find_map(|screen| screen.as_any_mut().downcast_mut::<T>())
    }

    /// Expire the status line.
    pub fn tick(&mut self) {
        if self
            .status
            .as_ref()
            .is_some_and(|(_, shown)| shown.elapsed() >= FLASH_DURATION)
        {
            self.status = None;
        }
    }

    /// Feed one event and return the work it produced.
    pub fn handle_event(&mut self, event: AppEvent) -> Vec<Task> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize { width, height } => {
                self.size = (width, height);
                for screen in self.screens.values_mut() {
                    screen.resize(width, height);
                }
                Vec::new()
            }
            other => {
                // Saved settings apply everywhere, even if the user left
                // the settings view before the write finished.
                if let AppEvent::ConfigSaved {
                    result: Ok(config), ..
                } = &other
                {
                    self.apply_config(config.clone());
                }
                if let Some(origin) = other.origin() {
                    if origin != self.mode {
                        debug!(%origin, active = %self.mode, "dropping result for inactive view");
                        return Vec::new();
                    }
                }
                self.dispatch(&other)
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Task> {
        let context = self
            .screens
            .get(&self.mode)
            .and_then(|screen| screen.input_context())
            .unwrap_or_else(|| self.mode.context());
        self.shortcuts.set_context(context);

        match self.shortcuts.handle_key(&key, &self.actions) {
            Some(command) => self.execute(command),
            None => self.dispatch(&AppEvent::Key(key)),
        }
    }

    fn execute(&mut self, command: Command) -> Vec<Task> {
        debug!(?command, mode = %self.mode, "executing command");
        match command {
            Command::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Command::ShowHelp => self.switch_mode(Mode::Help),
            Command::Escape => {
                if self.mode == Mode::ProcessList {
                    Vec::new()
                } else {
                    self.switch_mode(Mode::ProcessList)
                }
            }
            Command::Refresh => self.dispatch(&AppEvent::Action(ViewAction::Refresh)),
            Command::SwitchMode(mode) => self.switch_mode(mode),
            Command::CyclePreset => self.cycle_preset(),
            Command::View(action) => self.dispatch(&AppEvent::Action(action)),
        }
    }

    fn cycle_preset(&mut self) -> Vec<Task> {
        match self.shortcuts.cycle_preset() {
            Ok(name) => {
                self.shortcuts.set_context(self.mode.context());
                self.sync_shortcut_views();
                self.set_status(StatusMessage::info(format!("Shortcut preset: {name}")));
                vec![Task::SaveShortcuts {
                    config: self.shortcuts.export_config(),
                }]
            }
            Err(err) => {
                self.set_status(StatusMessage::error(err.to_string()));
                Vec::new()
            }
        }
    }

    /// Feed an event to the active screen and apply its transition.
    fn dispatch(&mut self, event: &AppEvent) -> Vec<Task> {
        let Some(screen) = self.screens.get_mut(&self.mode) else {
            return Vec::new();
        };
        let Transition {
            mut tasks,
            action,
            status,
        } = screen.update(event);

        if let Some(status) = status {
            self.set_status(status);
        }
        match action {
            ScreenAction::None => {}
            ScreenAction::SwitchTo(mode) => tasks.extend(self.switch_mode(mode)),
            ScreenAction::Back => tasks.extend(self.execute(Command::Escape)),
            ScreenAction::Quit => self.should_quit = true,
        }
        tasks
    }

    /// Leave the current mode for `target`. Switching to the active mode
    /// does nothing.
    pub fn switch_mode(&mut self, target: Mode) -> Vec<Task> {
        if target == self.mode {
            return Vec::new();
        }
        debug!(from = %self.mode, to = %target, "switching mode");

        let mut tasks = vec![Task::Cancel(self.mode)];
        let selected = self
            .screens
            .get(&Mode::ProcessList)
            .and_then(|screen| screen.selected_pid());

        self.mode = target;
        self.shortcuts.set_context(target.context());
        if target == Mode::Help {
            self.sync_shortcut_views();
        }
        if let Some(screen) = self.screens.get_mut(&target) {
            if target == Mode::Details {
                screen.focus(selected);
            }
            tasks.extend(screen.init());
        }
        tasks
    }

    fn apply_config(&mut self, config: AppConfig) {
        for screen in self.screens.values_mut() {
            screen.configure(&config);
        }
        self.config = config;
    }

    fn sync_shortcut_views(&mut self) {
        let content = HelpContent::from_manager(&self.shortcuts);
        let preset = self.shortcuts.active_preset().to_string();
        if let Some(help) = self.screen_as_mut::<HelpScreen>() {
            help.set_content(content);
        }
        if let Some(settings) = self.screen_as_mut::<SettingsScreen>() {
            settings.set_preset(preset);
        }
    }

    fn set_status(&mut self, status: StatusMessage) {
        self.status = Some((status, Instant::now()));
    }

    fn accent(&self) -> Color {
        match self.config.theme.as_str() {
            "dark" => Color::Blue,
            "light" => Color::Black,
            "high-contrast" => Color::Yellow,
            _ => Color::Cyan,
        }
    }

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.size();
        if area.width < layout::MIN_WIDTH || area.height < layout::MIN_HEIGHT {
            self.render_too_small(frame, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area);

        self.render_title_bar(frame, chunks[0]);
        if let Some(screen) = self.screens.get_mut(&self.mode) {
            screen.render(frame, chunks[1]);
        }
        self.render_footer(frame, chunks[2]);
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let tabs: Vec<Span> = [Mode::ProcessList, Mode::Details, Mode::Stats, Mode::Settings]
            .iter()
            .enumerate()
            .flat_map(|(idx, mode)| {
                let style = if *mode == self.mode {
                    Style::default()
                        .fg(self.accent())
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };
                [
                    Span::styled(format!(" {}:{} ", idx + 1, mode), style),
                    Span::raw(" "),
                ]
            })
            .collect();

        let title = Paragraph::new(Line::from(tabs)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    format!("tpm - {}", self.mode),
                    Style::default().fg(self.accent()).add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(title, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let line = match self.status() {
            Some(status) => {
                let color = match status.level {
                    StatusLevel::Info => Color::Green,
                    StatusLevel::Error => Color::Red,
                };
                Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
            }
            None => Line::from(Span::styled(
                quick_reference(&self.shortcuts),
                Style::default().fg(Color::White),
            )),
        };

        let footer = Paragraph::new(line)
            .style(Style::default().bg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        frame.render_widget(footer, area);
    }

    fn render_too_small(&self, frame: &mut Frame, area: Rect) {
        let message = format!(
            "Terminal too small: {}x{} (need at least {}x{})",
            area.width,
            area.height,
            layout::MIN_WIDTH,
            layout::MIN_HEIGHT
        );
        let notice = Paragraph::new(message)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true });
        frame.render_widget(notice, area);
    }
}
