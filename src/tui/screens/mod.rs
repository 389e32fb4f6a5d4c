//! View models, one per [`Mode`]

use std::any::Any;

use ratatui::{layout::Rect, Frame};

use super::event::{AppEvent, Mode};
use super::tasks::Task;
use crate::config::AppConfig;
use crate::shortcuts::Context;

// Screen-local rendering helpers using ratatui standard components
mod render_helpers;

pub use render_helpers::truncate;

pub mod details;
pub mod help;
pub mod process_list;
pub mod settings;
pub mod stats;

pub use details::DetailsScreen;
pub use help::{HelpContent, HelpScreen};
pub use process_list::ProcessListScreen;
pub use settings::SettingsScreen;
pub use stats::StatsScreen;

/// Navigation requested by a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenAction {
    #[default]
    None,
    SwitchTo(Mode),
    /// Return to the process list.
    Back,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Transient line shown in the footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            level: StatusLevel::Error,
        }
    }
}

/// Outcome of feeding one event to a screen.
#[derive(Debug, Default)]
pub struct Transition {
    pub tasks: Vec<Task>,
    pub action: ScreenAction,
    pub status: Option<StatusMessage>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks,
            ..Self::default()
        }
    }

    pub fn action(action: ScreenAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: StatusMessage) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }
}

/// Request ids of one screen's snapshot refreshes.
///
/// Any result newer than the last one applied is accepted, so a provider
/// slower than the refresh timer still updates the view.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshTracker {
    issued: u64,
    applied: u64,
}

impl RefreshTracker {
    /// Id for a new refresh request.
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    pub fn latest(&self) -> u64 {
        self.issued
    }

    /// A request newer than the applied result is still outstanding.
    pub fn in_flight(&self) -> bool {
        self.applied < self.issued
    }

    /// Record an arriving result. False when it is no newer than the
    /// result already applied, or was never issued.
    pub fn accept(&mut self, request: u64) -> bool {
        if request <= self.applied || request > self.issued {
            return false;
        }
        self.applied = request;
        true
    }
}

/// Trait for all TUI screens
pub trait Screen: Any {
    fn mode(&self) -> Mode;

    /// Work to start when the screen becomes active.
    fn init(&mut self) -> Vec<Task>;

    /// React to input, a dispatched action or a background result.
    fn update(&mut self, event: &AppEvent) -> Transition;

    fn render(&mut self, frame: &mut Frame, area: Rect);

    fn resize(&mut self, _width: u16, _height: u16) {}

    /// Shortcut context while the screen captures text input.
    fn input_context(&self) -> Option<Context> {
        None
    }

    fn selected_pid(&self) -> Option<u32> {
        None
    }

    fn focus(&mut self, _pid: Option<u32>) {}

    /// Settings were saved; pick up whatever applies to this screen.
    fn configure(&mut self, _config: &AppConfig) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}
