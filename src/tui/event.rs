//! Events flowing into the controller and the commands shortcuts resolve to

use std::fmt;
use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::config::AppConfig;
use crate::core::models::ProcessInfo;
use crate::core::query::SortField;
use crate::shortcuts::{ActionTable, Context};
use crate::storage::ExportFormat;

/// Top-level view. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    ProcessList,
    Details,
    Stats,
    Settings,
    Help,
}

impl Mode {
    pub const ALL: [Mode; 5] = [
        Mode::ProcessList,
        Mode::Details,
        Mode::Stats,
        Mode::Settings,
        Mode::Help,
    ];

    /// Shortcut context active while this mode is shown.
    pub fn context(self) -> Context {
        match self {
            Mode::ProcessList => Context::Processes,
            Mode::Details => Context::Details,
            Mode::Stats => Context::Stats,
            Mode::Settings => Context::Settings,
            Mode::Help => Context::Help,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::ProcessList => write!(f, "Processes"),
            Mode::Details => write!(f, "Process Details"),
            Mode::Stats => write!(f, "Statistics"),
            Mode::Settings => write!(f, "Settings"),
            Mode::Help => write!(f, "Help"),
        }
    }
}

/// Everything the controller reacts to.
///
/// Results of background work carry the mode that requested them so the
/// controller can drop results that arrive after the user moved on.
#[derive(Debug, Clone)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    /// A dispatched shortcut aimed at the active view.
    Action(ViewAction),
    TimerFired {
        origin: Mode,
    },
    ProcessesLoaded {
        origin: Mode,
        request: u64,
        result: Result<Vec<ProcessInfo>, String>,
    },
    KillFinished {
        origin: Mode,
        pid: u32,
        force: bool,
        result: Result<(), String>,
    },
    /// An export, backup or report finished writing.
    FileWritten {
        origin: Mode,
        label: &'static str,
        result: Result<PathBuf, String>,
    },
    ConfigLoaded {
        origin: Mode,
        result: Result<AppConfig, String>,
    },
    ConfigSaved {
        origin: Mode,
        result: Result<AppConfig, String>,
    },
}

impl AppEvent {
    /// Requesting mode for background results; `None` for input events.
    pub fn origin(&self) -> Option<Mode> {
        match self {
            AppEvent::Key(_) | AppEvent::Resize { .. } | AppEvent::Action(_) => None,
            AppEvent::TimerFired { origin }
            | AppEvent::ProcessesLoaded { origin, .. }
            | AppEvent::KillFinished { origin, .. }
            | AppEvent::FileWritten { origin, .. }
            | AppEvent::ConfigLoaded { origin, .. }
            | AppEvent::ConfigSaved { origin, .. } => Some(*origin),
        }
    }
}

/// What a shortcut resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ShowHelp,
    /// Back to the process list.
    Escape,
    Refresh,
    SwitchMode(Mode),
    CyclePreset,
    View(ViewAction),
}

/// View-local commands; views ignore the ones that do not apply to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
    Refresh,
    Kill { force: bool },
    Export(ExportFormat),
    Backup,
    OpenSearch,
    OpenFilter,
    ClearFilters,
    ToggleSystem,
    SortBy(SortField),
    ResetSort,
    SubmitInput,
    CancelInput,
    SaveSettings,
    ReloadSettings,
    ExportStats,
    ToggleConflicts,
}

/// Action ids used by the compiled-in bindings and their commands.
pub fn builtin_actions() -> ActionTable<Command> {
    ActionTable::<Command>::new()
        .with("quit", || Command::Quit)
        .with("help", || Command::ShowHelp)
        .with("cancel", || Command::Escape)
        .with("refresh", || Command::Refresh)
        .with("view_processes", || Command::SwitchMode(Mode::ProcessList))
        .with("view_details", || Command::SwitchMode(Mode::Details))
        .with("view_stats", || Command::SwitchMode(Mode::Stats))
        .with("view_settings", || Command::SwitchMode(Mode::Settings))
        .with("open_details", || Command::SwitchMode(Mode::Details))
        .with("next_preset", || Command::CyclePreset)
        .with("kill_process", || Command::View(ViewAction::Kill { force: false }))
        .with("force_kill_process", || Command::View(ViewAction::Kill { force: true }))
        .with("export_json", || Command::View(ViewAction::Export(ExportFormat::Json)))
        .with("export_csv", || Command::View(ViewAction::Export(ExportFormat::Csv)))
        .with("backup", || Command::View(ViewAction::Backup))
        .with("search", || Command::View(ViewAction::OpenSearch))
        .with("advanced_filter", || Command::View(ViewAction::OpenFilter))
        .with("clear_filters", || Command::View(ViewAction::ClearFilters))
        .with("toggle_system", || Command::View(ViewAction::ToggleSystem))
        .with("sort_cpu", || Command::View(ViewAction::SortBy(SortField::Cpu)))
        .with("sort_memory", || Command::View(ViewAction::SortBy(SortField::Memory)))
        .with("sort_name", || Command::View(ViewAction::SortBy(SortField::Name)))
        .with("sort_pid", || Command::View(ViewAction::SortBy(SortField::Pid)))
        .with("sort_status", || Command::View(ViewAction::SortBy(SortField::Status)))
        .with("sort_user", || Command::View(ViewAction::SortBy(SortField::User)))
        .with("sort_threads", || Command::View(ViewAction::SortBy(SortField::Threads)))
        .with("sort_nice", || Command::View(ViewAction::SortBy(SortField::Nice)))
        .with("reset_sort", || Command::View(ViewAction::ResetSort))
        .with("apply_input", || Command::View(ViewAction::SubmitInput))
        .with("cancel_input", || Command::View(ViewAction::CancelInput))
        .with("save_settings", || Command::View(ViewAction::SaveSettings))
        .with("reload_settings", || Command::View(ViewAction::ReloadSettings))
        .with("export_stats", || Command::View(ViewAction::ExportStats))
        .with("toggle_conflicts", || Command::View(ViewAction::ToggleConflicts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcuts::defaults::DEFAULT_BINDINGS;

    #[test]
    fn every_default_binding_has_a_command() {
        let actions = builtin_actions();
        for (id, _, action, _, _) in DEFAULT_BINDINGS {
            assert!(actions.contains(action), "{id} uses unmapped action {action}");
        }
    }

    #[test]
    fn origin_is_only_set_for_background_results() {
        assert_eq!(
            AppEvent::TimerFired {
                origin: Mode::Stats
            }
            .origin(),
            Some(Mode::Stats)
        );
        assert_eq!(AppEvent::Action(ViewAction::Refresh).origin(), None);
    }
}
