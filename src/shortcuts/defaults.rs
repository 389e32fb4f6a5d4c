//! Compiled-in shortcut set and the named presets layered on top of it

use super::Context;

/// `(id, key binding, action, description, context)`
pub type DefaultBinding = (&'static str, &'static str, &'static str, &'static str, Context);

pub const DEFAULT_BINDINGS: &[DefaultBinding] = &[
    // Global
    ("global_quit", "q", "quit", "Quit application", Context::Global),
    ("global_quit_ctrl", "ctrl+q", "quit", "Quit application", Context::Global),
    ("global_quit_interrupt", "ctrl+c", "quit", "Quit application", Context::Global),
    ("global_help", "f1", "help", "Show help", Context::Global),
    ("global_help_alt", "?", "help", "Show help", Context::Global),
    ("global_help_ctrl", "ctrl+h", "help", "Show help", Context::Global),
    ("global_cancel", "esc", "cancel", "Back to the process list", Context::Global),
    ("global_refresh", "ctrl+r", "refresh", "Refresh current view", Context::Global),
    ("nav_processes", "1", "view_processes", "Process list", Context::Global),
    ("nav_details", "2", "view_details", "Process details", Context::Global),
    ("nav_stats", "3", "view_stats", "Statistics", Context::Global),
    ("nav_settings", "4", "view_settings", "Settings", Context::Global),
    ("nav_processes_ctrl", "ctrl+p", "view_processes", "Process list", Context::Global),
    ("nav_details_ctrl", "ctrl+d", "view_details", "Process details", Context::Global),
    ("nav_stats_ctrl", "ctrl+t", "view_stats", "Statistics", Context::Global),
    ("nav_settings_ctrl", "ctrl+,", "view_settings", "Settings", Context::Global),
    // Process list
    ("process_open", "enter", "open_details", "Open details for selection", Context::Processes),
    ("process_kill", "ctrl+k", "kill_process", "Terminate selected process", Context::Processes),
    ("process_kill_delete", "delete", "kill_process", "Terminate selected process", Context::Processes),
    ("process_force_kill", "shift+k", "force_kill_process", "Force kill selected process", Context::Processes),
    ("process_export", "ctrl+e", "export_json", "Export snapshot as JSON", Context::Processes),
    ("process_export_csv", "alt+e", "export_csv", "Export snapshot as CSV", Context::Processes),
    ("process_backup", "ctrl+b", "backup", "Back up current snapshot", Context::Processes),
    ("filter_search", "/", "search", "Search processes", Context::Processes),
    ("filter_search_ctrl", "ctrl+f", "search", "Search processes", Context::Processes),
    ("filter_advanced", "shift+f", "advanced_filter", "Advanced filter", Context::Processes),
    ("filter_clear", "ctrl+l", "clear_filters", "Clear search and filters", Context::Processes),
    ("filter_toggle_system", "s", "toggle_system", "Show/hide system processes", Context::Processes),
    ("sort_cpu", "c", "sort_cpu", "Sort by CPU", Context::Processes),
    ("sort_memory", "m", "sort_memory", "Sort by memory", Context::Processes),
    ("sort_name", "n", "sort_name", "Sort by name", Context::Processes),
    ("sort_pid", "p", "sort_pid", "Sort by PID", Context::Processes),
    ("sort_status", "t", "sort_status", "Sort by status", Context::Processes),
    ("sort_user", "u", "sort_user", "Sort by user", Context::Processes),
    ("sort_threads", "shift+t", "sort_threads", "Sort by thread count", Context::Processes),
    ("sort_nice", "shift+n", "sort_nice", "Sort by nice value", Context::Processes),
    ("sort_reset", "shift+s", "reset_sort", "Reset sort order", Context::Processes),
    // Details
    ("details_kill", "ctrl+k", "kill_process", "Terminate this process", Context::Details),
    ("details_force_kill", "shift+k", "force_kill_process", "Force kill this process", Context::Details),
    // Statistics
    ("stats_export", "ctrl+e", "export_stats", "Export statistics report", Context::Stats),
    // Settings
    ("settings_save", "ctrl+s", "save_settings", "Save settings", Context::Settings),
    ("settings_reload", "r", "reload_settings", "Reload settings from disk", Context::Settings),
    ("settings_preset", "p", "next_preset", "Switch shortcut preset", Context::Settings),
    // Help
    ("help_conflicts", "c", "toggle_conflicts", "Show shortcut conflicts", Context::Help),
    // Text entry
    ("search_apply", "enter", "apply_input", "Apply search", Context::Search),
    ("search_cancel", "esc", "cancel_input", "Cancel search", Context::Search),
    ("filter_apply", "enter", "apply_input", "Apply filter", Context::Filter),
    ("filter_cancel", "esc", "cancel_input", "Cancel filter", Context::Filter),
];

pub const DEFAULT_PRESET: &str = "default";

/// `(preset, [(shortcut id, key binding)])`. Presets only override keys; any id
/// not listed keeps its default key.
pub const PRESETS: &[(&str, &[(&str, &str)])] = &[
    (DEFAULT_PRESET, &[]),
    (
        "vim",
        &[
            ("process_kill", "d"),
            ("process_force_kill", "shift+d"),
            ("nav_details", "i"),
            ("settings_save", "w"),
        ],
    ),
    (
        "emacs",
        &[
            ("global_quit_ctrl", "ctrl+x"),
            ("global_help_ctrl", "ctrl+h"),
            ("filter_search_ctrl", "ctrl+s"),
            ("filter_clear", "ctrl+g"),
            ("settings_save", "ctrl+w"),
        ],
    ),
];

pub fn default_binding(id: &str) -> Option<&'static DefaultBinding> {
    DEFAULT_BINDINGS.iter().find(|binding| binding.0 == id)
}
