//! Help text built from the live shortcut set

use std::collections::BTreeMap;
use std::fmt::Write;

use super::{Context, ShortcutManager};

/// Display order of help categories.
pub const CATEGORIES: [&str; 9] = [
    "Navigation",
    "Process Management",
    "Sorting & Filtering",
    "Search",
    "Data Management",
    "Help & Information",
    "Refresh",
    "Application Control",
    "Other",
];

/// Category an action id belongs to, derived from its name.
pub fn category_for_action(action: &str) -> &'static str {
    let has = |needle: &str| action.contains(needle);
    if has("input") || has("search") {
        "Search"
    } else if has("view_") || has("open_") || has("select") {
        "Navigation"
    } else if has("kill") || has("process") {
        "Process Management"
    } else if has("sort") || has("filter") || has("system") {
        "Sorting & Filtering"
    } else if has("export") || has("backup") || has("import") || has("save") || has("reload") {
        "Data Management"
    } else if has("help") || has("conflict") {
        "Help & Information"
    } else if has("refresh") {
        "Refresh"
    } else if has("quit") || has("cancel") || has("preset") {
        "Application Control"
    } else {
        "Other"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpEntry {
    pub key: String,
    pub description: String,
    pub context: Context,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSection {
    pub title: String,
    pub entries: Vec<HelpEntry>,
}

/// Enabled shortcuts grouped by category; keys bound to the same action in
/// the same context are merged ("q / Ctrl+q").
pub fn sections(manager: &ShortcutManager) -> Vec<HelpSection> {
    let mut grouped: BTreeMap<usize, BTreeMap<(Context, String), HelpEntry>> = BTreeMap::new();

    for context in Context::ALL {
        for shortcut in manager.shortcuts_for_context(context) {
            if !shortcut.enabled {
                continue;
            }
            let category = category_for_action(&shortcut.action);
            let order = CATEGORIES
                .iter()
                .position(|name| *name == category)
                .unwrap_or(CATEGORIES.len() - 1);
            let entry = grouped
                .entry(order)
                .or_default()
                .entry((context, shortcut.action.clone()))
                .or_insert_with(|| HelpEntry {
                    key: String::new(),
                    description: shortcut.description.clone(),
                    context,
                });
            if !entry.key.is_empty() {
                entry.key.push_str(" / ");
            }
            entry.key.push_str(&shortcut.key.to_string());
        }
    }

    grouped
        .into_iter()
        .map(|(order, entries)| HelpSection {
            title: CATEGORIES[order].to_string(),
            entries: entries.into_values().collect(),
        })
        .collect()
}

pub fn generate_help(manager: &ShortcutManager) -> String {
    let mut out = String::from("TPM Keyboard Shortcuts\n======================\n");
    let _ = writeln!(out, "Preset: {}\n", manager.active_preset());

    for section in sections(manager) {
        let _ = writeln!(out, "{}", section.title);
        for entry in &section.entries {
            let _ = write!(out, "  {:<20} {}", entry.key, entry.description);
            if entry.context != Context::Global {
                let _ = write!(out, " [{}]", entry.context);
            }
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

pub fn context_help(manager: &ShortcutManager, context: Context) -> String {
    let mut out = format!("{context} shortcuts\n");
    let shortcuts = manager.shortcuts_for_context(context);
    if shortcuts.iter().all(|s| !s.enabled) {
        out.push_str("  (none)\n");
    }
    for shortcut in shortcuts.into_iter().filter(|s| s.enabled) {
        let _ = writeln!(out, "  {:<20} {}", shortcut.key.to_string(), shortcut.description);
    }
    out
}

/// One-line summary of the most used bindings, for the footer.
pub fn quick_reference(manager: &ShortcutManager) -> String {
    const ACTIONS: [(&str, &str); 5] = [
        ("help", "help"),
        ("refresh", "refresh"),
        ("cancel", "back"),
        ("view_stats", "stats"),
        ("quit", "quit"),
    ];
    let global = manager.shortcuts_for_context(Context::Global);
    ACTIONS
        .iter()
        .filter_map(|(action, label)| {
            global
                .iter()
                .find(|s| s.enabled && s.action == *action)
                .map(|s| format!("{} {}", s.key, label))
        })
        .collect::<Vec<_>>()
        .join(" · ")
}

pub fn conflicts_help(manager: &ShortcutManager) -> String {
    let conflicts = manager.conflicts();
    if conflicts.is_empty() {
        return "No shortcut conflicts detected.\n".to_string();
    }

    let mut out = format!("{} shortcut conflict(s)\n", conflicts.len());
    for conflict in conflicts {
        let _ = writeln!(out, "  {} in {}:", conflict.key, conflict.context);
        for shortcut in conflict.shortcuts {
            let _ = writeln!(out, "    - {} ({})", shortcut.action, shortcut.description);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("view_stats", "Navigation")]
    #[test_case("force_kill_process", "Process Management")]
    #[test_case("clear_filters", "Sorting & Filtering")]
    #[test_case("apply_input", "Search")]
    #[test_case("export_csv", "Data Management")]
    #[test_case("toggle_conflicts", "Help & Information")]
    #[test_case("refresh", "Refresh")]
    #[test_case("quit", "Application Control")]
    #[test_case("dance", "Other")]
    fn categorizes_actions(action: &str, category: &str) {
        assert_eq!(category_for_action(action), category);
    }

    #[test]
    fn default_help_merges_aliases() {
        let manager = ShortcutManager::default();
        let help = generate_help(&manager);
        assert!(help.contains("Application Control"));
        let quit_line = help
            .lines()
            .find(|line| line.contains("Quit application"))
            .unwrap();
        assert!(quit_line.contains("Ctrl+q"));
        assert!(quit_line.contains(" / "));
    }

    #[test]
    fn default_set_has_no_conflicts() {
        let manager = ShortcutManager::default();
        assert_eq!(conflicts_help(&manager), "No shortcut conflicts detected.\n");
        assert!(quick_reference(&manager).contains("quit"));
    }
}
