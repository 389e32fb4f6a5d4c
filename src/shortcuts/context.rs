//! Logical dispatch scopes for shortcuts

use std::fmt;

use serde::{Deserialize, Serialize};

/// Context in which a shortcut is directly active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Context {
    Global,
    Processes,
    Details,
    Stats,
    Settings,
    Help,
    Filter,
    Search,
}

impl Context {
    pub const ALL: [Context; 8] = [
        Context::Global,
        Context::Processes,
        Context::Details,
        Context::Stats,
        Context::Settings,
        Context::Help,
        Context::Filter,
        Context::Search,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Context::Global => "Global",
            Context::Processes => "Processes",
            Context::Details => "Details",
            Context::Stats => "Statistics",
            Context::Settings => "Settings",
            Context::Help => "Help",
            Context::Filter => "Filter",
            Context::Search => "Search",
        }
    }

    /// Look a context up by display name or identifier, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let context = match lowered.as_str() {
            "global" => Context::Global,
            "processes" | "process" | "processlist" | "process_list" => Context::Processes,
            "details" => Context::Details,
            "stats" | "statistics" => Context::Stats,
            "settings" => Context::Settings,
            "help" => Context::Help,
            "filter" => Context::Filter,
            "search" => Context::Search,
            _ => return None,
        };
        Some(context)
    }

    /// Lenient variant used when reading persisted bindings: unknown names
    /// land in Global.
    pub fn parse_lenient(name: &str) -> Self {
        Self::from_name(name).unwrap_or_else(|| {
            tracing::warn!(context = name, "unknown shortcut context, using Global");
            Context::Global
        })
    }

    /// Text-entry contexts never fall back to Global bindings.
    pub fn captures_text(self) -> bool {
        matches!(self, Context::Filter | Context::Search)
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for context in Context::ALL {
            assert_eq!(Context::from_name(context.name()), Some(context));
        }
        assert_eq!(Context::from_name("stats"), Some(Context::Stats));
        assert_eq!(Context::parse_lenient("nowhere"), Context::Global);
    }
}
