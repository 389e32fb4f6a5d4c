//! Common constants used across the project

/// Common file names and paths
pub mod files {
    /// Directory under the home dir holding persistent state
    pub const APP_DIR: &str = ".tpm";
    pub const CONFIG_FILE: &str = "config.yaml";
    pub const SHORTCUTS_FILE: &str = "shortcuts.json";
    /// Last persisted process snapshot
    pub const SNAPSHOT_FILE: &str = "process_snapshot.json";
    pub const BACKUP_DIR: &str = "backups";
    pub const EXPORT_DIR: &str = "exports";
    pub const LOG_FILE: &str = "tpm.log";
}

/// Time durations
pub mod duration {
    use std::time::Duration as StdDuration;

    /// Flash message duration in seconds
    pub const FLASH_DURATION_SECS: u64 = 3;
    pub const FLASH_DURATION: StdDuration = StdDuration::from_secs(FLASH_DURATION_SECS);

    /// Process list refresh interval when the config does not say otherwise
    pub const LIST_REFRESH_INTERVAL_SECS: u64 = 2;
    pub const DETAILS_REFRESH_INTERVAL: StdDuration = StdDuration::from_secs(3);
    pub const STATS_REFRESH_INTERVAL: StdDuration = StdDuration::from_secs(5);

    /// Redraw cadence of the event loop
    pub const UI_TICK: StdDuration = StdDuration::from_millis(250);

    /// Bounds accepted for the configurable refresh interval
    pub const MIN_REFRESH_INTERVAL_SECS: u64 = 1;
    pub const MAX_REFRESH_INTERVAL_SECS: u64 = 60;
}

/// Environment variable names
pub mod env {
    pub const LOG: &str = "TPM_LOG";
    pub const REFRESH_INTERVAL: &str = "TPM_REFRESH_INTERVAL";
    pub const SHOW_SYSTEM: &str = "TPM_SHOW_SYSTEM";
    pub const THEME: &str = "TPM_THEME";
    pub const DATA_DIR: &str = "TPM_DATA_DIR";
    pub const AUTO_REFRESH: &str = "TPM_AUTO_REFRESH";
}

/// Terminal layout limits
pub mod layout {
    pub const MIN_WIDTH: u16 = 80;
    pub const MIN_HEIGHT: u16 = 20;
}

/// Themes the settings view cycles through
pub const THEMES: &[&str] = &["default", "dark", "light", "high-contrast"];
