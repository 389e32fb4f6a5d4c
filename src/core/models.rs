//! Core data model
//!
//! A [`ProcessInfo`] is one row of a snapshot. Snapshots are plain
//! `Vec<ProcessInfo>` values that are replaced wholesale on every refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One process as captured at refresh time.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub ppid: u32,
    pub name: String,
    pub status: String,
    /// CPU usage in percent; may exceed 100 on multi-core machines.
    pub cpu: f64,
    /// Resident memory as a percentage of total memory.
    pub memory: f64,
    pub memory_bytes: u64,
    pub create_time: DateTime<Utc>,
    pub username: String,
    pub command: String,
    pub working_dir: String,
    pub num_threads: u32,
    pub nice: i32,
    pub is_running: bool,
}

/// Process names treated as part of the operating system.
const SYSTEM_PROCESS_NAMES: &[&str] = &[
    // macOS
    "kernel_task",
    "launchd",
    "kextd",
    "WindowServer",
    "loginwindow",
    "SystemUIServer",
    "mds",
    "mds_stores",
    "coreaudiod",
    "cfprefsd",
    "distnoted",
    "syslogd",
    // Linux
    "systemd",
    "kthreadd",
    "init",
    "dbus-daemon",
    "udevd",
    "systemd-udevd",
    "systemd-journald",
];

const SYSTEM_PROCESS_PREFIXES: &[&str] = &[
    "com.apple",
    "kworker",
    "ksoftirqd",
    "migration/",
    "rcu_",
    "irq/",
];

const SYSTEM_USERS: &[&str] = &["root", "daemon", "nobody", "system"];

impl ProcessInfo {
    /// Heuristic used by the "show system processes" filter.
    pub fn is_system(&self) -> bool {
        SYSTEM_PROCESS_NAMES.contains(&self.name.as_str())
            || SYSTEM_PROCESS_PREFIXES
                .iter()
                .any(|prefix| self.name.starts_with(prefix))
            || SYSTEM_USERS.contains(&self.username.as_str())
    }

    /// Human-readable resident memory, e.g. `"12.3 MB"`.
    pub fn memory_display(&self) -> String {
        format_bytes(self.memory_bytes)
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("kernel_task", "alice", true)]
    #[test_case("kworker/0:1", "alice", true)]
    #[test_case("com.apple.Safari", "alice", true)]
    #[test_case("firefox", "root", true)]
    #[test_case("firefox", "alice", false)]
    fn system_heuristic(name: &str, user: &str, expected: bool) {
        let process = ProcessInfo {
            name: name.to_string(),
            username: user.to_string(),
            ..Default::default()
        };
        assert_eq!(process.is_system(), expected);
    }

    #[test]
    fn bytes_are_humanized() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(1536), "1.5 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }
}
