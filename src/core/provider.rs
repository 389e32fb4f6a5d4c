//! Process data and termination providers
//!
//! The event loop only sees the [`ProcessProvider`] trait; the sysinfo-backed
//! implementation is what the binary wires in. Enumeration and termination
//! are blocking calls and are run off the event loop.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System, Users};
use tracing::{debug, trace};

use super::models::ProcessInfo;
use crate::error::TpmResult;
use crate::platform;

pub trait ProcessProvider: Send + Sync {
    /// Every live process. Attributes that cannot be read are defaulted.
    fn list(&self) -> TpmResult<Vec<ProcessInfo>>;

    /// Single termination attempt.
    fn kill(&self, pid: u32, force: bool) -> TpmResult<()>;
}

struct SysinfoState {
    system: System,
    users: Users,
    primed: bool,
}

/// sysinfo needs two samples before CPU usage is meaningful, so the
/// `System` is kept across refreshes.
pub struct SysinfoProvider {
    state: Mutex<SysinfoState>,
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SysinfoState {
                system: System::new(),
                users: Users::new_with_refreshed_list(),
                primed: false,
            }),
        }
    }

    fn refresh(state: &mut SysinfoState) {
        state.system.refresh_memory();
        state.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::everything(),
        );
    }
}

impl ProcessProvider for SysinfoProvider {
    fn list(&self) -> TpmResult<Vec<ProcessInfo>> {
        let mut state = self.state.lock();
        Self::refresh(&mut state);
        if !state.primed {
            std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
            Self::refresh(&mut state);
            state.users.refresh_list();
            state.primed = true;
        }

        let total_memory = state.system.total_memory();
        let processes: Vec<ProcessInfo> = state
            .system
            .processes()
            .iter()
            .map(|(pid, process)| convert(*pid, process, total_memory, &state.users))
            .collect();
        debug!(count = processes.len(), "enumerated processes");
        Ok(processes)
    }

    fn kill(&self, pid: u32, force: bool) -> TpmResult<()> {
        platform::terminate(pid, force)
    }
}

fn convert(pid: Pid, process: &Process, total_memory: u64, users: &Users) -> ProcessInfo {
    let pid = pid.as_u32();
    let memory_bytes = process.memory();
    let memory = if total_memory > 0 {
        memory_bytes as f64 / total_memory as f64 * 100.0
    } else {
        0.0
    };
    let username = process
        .user_id()
        .and_then(|uid| users.get_user_by_id(uid))
        .map(|user| user.name().to_string())
        .unwrap_or_default();
    let command = process
        .cmd()
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let working_dir = process
        .cwd()
        .map(Path::display)
        .map(|dir| dir.to_string())
        .unwrap_or_default();
    let num_threads = process
        .tasks()
        .map(|tasks| tasks.len() as u32)
        .unwrap_or(0)
        .max(1);
    let create_time = DateTime::<Utc>::from_timestamp(process.start_time() as i64, 0)
        .unwrap_or_default();
    let status = process.status();
    trace!(pid, name = ?process.name(), "converted process");

    ProcessInfo {
        pid,
        ppid: process.parent().map(|p| p.as_u32()).unwrap_or(0),
        name: process.name().to_string_lossy().into_owned(),
        status: status.to_string(),
        cpu: f64::from(process.cpu_usage()),
        memory,
        memory_bytes,
        create_time,
        username,
        command,
        working_dir,
        num_threads,
        nice: platform::nice_value(pid),
        is_running: matches!(status, ProcessStatus::Run),
    }
}
