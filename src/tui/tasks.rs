//! Background work requested by views
//!
//! Views never block: they return [`Task`]s and the runner executes them on
//! the tokio runtime, posting exactly one [`AppEvent`] back per task. Timers
//! and refreshes are scoped to the mode that asked for them so that leaving a
//! mode can abort them.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::event::{AppEvent, Mode};
use crate::config::AppConfig;
use crate::core::models::ProcessInfo;
use crate::core::provider::ProcessProvider;
use crate::core::stats::ProcessStats;
use crate::shortcuts::ShortcutConfig;
use crate::storage::{ExportFormat, SnapshotStore};

#[derive(Debug, Clone)]
pub enum Task {
    /// Enumerate processes; answered by `ProcessesLoaded`.
    Refresh { origin: Mode, request: u64 },
    /// Fire `TimerFired` after `after`.
    ArmTimer { origin: Mode, after: Duration },
    Kill { origin: Mode, pid: u32, force: bool },
    Export {
        origin: Mode,
        format: ExportFormat,
        processes: Vec<ProcessInfo>,
    },
    Backup {
        origin: Mode,
        processes: Vec<ProcessInfo>,
        config: Option<AppConfig>,
    },
    ExportStats { origin: Mode, stats: ProcessStats },
    LoadConfig { origin: Mode },
    SaveConfig { origin: Mode, config: AppConfig },
    /// Persist the shortcut set after a preset change. No reply.
    SaveShortcuts { config: ShortcutConfig },
    /// Abort every outstanding timer and refresh owned by the mode.
    Cancel(Mode),
}

impl Task {
    /// Mode whose scope owns the task, for tasks that can be cancelled.
    fn scope(&self) -> Option<Mode> {
        match self {
            Task::Refresh { origin, .. } | Task::ArmTimer { origin, .. } => Some(*origin),
            _ => None,
        }
    }
}

pub struct TaskRunner {
    provider: Arc<dyn ProcessProvider>,
    store: SnapshotStore,
    config_file: PathBuf,
    shortcuts_file: PathBuf,
    tx: UnboundedSender<AppEvent>,
    scopes: HashMap<Mode, Vec<JoinHandle<()>>>,
}

impl TaskRunner {
    pub fn new(
        provider: Arc<dyn ProcessProvider>,
        store: SnapshotStore,
        config_file: PathBuf,
        shortcuts_file: PathBuf,
        tx: UnboundedSender<AppEvent>,
    ) -> Self {
        Self {
            provider,
            store,
            config_file,
            shortcuts_file,
            tx,
            scopes: HashMap::new(),
        }
    }

    pub fn execute_all(&mut self, tasks: Vec<Task>) {
        for task in tasks {
            self.execute(task);
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn execute(&mut self, task: Task) {
        let scope = task.scope();
        let handle = match task {
            Task::Cancel(mode) => {
                self.cancel(mode);
                return;
            }
            Task::Refresh { origin, request } => {
                let provider = Arc::clone(&self.provider);
                self.spawn_blocking(
                    move || provider.list().map_err(|e| e.user_message()),
                    move |result| AppEvent::ProcessesLoaded {
                        origin,
                        request,
                        result,
                    },
                )
            }
            Task::ArmTimer { origin, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(AppEvent::TimerFired { origin });
                })
            }
            Task::Kill { origin, pid, force } => {
                let provider = Arc::clone(&self.provider);
                self.spawn_blocking(
                    move || provider.kill(pid, force).map_err(|e| e.user_message()),
                    move |result| AppEvent::KillFinished {
                        origin,
                        pid,
                        force,
                        result,
                    },
                )
            }
            Task::Export {
                origin,
                format,
                processes,
            } => {
                let store = self.store.clone();
                self.spawn_blocking(
                    move || {
                        store
                            .export(&processes, format)
                            .map_err(|e| e.user_message())
                    },
                    move |result| AppEvent::FileWritten {
                        origin,
                        label: "Export",
                        result,
                    },
                )
            }
            Task::Backup {
                origin,
                processes,
                config,
            } => {
                let store = self.store.clone();
                self.spawn_blocking(
                    move || {
                        store
                            .create_backup(&processes, config.as_ref())
                            .map_err(|e| e.user_message())
                    },
                    move |result| AppEvent::FileWritten {
                        origin,
                        label: "Backup",
                        result,
                    },
                )
            }
            Task::ExportStats { origin, stats } => {
                let store = self.store.clone();
                self.spawn_blocking(
                    move || store.export_stats(&stats).map_err(|e| e.user_message()),
                    move |result| AppEvent::FileWritten {
                        origin,
                        label: "Statistics report",
                        result,
                    },
                )
            }
            Task::LoadConfig { origin } => {
                let path = self.config_file.clone();
                self.spawn_blocking(
                    move || {
                        let mut config = AppConfig::load(&path).map_err(|e| e.user_message())?;
                        config.apply_env_overrides();
                        Ok(config)
                    },
                    move |result| AppEvent::ConfigLoaded { origin, result },
                )
            }
            Task::SaveConfig { origin, mut config } => {
                let path = self.config_file.clone();
                self.spawn_blocking(
                    move || {
                        config.save(&path).map_err(|e| e.user_message())?;
                        Ok(config)
                    },
                    move |result| AppEvent::ConfigSaved { origin, result },
                )
            }
            Task::SaveShortcuts { config } => {
                let path = self.shortcuts_file.clone();
                tokio::task::spawn_blocking(move || {
                    if let Err(err) = config.save(&path) {
                        warn!(path = %path.display(), error = %err, "failed to persist shortcuts");
                    }
                });
                return;
            }
        };

        if let Some(mode) = scope {
            let handles = self.scopes.entry(mode).or_default();
            handles.retain(|handle| !handle.is_finished());
            handles.push(handle);
        }
    }

    pub fn cancel(&mut self, mode: Mode) {
        if let Some(handles) = self.scopes.remove(&mode) {
            let live = handles.iter().filter(|h| !h.is_finished()).count();
            for handle in handles {
                handle.abort();
            }
            debug!(%mode, aborted = live, "cancelled scoped tasks");
        }
    }

    /// Outstanding scoped tasks for `mode`.
    pub fn pending(&self, mode: Mode) -> usize {
        self.scopes
            .get(&mode)
            .map(|handles| handles.iter().filter(|h| !h.is_finished()).count())
            .unwrap_or(0)
    }

    pub fn shutdown(&mut self) {
        for mode in Mode::ALL {
            self.cancel(mode);
        }
    }

    /// Run `work` on the blocking pool and post its result as one event.
    fn spawn_blocking<T, W, E>(&self, work: W, into_event: E) -> JoinHandle<()>
    where
        T: Send + 'static,
        W: FnOnce() -> Result<T, String> + Send + 'static,
        E: FnOnce(Result<T, String>) -> AppEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = match tokio::task::spawn_blocking(work).await {
                Ok(result) => result,
                Err(err) => Err(format!("background task failed: {err}")),
            };
            if tx.send(into_event(result)).is_err() {
                debug!("event loop gone, dropping task result");
            }
        })
    }
}

impl Drop for TaskRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}
