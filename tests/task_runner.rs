//! Background task execution against a scripted provider

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::time::timeout;
use tokio_test::assert_ok;
use tpm::config::AppConfig;
use tpm::error::errors;
use tpm::shortcuts::ShortcutConfig;
use tpm::storage::{ExportFormat, SnapshotStore};
use tpm::tui::{AppEvent, Mode, Task, TaskRunner};
use tpm::{ProcessInfo, ProcessProvider, TpmResult};

#[derive(Default)]
struct ScriptedProvider {
    processes: Vec<ProcessInfo>,
    killed: Mutex<Vec<(u32, bool)>>,
}

impl ProcessProvider for ScriptedProvider {
    fn list(&self) -> TpmResult<Vec<ProcessInfo>> {
        Ok(self.processes.clone())
    }

    fn kill(&self, pid: u32, force: bool) -> TpmResult<()> {
        if !self.processes.iter().any(|p| p.pid == pid) {
            return Err(errors::process_error(Some(pid), "no such process"));
        }
        self.killed.lock().push((pid, force));
        Ok(())
    }
}

struct Harness {
    _temp: TempDir,
    provider: Arc<ScriptedProvider>,
    runner: TaskRunner,
    rx: UnboundedReceiver<AppEvent>,
    data_dir: PathBuf,
    config_file: PathBuf,
    shortcuts_file: PathBuf,
}

fn harness() -> Harness {
    let temp = TempDir::new().unwrap();
    let provider = Arc::new(ScriptedProvider {
        processes: vec![
            ProcessInfo {
                pid: 42,
                name: "worker".into(),
                ..Default::default()
            },
            ProcessInfo {
                pid: 43,
                name: "helper".into(),
                ..Default::default()
            },
        ],
        ..Default::default()
    });
    let data_dir = temp.path().join("data");
    let config_file = temp.path().join("config.yaml");
    let shortcuts_file = temp.path().join("shortcuts.json");
    let (tx, rx) = unbounded_channel();
    let runner = TaskRunner::new(
        provider.clone(),
        SnapshotStore::new(&data_dir),
        config_file.clone(),
        shortcuts_file.clone(),
        tx,
    );
    Harness {
        _temp: temp,
        provider,
        runner,
        rx,
        data_dir,
        config_file,
        shortcuts_file,
    }
}

async fn next_event(rx: &mut UnboundedReceiver<AppEvent>) -> AppEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

#[tokio::test]
async fn refresh_reports_the_request_id() {
    let mut h = harness();
    h.runner.execute(Task::Refresh {
        origin: Mode::Stats,
        request: 7,
    });

    match next_event(&mut h.rx).await {
        AppEvent::ProcessesLoaded {
            origin,
            request,
            result,
        } => {
            assert_eq!(origin, Mode::Stats);
            assert_eq!(request, 7);
            let processes = assert_ok!(result);
            assert_eq!(processes.len(), 2);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn kill_results_carry_errors_as_text() {
    let mut h = harness();
    h.runner.execute_all(vec![
        Task::Kill {
            origin: Mode::ProcessList,
            pid: 42,
            force: true,
        },
        Task::Kill {
            origin: Mode::ProcessList,
            pid: 99,
            force: false,
        },
    ]);

    let mut outcomes = Vec::new();
    for _ in 0..2 {
        match next_event(&mut h.rx).await {
            AppEvent::KillFinished { pid, result, .. } => outcomes.push((pid, result)),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    outcomes.sort_by_key(|(pid, _)| *pid);

    assert_ok!(&outcomes[0].1);
    let err = outcomes[1].1.as_ref().unwrap_err();
    assert!(err.contains("no such process"), "{err}");
    assert_eq!(*h.provider.killed.lock(), vec![(42, true)]);
}

#[tokio::test]
async fn cancelling_a_mode_aborts_its_timer() {
    let mut h = harness();
    h.runner.execute(Task::ArmTimer {
        origin: Mode::ProcessList,
        after: Duration::from_millis(50),
    });
    assert_eq!(h.runner.pending(Mode::ProcessList), 1);

    h.runner.execute(Task::Cancel(Mode::ProcessList));
    assert_eq!(h.runner.pending(Mode::ProcessList), 0);
    assert!(timeout(Duration::from_millis(200), h.rx.recv()).await.is_err());
}

#[tokio::test]
async fn timers_in_other_modes_survive_a_cancel() {
    let mut h = harness();
    h.runner.execute_all(vec![
        Task::ArmTimer {
            origin: Mode::ProcessList,
            after: Duration::from_millis(20),
        },
        Task::ArmTimer {
            origin: Mode::Stats,
            after: Duration::from_millis(20),
        },
        Task::Cancel(Mode::ProcessList),
    ]);

    match next_event(&mut h.rx).await {
        AppEvent::TimerFired { origin } => assert_eq!(origin, Mode::Stats),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn config_save_then_load() {
    let mut h = harness();
    let config = AppConfig {
        theme: "dark".into(),
        refresh_interval: 9,
        ..AppConfig::default()
    };
    h.runner.execute(Task::SaveConfig {
        origin: Mode::Settings,
        config,
    });
    match next_event(&mut h.rx).await {
        AppEvent::ConfigSaved { result, .. } => assert_eq!(result.unwrap().theme, "dark"),
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(h.config_file.exists());

    h.runner.execute(Task::LoadConfig {
        origin: Mode::Settings,
    });
    match next_event(&mut h.rx).await {
        AppEvent::ConfigLoaded { origin, result } => {
            assert_eq!(origin, Mode::Settings);
            assert_eq!(result.unwrap().refresh_interval, 9);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn export_writes_into_the_data_dir() {
    let mut h = harness();
    let processes = h.provider.processes.clone();
    h.runner.execute(Task::Export {
        origin: Mode::ProcessList,
        format: ExportFormat::Csv,
        processes,
    });

    match next_event(&mut h.rx).await {
        AppEvent::FileWritten { label, result, .. } => {
            assert_eq!(label, "Export");
            let path = result.unwrap();
            assert!(path.starts_with(&h.data_dir));
            assert_eq!(path.extension().unwrap(), "csv");
            let text = std::fs::read_to_string(path).unwrap();
            assert_eq!(text.lines().count(), 3);
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn shortcuts_are_saved_without_a_reply() {
    let mut h = harness();
    let mut config = ShortcutConfig::default();
    config.active_preset = "vim".into();
    h.runner.execute(Task::SaveShortcuts { config });

    let written = async {
        while !h.shortcuts_file.exists() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(Duration::from_secs(5), written).await.unwrap();
    // Give the writer a moment to finish before reading.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let loaded = ShortcutConfig::load(&h.shortcuts_file).unwrap();
    assert_eq!(loaded.active_preset, "vim");
    assert!(h.rx.try_recv().is_err());
}
