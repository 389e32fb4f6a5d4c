//! Snapshot files written and read back through the store

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tpm::config::AppConfig;
use tpm::storage::export::CSV_HEADER;
use tpm::{ExportFormat, ProcessInfo, SnapshotStore};

fn awkward_process() -> ProcessInfo {
    ProcessInfo {
        pid: 4242,
        ppid: 1,
        name: "node".into(),
        status: "run".into(),
        cpu: 12.5,
        memory: 3.25,
        memory_bytes: 52_428_800,
        create_time: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        username: "alice".into(),
        command: r#"node server.js --title "a, b" --flag"#.into(),
        working_dir: "/srv/app, v2".into(),
        num_threads: 11,
        nice: -5,
        is_running: true,
    }
}

#[test]
fn csv_survives_commas_and_quotes() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());
    let path = temp.path().join("out.csv");
    let processes = vec![awkward_process()];

    store.export_to(&processes, ExportFormat::Csv, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next().unwrap(), CSV_HEADER.join(","));
    assert!(text.contains("12.50,3.25"));

    let imported = store.import(&path, ExportFormat::from_path(&path)).unwrap();
    assert_eq!(imported, processes);
}

#[test]
fn json_keeps_field_names() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());
    let path = store.export(&[awkward_process()], ExportFormat::Json).unwrap();

    assert!(path.starts_with(store.export_dir()));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("processes_export_") && name.ends_with(".json"), "{name}");

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"pid\": 4242"));
    assert!(text.contains("\"num_threads\": 11"));
    assert_eq!(
        store.import(&path, ExportFormat::Json).unwrap(),
        vec![awkward_process()]
    );
}

#[test]
fn unknown_extension_reads_as_json() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());
    let path = temp.path().join("snapshot.dump");
    store
        .export_to(&[awkward_process()], ExportFormat::Json, &path)
        .unwrap();

    assert_eq!(ExportFormat::from_path(&path), ExportFormat::Json);
    assert_eq!(store.import(&path, ExportFormat::from_path(&path)).unwrap().len(), 1);
}

#[test]
fn importing_csv_as_json_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());
    let path = temp.path().join("out.csv");
    store
        .export_to(&[awkward_process()], ExportFormat::Csv, &path)
        .unwrap();

    let err = store.import(&path, ExportFormat::Json).unwrap_err();
    assert!(err.user_message().starts_with("json export failed"));
}

#[test]
fn backup_restores_processes_and_config() {
    let temp = TempDir::new().unwrap();
    let store = SnapshotStore::new(temp.path());
    let config = AppConfig {
        theme: "light".into(),
        ..AppConfig::default()
    };

    let path = store
        .create_backup(&[awkward_process()], Some(&config))
        .unwrap();
    assert_eq!(store.list_backups().unwrap(), vec![path.clone()]);
    assert!(store.load_snapshot().unwrap().is_empty());

    let backup = store.restore_backup(&path).unwrap();
    assert_eq!(backup.config.unwrap().theme, "light");
    assert_eq!(store.load_snapshot().unwrap(), vec![awkward_process()]);
}
