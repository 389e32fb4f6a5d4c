//! Snapshot persistence
//!
//! Everything lives under the data directory:
//!
//! ```text
//! <data_dir>/process_snapshot.json
//! <data_dir>/backups/backup_<YYYYmmdd_HHMMSS>.json
//! <data_dir>/exports/processes_export_<YYYYmmdd_HHMMSS>.{json,csv}
//! ```

pub mod export;

pub use export::ExportFormat;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::constants::files;
use crate::config::AppConfig;
use crate::core::models::ProcessInfo;
use crate::core::stats::ProcessStats;
use crate::error::{errors, TpmResult};

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Contents of a backup file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub config: Option<AppConfig>,
    #[serde(default)]
    pub processes: Vec<ProcessInfo>,
}

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(files::SNAPSHOT_FILE)
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(files::BACKUP_DIR)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.data_dir.join(files::EXPORT_DIR)
    }

    pub fn save_snapshot(&self, processes: &[ProcessInfo]) -> TpmResult<PathBuf> {
        let path = self.snapshot_path();
        write_file(&path, &ExportFormat::Json.encode(processes)?)?;
        debug!(path = %path.display(), count = processes.len(), "snapshot saved");
        Ok(path)
    }

    /// Last persisted snapshot; empty when none was ever saved.
    pub fn load_snapshot(&self) -> TpmResult<Vec<ProcessInfo>> {
        let path = self.snapshot_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&path).map_err(|e| errors::filesystem_error(&path, e))?;
        ExportFormat::Json.decode(&data)
    }

    /// Writes a timestamped backup of the processes and, optionally, the
    /// application configuration into the backups directory.
    ///
    /// # Arguments
    /// * `processes` - Snapshot to store
    /// * `config` - Configuration to store alongside it, if any
    ///
    /// # Returns
    /// Path of the new backup file, or `Err` on serialization or IO failure
    pub fn create_backup(
        &self,
        processes: &[ProcessInfo],
        config: Option<&AppConfig>,
    ) -> TpmResult<PathBuf> {
        let now = Local::now();
        let path = self
            .backup_dir()
            .join(format!("backup_{}.json", now.format(TIMESTAMP_FORMAT)));
        let backup = Backup {
            created_at: now.with_timezone(&Utc),
            config: config.cloned(),
            processes: processes.to_vec(),
        };
        let data = serde_json::to_string_pretty(&backup)
            .map_err(|e| errors::export_error("json", e.to_string()))?;
        write_file(&path, &data)?;
        info!(path = %path.display(), count = processes.len(), "backup created");
        Ok(path)
    }

    /// Backup files, newest first.
    pub fn list_backups(&self) -> TpmResult<Vec<PathBuf>> {
        let dir = self.backup_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let entries = std::fs::read_dir(&dir).map_err(|e| errors::filesystem_error(&dir, e))?;
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
            })
            .collect();
        // Timestamped names sort chronologically.
        backups.sort();
        backups.reverse();
        Ok(backups)
    }

    /// Read a backup and make its processes the persisted snapshot.
    ///
    /// # Arguments
    /// * `path` - Backup file, usually one returned by [`Self::list_backups`]
    ///
    /// # Returns
    /// The decoded backup. The stored configuration is not applied here.
    pub fn restore_backup(&self, path: &Path) -> TpmResult<Backup> {
        let data = std::fs::read_to_string(path).map_err(|e| errors::filesystem_error(path, e))?;
        let backup: Backup = serde_json::from_str(&data)
            .map_err(|e| errors::export_error("json", format!("invalid backup: {e}")))?;
        self.save_snapshot(&backup.processes)?;
        info!(path = %path.display(), count = backup.processes.len(), "backup restored");
        Ok(backup)
    }

    /// Write the snapshot to the exports directory and return the file path.
    pub fn export(&self, processes: &[ProcessInfo], format: ExportFormat) -> TpmResult<PathBuf> {
        let path = self.export_dir().join(format!(
            "processes_export_{}.{}",
            Local::now().format(TIMESTAMP_FORMAT),
            format.extension()
        ));
        self.export_to(processes, format, &path)?;
        Ok(path)
    }

    pub fn export_to(
        &self,
        processes: &[ProcessInfo],
        format: ExportFormat,
        path: &Path,
    ) -> TpmResult<()> {
        write_file(path, &format.encode(processes)?)?;
        info!(path = %path.display(), %format, count = processes.len(), "processes exported");
        Ok(())
    }

    pub fn import(&self, path: &Path, format: ExportFormat) -> TpmResult<Vec<ProcessInfo>> {
        let data = std::fs::read_to_string(path).map_err(|e| errors::filesystem_error(path, e))?;
        let processes = format.decode(&data)?;
        info!(path = %path.display(), %format, count = processes.len(), "processes imported");
        Ok(processes)
    }

    pub fn export_stats(&self, stats: &ProcessStats) -> TpmResult<PathBuf> {
        let now = Local::now();
        let path = self
            .export_dir()
            .join(format!("process_stats_{}.txt", now.format(TIMESTAMP_FORMAT)));
        write_file(&path, &stats.report(now))?;
        info!(path = %path.display(), "statistics exported");
        Ok(path)
    }
}

fn write_file(path: &Path, contents: &str) -> TpmResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| errors::filesystem_error(parent, e))?;
    }
    std::fs::write(path, contents).map_err(|e| errors::filesystem_error(path, e))
}
