//! `tpm backup ...`

use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};
use chrono::Local;
use tracing::info;

use super::BackupAction;
use crate::config::AppConfig;
use crate::core::provider::ProcessProvider;
use crate::storage::SnapshotStore;

/// Runs one `tpm backup` subcommand and reports the outcome on `out`.
///
/// # Arguments
/// * `action` - Create, list or restore
/// * `provider` - Source of the live process list for `create`
/// * `store` - Data directory holding the snapshot and backups
/// * `config` - Configuration saved into new backups
/// * `config_file` - Destination when `restore --with-config` is given
pub fn execute(
    action: &BackupAction,
    provider: &dyn ProcessProvider,
    store: &SnapshotStore,
    config: &AppConfig,
    config_file: &Path,
    out: &mut impl Write,
) -> Result<()> {
    match action {
        BackupAction::Create => {
            let processes = provider.list()?;
            let path = store.create_backup(&processes, Some(config))?;
            writeln!(out, "Backed up {} processes to {}", processes.len(), path.display())?;
        }
        BackupAction::List => {
            let backups = store.list_backups()?;
            if backups.is_empty() {
                writeln!(out, "No backups in {}", store.backup_dir().display())?;
            }
            for path in backups {
                writeln!(out, "{}", path.display())?;
            }
        }
        BackupAction::Restore { file, with_config } => {
            let backup = store
                .restore_backup(file)
                .with_context(|| format!("failed to restore {}", file.display()))?;
            let taken = backup.created_at.with_timezone(&Local);
            writeln!(
                out,
                "Restored {} processes from {} (taken {})",
                backup.processes.len(),
                file.display(),
                taken.format("%Y-%m-%d %H:%M:%S")
            )?;

            if *with_config {
                match backup.config {
                    Some(mut saved) => {
                        saved.save(config_file)?;
                        info!(path = %config_file.display(), "configuration restored");
                        writeln!(out, "Configuration restored to {}", config_file.display())?;
                    }
                    None => writeln!(out, "Backup holds no configuration; left unchanged")?,
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ProcessInfo;
    use crate::error::TpmResult;
    use tempfile::TempDir;

    struct FixedProvider(Vec<ProcessInfo>);

    impl ProcessProvider for FixedProvider {
        fn list(&self) -> TpmResult<Vec<ProcessInfo>> {
            Ok(self.0.clone())
        }

        fn kill(&self, _pid: u32, _force: bool) -> TpmResult<()> {
            Ok(())
        }
    }

    fn provider() -> FixedProvider {
        FixedProvider(vec![
            ProcessInfo {
                pid: 7,
                name: "redis".into(),
                ..Default::default()
            },
            ProcessInfo {
                pid: 8,
                name: "nginx".into(),
                ..Default::default()
            },
        ])
    }

    fn run(action: BackupAction, store: &SnapshotStore, config: &AppConfig, config_file: &Path) -> String {
        let mut out = Vec::new();
        execute(&action, &provider(), store, config, config_file, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn create_list_then_restore_with_config() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path().join("data"));
        let config_file = temp.path().join("config.yaml");
        let config = AppConfig {
            theme: "light".into(),
            ..AppConfig::default()
        };

        assert!(run(BackupAction::List, &store, &config, &config_file).starts_with("No backups"));

        let created = run(BackupAction::Create, &store, &config, &config_file);
        assert!(created.contains("Backed up 2 processes"), "{created}");

        let listed = run(BackupAction::List, &store, &config, &config_file);
        let backup = std::path::PathBuf::from(listed.lines().next().unwrap());
        assert!(backup.starts_with(store.backup_dir()));

        let restored = run(
            BackupAction::Restore {
                file: backup,
                with_config: true,
            },
            &store,
            &AppConfig::default(),
            &config_file,
        );
        assert!(restored.contains("Restored 2 processes"), "{restored}");
        assert_eq!(store.load_snapshot().unwrap().len(), 2);
        assert_eq!(AppConfig::load(&config_file).unwrap().theme, "light");
    }

    #[test]
    fn restoring_a_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let store = SnapshotStore::new(temp.path());
        let mut out = Vec::new();
        let err = execute(
            &BackupAction::Restore {
                file: temp.path().join("nope.json"),
                with_config: false,
            },
            &provider(),
            &store,
            &AppConfig::default(),
            &temp.path().join("config.yaml"),
            &mut out,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("failed to restore"));
    }
}
