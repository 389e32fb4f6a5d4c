//! Filesystem layout
//!
//! Persistent state (config, shortcuts, snapshots) lives in `~/.tpm/`;
//! runtime data (the log) lives in `<tmp>/.tpm/`.

use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use crate::common::constants::files;

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// `~/.tpm/` unless overridden
    pub config_dir: PathBuf,
    /// `<tmp>/.tpm/`
    pub runtime_dir: PathBuf,
    pub config_file: PathBuf,
    pub shortcuts_file: PathBuf,
    pub log_file: PathBuf,
    /// Snapshots, backups and exports
    pub data_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Cannot find home directory")?;
        Ok(Self::with_root(home_dir.join(files::APP_DIR)))
    }

    /// Lay out every path under `config_dir`; used by tests and `--config-dir`.
    pub fn with_root(config_dir: impl Into<PathBuf>) -> Self {
        let config_dir = config_dir.into();
        let runtime_dir = std::env::temp_dir().join(files::APP_DIR);
        Self {
            config_file: config_dir.join(files::CONFIG_FILE),
            shortcuts_file: config_dir.join(files::SHORTCUTS_FILE),
            log_file: runtime_dir.join(files::LOG_FILE),
            data_dir: config_dir.clone(),
            config_dir,
            runtime_dir,
        }
    }

    /// Point snapshots and exports somewhere other than the config dir.
    pub fn set_data_dir(&mut self, data_dir: &Path) {
        self.data_dir = data_dir.to_path_buf();
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.config_dir, &self.runtime_dir, &self.data_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        Ok(())
    }
}
