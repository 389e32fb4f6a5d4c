//! Persistent application settings
//!
//! Stored as YAML in `~/.tpm/config.yaml`. `TPM_*` environment variables
//! override whatever the file says; a missing file means defaults.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::constants::{duration, env, THEMES};
use crate::core::query::{ProcessFilter, ProcessSort};
use crate::error::{errors, TpmResult};
use crate::utils::expand_home;

pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    /// Process list refresh cadence in seconds.
    pub refresh_interval: u64,
    pub show_system: bool,
    pub default_sort: ProcessSort,
    pub default_filter: ProcessFilter,
    pub auto_refresh: bool,
    pub theme: String,
    /// Snapshots, backups and exports; `~/` is expanded.
    pub data_dir: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            version: CONFIG_VERSION.to_string(),
            refresh_interval: duration::LIST_REFRESH_INTERVAL_SECS,
            show_system: false,
            default_sort: ProcessSort::default(),
            default_filter: ProcessFilter::default(),
            auto_refresh: true,
            theme: THEMES[0].to_string(),
            data_dir: "~/.tpm".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> TpmResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| errors::filesystem_error(path, e))?;
        let mut config: Self = serde_yaml::from_str(&content).map_err(|e| {
            errors::config_error_with_source(format!("invalid config {}", path.display()), e)
        })?;
        config.normalize();
        Ok(config)
    }

    /// Load, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "config unreadable, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&mut self, path: &Path) -> TpmResult<()> {
        self.normalize();
        self.updated_at = Utc::now();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| errors::filesystem_error(parent, e))?;
        }
        let content = serde_yaml::to_string(self)
            .map_err(|e| errors::config_error_with_source("failed to encode config", e))?;
        std::fs::write(path, content).map_err(|e| errors::filesystem_error(path, e))?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Apply `TPM_*` overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary lookup; unparsable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(env::REFRESH_INTERVAL) {
            match value.trim().parse::<u64>() {
                Ok(secs) => self.refresh_interval = secs,
                Err(_) => warn!(value = %value, "ignoring invalid {}", env::REFRESH_INTERVAL),
            }
        }
        if let Some(value) = lookup(env::SHOW_SYSTEM) {
            match parse_bool(&value) {
                Some(flag) => self.show_system = flag,
                None => warn!(value = %value, "ignoring invalid {}", env::SHOW_SYSTEM),
            }
        }
        if let Some(value) = lookup(env::AUTO_REFRESH) {
            match parse_bool(&value) {
                Some(flag) => self.auto_refresh = flag,
                None => warn!(value = %value, "ignoring invalid {}", env::AUTO_REFRESH),
            }
        }
        if let Some(value) = lookup(env::THEME) {
            if !value.trim().is_empty() {
                self.theme = value.trim().to_string();
            }
        }
        if let Some(value) = lookup(env::DATA_DIR) {
            if !value.trim().is_empty() {
                self.data_dir = value.trim().to_string();
            }
        }
        self.normalize();
    }

    pub fn data_dir(&self) -> PathBuf {
        expand_home(&self.data_dir)
    }

    pub fn refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.refresh_interval)
    }

    /// Adjust the refresh interval by `delta` seconds within the allowed range.
    pub fn step_refresh_interval(&mut self, delta: i64) {
        let next = self.refresh_interval as i64 + delta;
        self.refresh_interval = next.clamp(
            duration::MIN_REFRESH_INTERVAL_SECS as i64,
            duration::MAX_REFRESH_INTERVAL_SECS as i64,
        ) as u64;
    }

    pub fn cycle_theme(&mut self) {
        let index = THEMES
            .iter()
            .position(|theme| *theme == self.theme)
            .map(|i| (i + 1) % THEMES.len())
            .unwrap_or(0);
        self.theme = THEMES[index].to_string();
    }

    fn normalize(&mut self) {
        self.refresh_interval = self.refresh_interval.clamp(
            duration::MIN_REFRESH_INTERVAL_SECS,
            duration::MAX_REFRESH_INTERVAL_SECS,
        );
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::{SortField, SortOrder};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = AppConfig::load(&temp.path().join("config.yaml")).unwrap();
        assert_eq!(config.refresh_interval, 2);
        assert!(config.auto_refresh);
        assert!(!config.show_system);
        assert_eq!(config.default_sort.field, SortField::Cpu);
        assert_eq!(config.default_sort.order, SortOrder::Desc);
    }

    #[test]
    fn save_then_load_preserves_edits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/config.yaml");
        let mut config = AppConfig {
            refresh_interval: 7,
            show_system: true,
            theme: "dark".into(),
            ..AppConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.refresh_interval, 7);
        assert!(loaded.show_system);
        assert_eq!(loaded.theme, "dark");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "refresh_interval: 0\ntheme: light\n").unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.refresh_interval, 1);
        assert_eq!(loaded.theme, "light");
        assert!(loaded.auto_refresh);
    }

    #[test]
    fn malformed_file_is_an_error_but_load_or_default_recovers() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "refresh_interval: [nope").unwrap();

        assert!(AppConfig::load(&path).is_err());
        assert_eq!(AppConfig::load_or_default(&path).refresh_interval, 2);
    }

    #[test]
    fn env_overrides_apply_and_ignore_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("TPM_REFRESH_INTERVAL", "9"),
            ("TPM_SHOW_SYSTEM", "yes"),
            ("TPM_AUTO_REFRESH", "maybe"),
            ("TPM_THEME", "light"),
        ]);
        let mut config = AppConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.refresh_interval, 9);
        assert!(config.show_system);
        assert!(config.auto_refresh);
        assert_eq!(config.theme, "light");
    }

    #[test]
    fn interval_steps_are_clamped_and_themes_cycle() {
        let mut config = AppConfig::default();
        config.step_refresh_interval(-10);
        assert_eq!(config.refresh_interval, 1);
        config.step_refresh_interval(100);
        assert_eq!(config.refresh_interval, 60);

        config.theme = "high-contrast".into();
        config.cycle_theme();
        assert_eq!(config.theme, "default");
        config.theme = "unknown".into();
        config.cycle_theme();
        assert_eq!(config.theme, "default");
    }
}
