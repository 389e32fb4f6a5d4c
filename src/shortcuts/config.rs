//! Persisted shortcut bindings
//!
//! The document maps a stable shortcut id to its binding, plus the named
//! presets that can be swapped in wholesale. JSON is the default encoding;
//! a `.yaml`/`.yml` extension switches to YAML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::defaults::{default_binding, DEFAULT_BINDINGS, DEFAULT_PRESET, PRESETS};
use crate::error::{errors, ShortcutError, TpmResult};

fn default_enabled() -> bool {
    true
}

fn default_preset_name() -> String {
    DEFAULT_PRESET.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfigItem {
    pub key: String,
    pub action: String,
    #[serde(default)]
    pub description: String,
    pub context: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutConfig {
    pub shortcuts: BTreeMap<String, ShortcutConfigItem>,
    #[serde(default)]
    pub presets: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default = "default_preset_name")]
    pub active_preset: String,
}

impl Default for ShortcutConfig {
    fn default() -> Self {
        let shortcuts = DEFAULT_BINDINGS
            .iter()
            .map(|(id, key, action, description, context)| {
                (
                    id.to_string(),
                    ShortcutConfigItem {
                        key: key.to_string(),
                        action: action.to_string(),
                        description: description.to_string(),
                        context: context.name().to_string(),
                        enabled: true,
                    },
                )
            })
            .collect();

        let presets = PRESETS
            .iter()
            .map(|(name, overrides)| {
                let map = overrides
                    .iter()
                    .map(|(id, key)| (id.to_string(), key.to_string()))
                    .collect();
                (name.to_string(), map)
            })
            .collect();

        Self {
            shortcuts,
            presets,
            active_preset: default_preset_name(),
        }
    }
}

impl ShortcutConfig {
    /// Load bindings from `path`. A missing file is created with defaults.
    pub fn load(path: &Path) -> TpmResult<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            info!(path = %path.display(), "created default shortcut configuration");
            return Ok(config);
        }

        let content =
            std::fs::read_to_string(path).map_err(|e| errors::filesystem_error(path, e))?;
        let mut config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content).map_err(|e| {
                errors::config_error_with_source(
                    format!("invalid shortcut file {}", path.display()),
                    e,
                )
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| {
                errors::config_error_with_source(
                    format!("invalid shortcut file {}", path.display()),
                    e,
                )
            })?
        };

        // Files written by older versions may lack the built-in presets.
        for (name, overrides) in Self::default().presets {
            config.presets.entry(name).or_insert(overrides);
        }
        debug!(path = %path.display(), count = config.shortcuts.len(), "loaded shortcut configuration");
        Ok(config)
    }

    /// Like [`Self::load`] but never fails: unreadable or malformed files fall
    /// back to the compiled-in defaults.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "using default shortcuts");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> TpmResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| errors::filesystem_error(parent, e))?;
        }
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)
                .map_err(|e| errors::config_error_with_source("cannot encode shortcuts", e))?
        } else {
            serde_json::to_string_pretty(self)
                .map_err(|e| errors::config_error_with_source("cannot encode shortcuts", e))?
        };
        std::fs::write(path, content).map_err(|e| errors::filesystem_error(path, e))
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.keys().map(String::as_str).collect()
    }

    /// Reset every known id to its default key, then apply the preset's
    /// overrides.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ShortcutError> {
        let overrides = self
            .presets
            .get(name)
            .cloned()
            .ok_or_else(|| ShortcutError::UnknownPreset(name.to_string()))?;

        for (id, item) in self.shortcuts.iter_mut() {
            if let Some((_, key, ..)) = default_binding(id) {
                item.key = key.to_string();
            }
        }
        for (id, key) in overrides {
            match self.shortcuts.get_mut(&id) {
                Some(item) => item.key = key,
                None => warn!(preset = name, id = %id, "preset references unknown shortcut"),
            }
        }
        self.active_preset = name.to_string();
        Ok(())
    }

    /// Preset after the active one, wrapping around.
    pub fn next_preset(&self) -> Option<String> {
        let names = self.preset_names();
        let position = names.iter().position(|name| *name == self.active_preset);
        let next = match position {
            Some(idx) => names.get((idx + 1) % names.len()),
            None => names.first(),
        };
        next.map(|name| name.to_string())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("shortcuts.json");

        let config = ShortcutConfig::load(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config, ShortcutConfig::default());
    }

    #[test]
    fn yaml_extension_uses_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shortcuts.yaml");
        let mut config = ShortcutConfig::default();
        config.apply_preset("vim").unwrap();
        config.save(&path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("active_preset: vim"));
        assert_eq!(ShortcutConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn switching_presets_restores_default_keys() {
        let mut config = ShortcutConfig::default();
        config.apply_preset("vim").unwrap();
        assert_eq!(config.shortcuts["process_kill"].key, "d");

        config.apply_preset("emacs").unwrap();
        assert_eq!(config.shortcuts["process_kill"].key, "ctrl+k");
        assert_eq!(config.shortcuts["filter_search_ctrl"].key, "ctrl+s");
    }

    #[test]
    fn unknown_preset_is_rejected() {
        let mut config = ShortcutConfig::default();
        assert_eq!(
            config.apply_preset("nano"),
            Err(ShortcutError::UnknownPreset("nano".to_string()))
        );
        assert_eq!(config.active_preset, "default");
    }

    #[test]
    fn next_preset_wraps() {
        let mut config = ShortcutConfig::default();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let next = config.next_preset().unwrap();
            config.apply_preset(&next).unwrap();
            seen.push(next);
        }
        seen.sort();
        assert_eq!(seen, vec!["default", "emacs", "vim"]);
    }
}
