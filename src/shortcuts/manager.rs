//! Context-aware shortcut resolution
//!
//! The manager resolves a key in the current context first and falls back to
//! Global, so a context binding always shadows a global one with the same key.
//! Text-entry contexts (Filter, Search) never fall back: typed characters must
//! reach the input field instead of firing global bindings.

use crossterm::event::KeyEvent;
use tracing::{debug, info, warn};

use super::{
    ActionTable, Conflict, Context, Shortcut, ShortcutConfig, ShortcutConfigItem, ShortcutKey,
    ShortcutRegistry,
};
use crate::error::ShortcutError;

#[derive(Debug, Clone)]
pub struct ShortcutManager {
    registry: ShortcutRegistry,
    context: Context,
    config: ShortcutConfig,
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::from_config(ShortcutConfig::default())
    }
}

impl ShortcutManager {
    /// Wrap an explicitly built registry. The persisted config starts empty.
    pub fn new(registry: ShortcutRegistry) -> Self {
        Self {
            registry,
            context: Context::Global,
            config: ShortcutConfig {
                shortcuts: Default::default(),
                presets: ShortcutConfig::default().presets,
                active_preset: "custom".to_string(),
            },
        }
    }

    pub fn from_config(config: ShortcutConfig) -> Self {
        let registry = build_registry(&config);
        Self {
            registry,
            context: Context::Global,
            config,
        }
    }

    pub fn registry(&self) -> &ShortcutRegistry {
        &self.registry
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn set_context(&mut self, context: Context) {
        if self.context != context {
            debug!(from = %self.context, to = %context, "shortcut context changed");
            self.context = context;
        }
    }

    /// Current context first, then Global.
    pub fn resolve(&self, key: &ShortcutKey) -> Option<&Shortcut> {
        self.registry.lookup(key, self.context).or_else(|| {
            if self.context == Context::Global {
                None
            } else {
                self.registry.lookup(key, Context::Global)
            }
        })
    }

    /// Current context only.
    pub fn resolve_local(&self, key: &ShortcutKey) -> Option<&Shortcut> {
        self.registry.lookup(key, self.context)
    }

    /// Turn a raw key event into a command, or `None` when the key is not a
    /// shortcut in the current context.
    ///
    /// A context binding whose action is missing from `actions` also yields
    /// `None`; the Global binding for the same key is not tried.
    pub fn handle_key<C>(&self, event: &KeyEvent, actions: &ActionTable<C>) -> Option<C> {
        let key = ShortcutKey::from_key_event(event)?;
        let shortcut = if self.context.captures_text() {
            self.resolve_local(&key)
        } else {
            self.resolve(&key)
        }?;

        let command = actions.resolve(&shortcut.action);
        if command.is_none() {
            warn!(action = %shortcut.action, key = %key, "shortcut bound to unknown action");
        }
        command
    }

    pub fn enable(&mut self, key: &ShortcutKey, context: Context) -> bool {
        self.set_enabled(key, context, true)
    }

    pub fn disable(&mut self, key: &ShortcutKey, context: Context) -> bool {
        self.set_enabled(key, context, false)
    }

    fn set_enabled(&mut self, key: &ShortcutKey, context: Context, enabled: bool) -> bool {
        match self.registry.find_mut(key, context) {
            Some(shortcut) => {
                shortcut.enabled = enabled;
                let action = shortcut.action.clone();
                self.sync_item(key, context, |item| item.enabled = enabled, &action);
                true
            }
            None => false,
        }
    }

    /// A context's shortcuts sorted by their canonical key string.
    pub fn shortcuts_for_context(&self, context: Context) -> Vec<&Shortcut> {
        let mut shortcuts: Vec<&Shortcut> = self.registry.shortcuts(context).iter().collect();
        shortcuts.sort_by_cached_key(|shortcut| shortcut.key.to_string());
        shortcuts
    }

    pub fn conflicts(&self) -> Vec<Conflict> {
        self.registry.conflicts()
    }

    pub fn conflicts_for(&self, key: &ShortcutKey) -> Vec<&Shortcut> {
        self.registry.conflicts_for(key)
    }

    /// Reject empty keys and keys already bound (enabled) in `context`.
    pub fn validate(&self, key: &ShortcutKey, context: Context) -> Result<(), ShortcutError> {
        if key.is_empty() {
            return Err(ShortcutError::EmptyKey);
        }
        if let Some(existing) = self.registry.lookup(key, context) {
            return Err(ShortcutError::Conflict {
                key: key.to_string(),
                context,
                existing: existing.action.clone(),
            });
        }
        Ok(())
    }

    pub fn create_shortcut(
        &mut self,
        binding: &str,
        action: &str,
        description: &str,
        context: Context,
    ) -> Result<(), ShortcutError> {
        let shortcut = Shortcut::new(binding, action, description, context);
        self.validate(&shortcut.key, context)?;

        let id = self.unique_id(context, action);
        self.config.shortcuts.insert(
            id,
            ShortcutConfigItem {
                key: shortcut.key.to_string(),
                action: action.to_string(),
                description: description.to_string(),
                context: context.name().to_string(),
                enabled: true,
            },
        );
        info!(key = %shortcut.key, action, %context, "shortcut created");
        self.registry.register(shortcut);
        Ok(())
    }

    /// Rebind the shortcut at `old_binding` in `context` to `new_binding`.
    pub fn update_shortcut(
        &mut self,
        old_binding: &str,
        context: Context,
        new_binding: &str,
        description: Option<&str>,
    ) -> Result<(), ShortcutError> {
        let old_key = ShortcutKey::parse(old_binding);
        let new_key = ShortcutKey::parse(new_binding);
        let existing = self
            .registry
            .lookup(&old_key, context)
            .cloned()
            .ok_or_else(|| ShortcutError::NotFound {
                key: old_key.to_string(),
                context,
            })?;
        if new_key != old_key {
            self.validate(&new_key, context)?;
        }

        let description = description.unwrap_or(&existing.description).to_string();
        if let Some(shortcut) = self.registry.lookup_mut(&old_key, context) {
            shortcut.enabled = false;
        }
        self.registry.register(Shortcut::new(
            new_binding,
            &existing.action,
            &description,
            context,
        ));

        self.sync_item(
            &old_key,
            context,
            |item| {
                item.key = new_key.to_string();
                item.description = description.clone();
            },
            &existing.action,
        );
        Ok(())
    }

    /// Disable the binding; entries are never physically removed.
    pub fn remove_shortcut(&mut self, binding: &str, context: Context) -> Result<(), ShortcutError> {
        let key = ShortcutKey::parse(binding);
        if self.registry.lookup(&key, context).is_none() {
            return Err(ShortcutError::NotFound {
                key: key.to_string(),
                context,
            });
        }
        self.disable(&key, context);
        Ok(())
    }

    /// Keep the first enabled binding for `binding` in `keep_context` and disable
    /// every other enabled binding of that key. Returns how many were disabled.
    pub fn resolve_conflict(&mut self, binding: &str, keep_context: Context) -> usize {
        let key = ShortcutKey::parse(binding);
        let mut kept = false;
        let mut disabled = Vec::new();
        for shortcut in self.registry.shortcuts_mut(&key) {
            if !shortcut.enabled {
                continue;
            }
            if shortcut.context == keep_context && !kept {
                kept = true;
                continue;
            }
            shortcut.enabled = false;
            disabled.push((shortcut.context, shortcut.action.clone()));
        }
        for (context, action) in &disabled {
            self.sync_item(&key, *context, |item| item.enabled = false, action);
        }
        info!(key = %key, keep = %keep_context, disabled = disabled.len(), "conflict resolved");
        disabled.len()
    }

    pub fn active_preset(&self) -> &str {
        &self.config.active_preset
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.config.preset_names()
    }

    /// Swap in a named preset wholesale. The registry is rebuilt and the
    /// current context is kept.
    pub fn apply_preset(&mut self, name: &str) -> Result<(), ShortcutError> {
        let mut config = self.config.clone();
        config.apply_preset(name)?;
        self.apply_config(config);
        info!(preset = name, "shortcut preset applied");
        Ok(())
    }

    /// Advance to the next preset and return its name.
    pub fn cycle_preset(&mut self) -> Result<String, ShortcutError> {
        let next = self
            .config
            .next_preset()
            .ok_or_else(|| ShortcutError::UnknownPreset(String::new()))?;
        self.apply_preset(&next)?;
        Ok(next)
    }

    pub fn apply_config(&mut self, config: ShortcutConfig) {
        self.registry = build_registry(&config);
        self.config = config;
    }

    /// Snapshot of the current bindings in persisted form.
    pub fn export_config(&self) -> ShortcutConfig {
        let mut exported = self.config.clone();
        if exported.shortcuts.is_empty() {
            // Built from a bare registry: derive ids from context + action.
            for shortcut in self.registry.iter() {
                let id = format!("{}_{}", shortcut.context.name(), shortcut.action);
                let id = unique_key(&exported, id);
                exported.shortcuts.insert(id, item_from(shortcut));
            }
        }
        exported
    }

    fn unique_id(&self, context: Context, action: &str) -> String {
        unique_key(&self.config, format!("{}_{}", context.name(), action))
    }

    /// Mirror a registry change into the persisted document. Matches the
    /// first item with the same key, context and action.
    fn sync_item(
        &mut self,
        key: &ShortcutKey,
        context: Context,
        update: impl FnOnce(&mut ShortcutConfigItem),
        action: &str,
    ) {
        let item = self.config.shortcuts.values_mut().find(|item| {
            ShortcutKey::parse(&item.key) == *key
                && Context::parse_lenient(&item.context) == context
                && item.action == action
        });
        if let Some(item) = item {
            update(item);
        }
    }
}

fn build_registry(config: &ShortcutConfig) -> ShortcutRegistry {
    let mut registry = ShortcutRegistry::new();
    for (id, item) in &config.shortcuts {
        let mut shortcut = Shortcut::new(
            &item.key,
            &item.action,
            &item.description,
            Context::parse_lenient(&item.context),
        );
        shortcut.enabled = item.enabled;
        if shortcut.key.is_empty() {
            warn!(id = %id, "skipping shortcut with empty key");
            continue;
        }
        registry.register(shortcut);
    }
    registry
}

fn item_from(shortcut: &Shortcut) -> ShortcutConfigItem {
    ShortcutConfigItem {
        key: shortcut.key.to_string(),
        action: shortcut.action.clone(),
        description: shortcut.description.clone(),
        context: shortcut.context.name().to_string(),
        enabled: shortcut.enabled,
    }
}

fn unique_key(config: &ShortcutConfig, base: String) -> String {
    if !config.shortcuts.contains_key(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !config.shortcuts.contains_key(candidate))
        .unwrap_or(base)
}
