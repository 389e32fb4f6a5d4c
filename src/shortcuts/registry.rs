//! Shortcut storage
//!
//! Shortcuts live in per-context lists; a secondary per-key index records
//! where each key is used so conflicts can be reported without rescanning.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use super::{Context, ShortcutKey};

/// One key binding. `action` is resolved through an [`super::ActionTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortcut {
    pub key: ShortcutKey,
    pub action: String,
    pub description: String,
    pub context: Context,
    pub enabled: bool,
}

impl Shortcut {
    pub fn new(key: &str, action: &str, description: &str, context: Context) -> Self {
        Self {
            key: ShortcutKey::parse(key),
            action: action.to_string(),
            description: description.to_string(),
            context,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Two or more enabled shortcuts sharing both key and context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub key: ShortcutKey,
    pub context: Context,
    pub shortcuts: Vec<Shortcut>,
}

#[derive(Debug, Clone, Default)]
pub struct ShortcutRegistry {
    contexts: HashMap<Context, Vec<Shortcut>>,
    by_key: BTreeMap<ShortcutKey, Vec<(Context, usize)>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, shortcut: Shortcut) {
        let context = shortcut.context;
        let list = self.contexts.entry(context).or_default();
        self.by_key
            .entry(shortcut.key.clone())
            .or_default()
            .push((context, list.len()));
        list.push(shortcut);
    }

    /// First enabled shortcut for `key` in `context`.
    pub fn lookup(&self, key: &ShortcutKey, context: Context) -> Option<&Shortcut> {
        self.contexts
            .get(&context)?
            .iter()
            .find(|shortcut| shortcut.enabled && &shortcut.key == key)
    }

    pub(crate) fn lookup_mut(&mut self, key: &ShortcutKey, context: Context) -> Option<&mut Shortcut> {
        self.contexts
            .get_mut(&context)?
            .iter_mut()
            .find(|shortcut| shortcut.enabled && &shortcut.key == key)
    }

    /// First entry for `key` in `context`, enabled or not.
    pub(crate) fn find_mut(&mut self, key: &ShortcutKey, context: Context) -> Option<&mut Shortcut> {
        self.contexts
            .get_mut(&context)?
            .iter_mut()
            .find(|shortcut| &shortcut.key == key)
    }

    /// Every shortcut registered under `key`, in any context.
    pub fn conflicts_for(&self, key: &ShortcutKey) -> Vec<&Shortcut> {
        self.by_key
            .get(key)
            .map(|slots| slots.iter().filter_map(|slot| self.slot(*slot)).collect())
            .unwrap_or_default()
    }

    /// Keys bound more than once inside the same context. Reuse of a key
    /// across contexts is shadowing, not a conflict.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        for (key, slots) in &self.by_key {
            let mut per_context: BTreeMap<Context, Vec<Shortcut>> = BTreeMap::new();
            for shortcut in slots.iter().filter_map(|slot| self.slot(*slot)) {
                if shortcut.enabled {
                    per_context
                        .entry(shortcut.context)
                        .or_default()
                        .push(shortcut.clone());
                }
            }
            conflicts.extend(
                per_context
                    .into_iter()
                    .filter(|(_, shortcuts)| shortcuts.len() > 1)
                    .map(|(context, shortcuts)| Conflict {
                        key: key.clone(),
                        context,
                        shortcuts,
                    }),
            );
        }
        conflicts
    }

    pub fn shortcuts(&self, context: Context) -> &[Shortcut] {
        self.contexts
            .get(&context)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn shortcuts_mut(&mut self, key: &ShortcutKey) -> impl Iterator<Item = &mut Shortcut> + '_ {
        let key = key.clone();
        self.contexts
            .values_mut()
            .flat_map(|list| list.iter_mut())
            .filter(move |shortcut| shortcut.key == key)
    }

    /// All shortcuts, grouped in [`Context::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Shortcut> {
        Context::ALL
            .into_iter()
            .flat_map(move |context| self.shortcuts(context).iter())
    }

    pub fn len(&self) -> usize {
        self.contexts.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, (context, index): (Context, usize)) -> Option<&Shortcut> {
        self.contexts.get(&context)?.get(index)
    }
}
