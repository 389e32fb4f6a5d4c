//! `tpm shortcuts ...`

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context as _, Result};

use super::ShortcutsAction;
use crate::shortcuts::help::{conflicts_help, context_help, generate_help};
use crate::shortcuts::{Context, ShortcutConfig, ShortcutManager};

pub fn execute(action: &ShortcutsAction, shortcuts_file: &Path, out: &mut impl Write) -> Result<()> {
    let mut manager = ShortcutManager::from_config(ShortcutConfig::load_or_default(shortcuts_file));

    match action {
        ShortcutsAction::List { context: None } => write!(out, "{}", generate_help(&manager))?,
        ShortcutsAction::List {
            context: Some(name),
        } => {
            let Some(context) = Context::from_name(name) else {
                bail!("unknown context '{name}'");
            };
            write!(out, "{}", context_help(&manager, context))?;
        }
        ShortcutsAction::Conflicts => write!(out, "{}", conflicts_help(&manager))?,
        ShortcutsAction::Presets => {
            let active = manager.active_preset().to_string();
            for name in manager.preset_names() {
                let marker = if name == active { "*" } else { " " };
                writeln!(out, "{marker} {name}")?;
            }
        }
        ShortcutsAction::Apply { preset } => {
            manager.apply_preset(preset)?;
            manager
                .export_config()
                .save(shortcuts_file)
                .with_context(|| format!("failed to write {}", shortcuts_file.display()))?;
            writeln!(out, "Shortcut preset '{preset}' applied")?;
        }
    }
    Ok(())
}
