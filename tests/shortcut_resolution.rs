//! Shortcut lookup, shadowing and conflict reporting

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tpm::shortcuts::{
    ActionTable, Context, Modifier, Shortcut, ShortcutKey, ShortcutManager, ShortcutRegistry,
};
use tpm::tui::{builtin_actions, Command, Mode, ViewAction};
use tpm::ShortcutError;

fn registry(shortcuts: Vec<Shortcut>) -> ShortcutRegistry {
    let mut registry = ShortcutRegistry::new();
    for shortcut in shortcuts {
        registry.register(shortcut);
    }
    registry
}

#[test]
fn context_binding_shadows_global() {
    let mut manager = ShortcutManager::new(registry(vec![
        Shortcut::new("c", "close", "Close", Context::Global),
        Shortcut::new("c", "sort_cpu", "Sort by CPU", Context::Processes),
    ]));
    let key = ShortcutKey::parse("c");

    manager.set_context(Context::Processes);
    assert_eq!(manager.resolve(&key).unwrap().action, "sort_cpu");

    manager.set_context(Context::Details);
    assert_eq!(manager.resolve(&key).unwrap().action, "close");

    // Cross-context reuse is shadowing, not a conflict.
    assert!(manager.conflicts().is_empty());
    assert_eq!(manager.conflicts_for(&key).len(), 2);
}

#[test]
fn disabled_shortcuts_are_invisible() {
    let mut manager = ShortcutManager::new(registry(vec![
        Shortcut::new("x", "global_x", "", Context::Global),
        Shortcut::new("x", "local_x", "", Context::Stats).disabled(),
    ]));
    manager.set_context(Context::Stats);
    let key = ShortcutKey::parse("x");
    assert_eq!(manager.resolve(&key).unwrap().action, "global_x");
    assert!(manager.resolve_local(&key).is_none());
}

#[test]
fn duplicate_key_in_one_context_is_a_conflict() {
    let manager = ShortcutManager::new(registry(vec![
        Shortcut::new("ctrl+k", "kill_process", "", Context::Processes),
        Shortcut::new("Ctrl+K", "kill_other", "", Context::Processes),
        Shortcut::new("k", "other", "", Context::Processes),
    ]));
    let conflicts = manager.conflicts();
    // Base keys compare case-sensitively: "ctrl+k" and "Ctrl+K" differ in base.
    assert!(conflicts.is_empty());

    let manager = ShortcutManager::new(registry(vec![
        Shortcut::new("ctrl+k", "kill_process", "", Context::Processes),
        Shortcut::new("control+k", "kill_other", "", Context::Processes),
    ]));
    let conflicts = manager.conflicts();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].context, Context::Processes);
    assert!(conflicts[0].shortcuts.len() >= 2);
}

#[test]
fn create_shortcut_rejects_empty_and_taken_keys() {
    let mut manager = ShortcutManager::default();
    assert_eq!(
        manager.create_shortcut("", "noop", "", Context::Global),
        Err(ShortcutError::EmptyKey)
    );

    let before = manager.registry().len();
    let err = manager
        .create_shortcut("ctrl+k", "other", "", Context::Processes)
        .unwrap_err();
    assert!(matches!(err, ShortcutError::Conflict { .. }));
    assert_eq!(manager.registry().len(), before);

    manager
        .create_shortcut("ctrl+k", "kill_from_stats", "", Context::Stats)
        .unwrap();
    assert_eq!(manager.registry().len(), before + 1);
}

#[test]
fn text_contexts_do_not_fall_back_to_global() {
    let mut manager = ShortcutManager::default();
    let actions = builtin_actions();
    let q = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
    let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

    manager.set_context(Context::Processes);
    assert_eq!(manager.handle_key(&q, &actions), Some(Command::Quit));
    assert_eq!(
        manager.handle_key(&enter, &actions),
        Some(Command::SwitchMode(Mode::Details))
    );

    manager.set_context(Context::Search);
    assert_eq!(manager.handle_key(&q, &actions), None);
    assert_eq!(
        manager.handle_key(&enter, &actions),
        Some(Command::View(ViewAction::SubmitInput))
    );
}

#[test]
fn unknown_action_resolves_to_nothing() {
    let manager = ShortcutManager::new(registry(vec![Shortcut::new(
        "z",
        "teleport",
        "",
        Context::Global,
    )]));
    let actions: ActionTable<Command> = ActionTable::new();
    let z = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
    assert_eq!(manager.handle_key(&z, &actions), None);
}

#[test]
fn resolve_conflict_keeps_one_context() {
    let mut manager = ShortcutManager::new(registry(vec![
        Shortcut::new("f2", "a", "", Context::Global),
        Shortcut::new("f2", "b", "", Context::Details),
        Shortcut::new("f2", "c", "", Context::Stats),
    ]));
    assert_eq!(manager.resolve_conflict("f2", Context::Details), 2);
    let key = ShortcutKey::parse("f2");
    manager.set_context(Context::Stats);
    assert!(manager.resolve(&key).is_none());
    manager.set_context(Context::Details);
    assert_eq!(manager.resolve(&key).unwrap().action, "b");
}

fn modifier_names() -> impl Strategy<Value = Vec<&'static str>> {
    proptest::sample::subsequence(vec!["ctrl", "alt", "shift"], 0..=3).prop_shuffle()
}

proptest! {
    #[test]
    fn modifier_order_does_not_matter(mods in modifier_names(), base in "[a-z0-9]") {
        let forward = format!("{}{}", mods.iter().map(|m| format!("{m}+")).collect::<String>(), base);
        let reversed = format!(
            "{}{}",
            mods.iter().rev().map(|m| format!("{m}+")).collect::<String>(),
            base
        );
        let a = ShortcutKey::parse(&forward);
        let b = ShortcutKey::parse(&reversed);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(a.base(), base.as_str());

        let expected = Modifier::from_flags(
            mods.contains(&"ctrl"),
            mods.contains(&"alt"),
            mods.contains(&"shift"),
        );
        prop_assert_eq!(a.modifier(), expected);
        // Canonical display parses back to the same key.
        prop_assert_eq!(ShortcutKey::parse(&a.to_string()), a);
    }
}
