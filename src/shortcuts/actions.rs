//! Action id → command lookup
//!
//! Shortcut records only carry an action id so they stay serializable. The
//! table maps each id to a pure producer of whatever command type the caller
//! dispatches.

use std::collections::HashMap;

pub type CommandProducer<C> = fn() -> C;

pub struct ActionTable<C> {
    handlers: HashMap<String, CommandProducer<C>>,
}

impl<C> Default for ActionTable<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> ActionTable<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, action: &str, producer: CommandProducer<C>) -> &mut Self {
        if self.handlers.insert(action.to_string(), producer).is_some() {
            tracing::debug!(action, "replaced action handler");
        }
        self
    }

    pub fn with(mut self, action: &str, producer: CommandProducer<C>) -> Self {
        self.register(action, producer);
        self
    }

    pub fn resolve(&self, action: &str) -> Option<C> {
        self.handlers.get(action).map(|produce| produce())
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Cmd {
        Quit,
        Help,
    }

    #[test]
    fn resolves_registered_actions_only() {
        let table: ActionTable<Cmd> = ActionTable::new()
            .with("quit", || Cmd::Quit)
            .with("help", || Cmd::Help);

        assert_eq!(table.resolve("quit"), Some(Cmd::Quit));
        assert_eq!(table.resolve("help"), Some(Cmd::Help));
        assert_eq!(table.resolve("launch"), None);
        assert!(table.contains("help"));
    }
}
