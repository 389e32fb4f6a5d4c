//! Keyboard shortcut engine
//!
//! - [`ShortcutKey`] / [`Context`]: canonical key and dispatch scope
//! - [`ShortcutRegistry`]: per-context storage plus conflict index
//! - [`ShortcutManager`]: context-then-global resolution, editing, presets
//! - [`ShortcutConfig`]: persisted form of the bindings
//! - [`ActionTable`]: action id → command producer

mod actions;
mod config;
mod context;
pub mod defaults;
pub mod help;
mod key;
mod manager;
mod registry;

pub use actions::{ActionTable, CommandProducer};
pub use config::{ShortcutConfig, ShortcutConfigItem};
pub use context::Context;
pub use key::{Modifier, ShortcutKey};
pub use manager::ShortcutManager;
pub use registry::{Conflict, Shortcut, ShortcutRegistry};
