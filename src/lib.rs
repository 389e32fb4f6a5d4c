//! TPM library
//!
//! Terminal process manager: process enumeration and control, a
//! context-sensitive keyboard shortcut engine and a ratatui front end.

pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod platform;
pub mod shortcuts;
pub mod storage;
pub mod tui;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::AppConfig;
pub use core::models::ProcessInfo;
pub use core::provider::{ProcessProvider, SysinfoProvider};
pub use core::query::{ProcessFilter, ProcessQuery, ProcessSort, SortField, SortOrder};
pub use error::{ShortcutError, TpmError, TpmResult};
pub use shortcuts::{Context, ShortcutKey, ShortcutManager};
pub use storage::{ExportFormat, SnapshotStore};
