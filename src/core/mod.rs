//! Process model, querying and enumeration
//!
//! Everything here is independent of the terminal: the TUI and the CLI
//! subcommands both build on it.

pub mod models;
pub mod process_tree;
pub mod provider;
pub mod query;
pub mod stats;

pub use models::ProcessInfo;
pub use process_tree::ProcessTree;
pub use provider::{ProcessProvider, SysinfoProvider};
pub use query::{ProcessFilter, ProcessQuery, ProcessSort, SortField, SortOrder};
pub use stats::ProcessStats;
