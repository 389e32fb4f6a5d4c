//! Utilities
//!
//! Paths, logging and small path helpers shared by the TUI and the CLI.

pub mod config_paths;
pub mod logger;

pub use config_paths::ConfigPaths;
pub use logger::init_logger;

use std::path::PathBuf;

/// Expand a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_tilde_prefix() {
        let expanded = expand_home("~/.tpm");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expanded, home.join(".tpm"));
        }
        assert_eq!(expand_home("/var/tmp"), PathBuf::from("/var/tmp"));
        assert_eq!(expand_home("relative/~"), PathBuf::from("relative/~"));
    }
}
