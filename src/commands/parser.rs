//! Command line definition
//!
//! `tpm` with no subcommand starts the interactive UI; the subcommands are
//! one-shot, scriptable versions of the same operations.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::core::query::SortField;
use crate::storage::ExportFormat;

fn parse_sort_field(value: &str) -> Result<SortField, String> {
    SortField::from_name(value).ok_or_else(|| {
        let known: Vec<&str> = SortField::ALL.iter().map(|f| f.label()).collect();
        format!("unknown sort field '{value}' (expected one of: {})", known.join(", "))
    })
}

fn parse_format(value: &str) -> Result<ExportFormat, String> {
    value.parse::<ExportFormat>().map_err(|e| e.to_string())
}

/// Shortcut inspection and preset switching
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ShortcutsAction {
    /// List bindings, optionally for one context
    List {
        /// Context name (global, processes, details, stats, settings, help, filter, search)
        #[arg(long)]
        context: Option<String>,
    },
    /// Show keys bound more than once in the same context
    Conflicts,
    /// List available presets
    Presets,
    /// Switch to a preset and persist it
    Apply {
        #[arg(value_name = "PRESET")]
        preset: String,
    },
}

/// Configuration file management
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus TPM_* overrides)
    Show,
    /// Print the files tpm reads and writes
    Path,
    /// Overwrite the configuration with defaults
    Reset,
}

/// Snapshot backups under the data directory
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BackupAction {
    /// Back up the current process list together with the configuration
    Create,
    /// List backup files, newest first
    List,
    /// Make a backup the persisted snapshot the UI starts from
    Restore {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Also overwrite the configuration with the one stored in the backup
        #[arg(long)]
        with_config: bool,
    },
}

/// TPM - terminal process manager
#[derive(Parser, Debug, Clone)]
#[command(
    name = "tpm",
    about = "Interactive process viewer with context-sensitive shortcuts",
    version,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `tpm=trace` (overrides TPM_LOG)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,

    /// State directory (default: ~/.tpm)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Start the interactive UI (default)
    Tui,

    /// Print a process listing
    List {
        /// Sort field (cpu, memory, pid, name, status, user, threads, nice)
        #[arg(long, value_parser = parse_sort_field, default_value = "cpu")]
        sort: SortField,
        /// Ascending order (default is descending)
        #[arg(long)]
        asc: bool,
        /// Case-insensitive match on name, command or user
        #[arg(long)]
        search: Option<String>,
        /// Include system processes
        #[arg(long)]
        all: bool,
        /// Print at most N rows
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Write the current process list to a file
    Export {
        #[arg(long, value_parser = parse_format, default_value = "json")]
        format: ExportFormat,
        /// Destination (default: <data dir>/exports/processes_export_<ts>.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Read an exported snapshot and summarize it
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Format; inferred from the extension when omitted
        #[arg(long, value_parser = parse_format)]
        format: Option<ExportFormat>,
    },

    /// Terminate a process
    Kill {
        #[arg(value_name = "PID")]
        pid: u32,
        /// SIGKILL instead of SIGTERM
        #[arg(long, short)]
        force: bool,
    },

    /// Snapshot backups
    #[command(subcommand)]
    Backup(BackupAction),

    /// Keyboard shortcut management
    #[command(subcommand)]
    Shortcuts(ShortcutsAction),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigAction),
}

impl Cli {
    /// Parse process arguments; clap prints usage and exits on error.
    pub fn parse_args() -> Self {
        Self::parse_args_from(std::env::args_os())
    }

    pub fn try_parse_args_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Cli::try_parse_from(iter)
    }

    pub fn parse_args_from<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match Self::try_parse_args_from(iter) {
            Ok(cli) => cli,
            Err(err) => err.exit(),
        }
    }

    /// The requested command, defaulting to the interactive UI.
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Tui)
    }
}
