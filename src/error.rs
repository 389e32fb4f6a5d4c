//! Unified error handling for tpm
//!
//! Every failure the event loop can observe is classified here so that it can
//! be rendered as a status message instead of unwinding through the loop.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::shortcuts::Context;

/// Main error type for the application
#[derive(Error, Debug)]
pub enum TpmError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Process enumeration / termination errors
    #[error("Process error: {message}")]
    Process {
        message: String,
        pid: Option<u32>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Snapshot export / import errors
    #[error("Export error ({format}): {message}")]
    Export {
        message: String,
        format: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Filesystem errors
    #[error("Filesystem error: {message} (path: {path})")]
    Filesystem {
        message: String,
        path: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Shortcut registration errors
    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    /// TUI errors
    #[error("TUI error: {message}")]
    Tui {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Unknown errors
    #[error("Unknown error: {message}")]
    Unknown {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Rejections raised while editing the shortcut set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShortcutError {
    #[error("Shortcut key cannot be empty")]
    EmptyKey,
    #[error("Key '{key}' is already bound to '{existing}' in {context} context")]
    Conflict {
        key: String,
        context: Context,
        existing: String,
    },
    #[error("No shortcut bound to '{key}' in {context} context")]
    NotFound { key: String, context: Context },
    #[error("Unknown shortcut preset: {0}")]
    UnknownPreset(String),
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Config,
    Process,
    Export,
    Filesystem,
    Shortcut,
    Tui,
    Validation,
    Unknown,
}

impl ErrorCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ErrorCategory::Config => "Configuration",
            ErrorCategory::Process => "Process",
            ErrorCategory::Export => "Export",
            ErrorCategory::Filesystem => "Filesystem",
            ErrorCategory::Shortcut => "Shortcut",
            ErrorCategory::Tui => "Terminal UI",
            ErrorCategory::Validation => "Validation",
            ErrorCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Payload handed to the UI when an error has to be shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub title: String,
    pub message: String,
    pub hint: Option<String>,
}

impl TpmError {
    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            TpmError::Config { .. } => ErrorCategory::Config,
            TpmError::Process { .. } => ErrorCategory::Process,
            TpmError::Export { .. } => ErrorCategory::Export,
            TpmError::Filesystem { .. } => ErrorCategory::Filesystem,
            TpmError::Shortcut(_) => ErrorCategory::Shortcut,
            TpmError::Tui { .. } => ErrorCategory::Tui,
            TpmError::Validation { .. } => ErrorCategory::Validation,
            TpmError::Unknown { .. } => ErrorCategory::Unknown,
        }
    }

    /// Short message suitable for a one-line status bar
    pub fn user_message(&self) -> String {
        match self {
            TpmError::Config { message, .. } => format!("Configuration problem: {message}"),
            TpmError::Process { message, pid, .. } => match pid {
                Some(pid) => format!("PID {pid}: {message}"),
                None => message.clone(),
            },
            TpmError::Export {
                message, format, ..
            } => format!("{format} export failed: {message}"),
            TpmError::Filesystem { message, path, .. } => format!("{message} ({path})"),
            TpmError::Shortcut(err) => err.to_string(),
            TpmError::Tui { message, .. } => message.clone(),
            TpmError::Validation { message, field } => match field {
                Some(field) => format!("Invalid {field}: {message}"),
                None => message.clone(),
            },
            TpmError::Unknown { message, .. } => message.clone(),
        }
    }

    pub fn to_user_facing(&self) -> UserFacingError {
        let hint = match self {
            TpmError::Config { .. } => {
                Some("Check ~/.tpm/config.yaml or run `tpm config reset`.".to_string())
            }
            TpmError::Process { .. } => Some(
                "The process may have exited or belong to another user; try again with elevated privileges."
                    .to_string(),
            ),
            TpmError::Export { .. } | TpmError::Filesystem { .. } => {
                Some("Ensure the data directory exists and is writable.".to_string())
            }
            TpmError::Shortcut(_) => {
                Some("Pick a different key or disable the existing binding first.".to_string())
            }
            TpmError::Tui { .. } => Some("Run tpm from an interactive terminal.".to_string()),
            TpmError::Validation { .. } => None,
            TpmError::Unknown { .. } => Some("See the log file for details.".to_string()),
        };

        UserFacingError {
            title: format!("{} Error", self.category().display_name()),
            message: self.user_message(),
            hint,
        }
    }
}

impl From<io::Error> for TpmError {
    fn from(err: io::Error) -> Self {
        TpmError::Filesystem {
            message: err.to_string(),
            path: String::new(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<anyhow::Error> for TpmError {
    fn from(err: anyhow::Error) -> Self {
        TpmError::Unknown {
            message: format!("{err:#}"),
            source: None,
        }
    }
}

/// Result type alias for convenience
pub type TpmResult<T> = Result<T, TpmError>;

/// Helper constructors
pub mod errors {
    use super::TpmError;

    pub fn config_error(message: impl Into<String>) -> TpmError {
        TpmError::Config {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_error_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> TpmError {
        TpmError::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn process_error(pid: Option<u32>, message: impl Into<String>) -> TpmError {
        TpmError::Process {
            message: message.into(),
            pid,
            source: None,
        }
    }

    pub fn export_error(format: impl Into<String>, message: impl Into<String>) -> TpmError {
        TpmError::Export {
            message: message.into(),
            format: format.into(),
            source: None,
        }
    }

    pub fn filesystem_error(
        path: &std::path::Path,
        source: std::io::Error,
    ) -> TpmError {
        TpmError::Filesystem {
            message: source.to_string(),
            path: path.display().to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> TpmError {
        TpmError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn tui_error(message: impl Into<String>) -> TpmError {
        TpmError::Tui {
            message: message.into(),
            source: None,
        }
    }
}
