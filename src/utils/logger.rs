//! Logging setup
//!
//! The TUI owns the terminal, so interactive runs log to a file only;
//! CLI subcommands log to stderr.

use anyhow::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::common::constants::env;

/// Where log lines go.
#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Install the global tracing subscriber.
///
/// `log_level` wins over `TPM_LOG`, which wins over `RUST_LOG`. Without any
/// of them stderr only shows warnings, while the log file gets info from
/// dependencies and debug from this crate.
///
/// # Examples
/// ```no_run
/// use tpm::utils::logger::{init_logger, LogTarget};
///
/// init_logger(None, LogTarget::Stderr).unwrap();
/// ```
pub fn init_logger(log_level: Option<&str>, target: LogTarget) -> Result<()> {
    let fallback = match target {
        LogTarget::Stderr => "warn",
        LogTarget::File(_) => "info,tpm=debug",
    };
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_env(env::LOG)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(fallback)),
    };

    let registry = tracing_subscriber::registry().with(env_filter);

    match target {
        LogTarget::Stderr => {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .compact();
            registry.with(fmt_layer).try_init()?;
        }
        LogTarget::File(log_path) => {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)?;

            // no ANSI colours in files
            let file_layer = fmt::layer()
                .with_writer(std::sync::Arc::new(file))
                .with_target(true)
                .with_ansi(false)
                .with_level(true);
            registry.with(file_layer).try_init()?;
        }
    }

    tracing::info!("Logger initialized");
    Ok(())
}
