//! One-shot process commands: list, export, import, kill

use std::io::Write;
use std::path::Path;

use anyhow::{Context as _, Result};
use tracing::info;

use crate::core::models::ProcessInfo;
use crate::core::provider::ProcessProvider;
use crate::core::query::{ProcessFilter, ProcessQuery, ProcessSort, SortField, SortOrder};
use crate::core::stats::ProcessStats;
use crate::storage::{ExportFormat, SnapshotStore};
use crate::tui::screens::truncate;

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort: SortField,
    pub ascending: bool,
    pub search: Option<String>,
    pub include_system: bool,
    pub limit: Option<usize>,
    pub json: bool,
}

impl ListOptions {
    fn query(&self) -> ProcessQuery {
        let filter = ProcessFilter {
            search: self.search.clone().unwrap_or_default(),
            show_system: self.include_system,
            ..ProcessFilter::default()
        };
        let order = if self.ascending {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };
        ProcessQuery::new(filter, ProcessSort::new(self.sort, order))
    }
}

pub fn list(provider: &dyn ProcessProvider, options: &ListOptions, out: &mut impl Write) -> Result<()> {
    let mut processes = options.query().apply(provider.list()?);
    if let Some(limit) = options.limit {
        processes.truncate(limit);
    }

    if options.json {
        let json = ExportFormat::Json.encode(&processes)?;
        writeln!(out, "{json}")?;
        return Ok(());
    }
    write_table(&processes, out)
}

fn write_table(processes: &[ProcessInfo], out: &mut impl Write) -> Result<()> {
    writeln!(
        out,
        "{:>7} {:<24} {:>6} {:>6} {:>10} {:<10} {}",
        "PID", "NAME", "CPU%", "MEM%", "MEM", "STATUS", "USER"
    )?;
    for p in processes {
        writeln!(
            out,
            "{:>7} {:<24} {:>6.1} {:>6.1} {:>10} {:<10} {}",
            p.pid,
            truncate(&p.name, 24),
            p.cpu,
            p.memory,
            p.memory_display(),
            truncate(&p.status, 10),
            p.username
        )?;
    }
    Ok(())
}

/// Export every process, heaviest CPU users first.
pub fn export(
    provider: &dyn ProcessProvider,
    store: &SnapshotStore,
    format: ExportFormat,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let mut processes = provider.list()?;
    ProcessSort::default().apply(&mut processes);

    let path = match output {
        Some(path) => {
            store.export_to(&processes, format, path)?;
            path.to_path_buf()
        }
        None => store.export(&processes, format)?,
    };
    writeln!(out, "Exported {} processes to {}", processes.len(), path.display())?;
    Ok(())
}

pub fn import(
    store: &SnapshotStore,
    file: &Path,
    format: Option<ExportFormat>,
    out: &mut impl Write,
) -> Result<()> {
    let format = format.unwrap_or_else(|| ExportFormat::from_path(file));
    let processes = store
        .import(file, format)
        .with_context(|| format!("failed to import {}", file.display()))?;

    let stats = ProcessStats::compute(&processes);
    writeln!(out, "Imported {} processes from {}", stats.total, file.display())?;
    writeln!(out, "  running:      {}", stats.running)?;
    writeln!(out, "  total cpu:    {:.2}%", stats.total_cpu)?;
    writeln!(out, "  total memory: {:.2}%", stats.total_memory)?;
    if let Some(top) = stats.top_cpu.first() {
        writeln!(out, "  top cpu:      {} (PID {}) {:.2}%", top.name, top.pid, top.cpu)?;
    }
    Ok(())
}

pub fn kill(
    provider: &dyn ProcessProvider,
    pid: u32,
    force: bool,
    out: &mut impl Write,
) -> Result<()> {
    provider
        .kill(pid, force)
        .with_context(|| format!("failed to signal process {pid}"))?;
    info!(pid, force, "signal sent");
    let signal = if force { "SIGKILL" } else { "SIGTERM" };
    writeln!(out, "Sent {signal} to {pid}")?;
    Ok(())
}
