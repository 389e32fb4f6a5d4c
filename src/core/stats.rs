//! Aggregate statistics over one snapshot

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::models::{format_bytes, ProcessInfo};
use super::query::{ProcessSort, SortField, SortOrder};

const TOP_USERS: usize = 10;
const TOP_PROCESSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessStats {
    pub total: usize,
    pub running: usize,
    pub total_cpu: f64,
    pub total_memory: f64,
    pub total_memory_bytes: u64,
    pub avg_cpu: f64,
    pub avg_memory: f64,
    pub status_counts: BTreeMap<String, usize>,
    /// Most active users first, at most ten.
    pub user_counts: Vec<(String, usize)>,
    pub top_cpu: Vec<ProcessInfo>,
    pub top_memory: Vec<ProcessInfo>,
}

impl ProcessStats {
    pub fn compute(processes: &[ProcessInfo]) -> Self {
        let total = processes.len();
        let mut stats = Self {
            total,
            ..Self::default()
        };
        let mut users: HashMap<&str, usize> = HashMap::new();

        for process in processes {
            if process.is_running {
                stats.running += 1;
            }
            stats.total_cpu += process.cpu;
            stats.total_memory += process.memory;
            stats.total_memory_bytes += process.memory_bytes;
            *stats
                .status_counts
                .entry(process.status.clone())
                .or_default() += 1;
            *users.entry(process.username.as_str()).or_default() += 1;
        }

        if total > 0 {
            stats.avg_cpu = stats.total_cpu / total as f64;
            stats.avg_memory = stats.total_memory / total as f64;
        }

        let mut user_counts: Vec<(String, usize)> = users
            .into_iter()
            .map(|(user, count)| (user.to_string(), count))
            .collect();
        user_counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        user_counts.truncate(TOP_USERS);
        stats.user_counts = user_counts;

        stats.top_cpu = top_by(processes, SortField::Cpu);
        stats.top_memory = top_by(processes, SortField::Memory);
        stats
    }

    /// Plain-text report written by the statistics export.
    pub fn report(&self, generated_at: DateTime<Local>) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Process Statistics Report");
        let _ = writeln!(out, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(out);
        let _ = writeln!(out, "Total processes:   {}", self.total);
        let _ = writeln!(out, "Running:           {}", self.running);
        let _ = writeln!(out, "Total CPU:         {:.2}%", self.total_cpu);
        let _ = writeln!(out, "Total memory:      {:.2}% ({})", self.total_memory, format_bytes(self.total_memory_bytes));
        let _ = writeln!(out, "Average CPU:       {:.2}%", self.avg_cpu);
        let _ = writeln!(out, "Average memory:    {:.2}%", self.avg_memory);

        let _ = writeln!(out, "\nStatus breakdown:");
        for (status, count) in &self.status_counts {
            let _ = writeln!(out, "  {status:<16} {count}");
        }

        let _ = writeln!(out, "\nTop users:");
        for (user, count) in &self.user_counts {
            let _ = writeln!(out, "  {user:<16} {count}");
        }

        let _ = writeln!(out, "\nTop CPU:");
        for p in &self.top_cpu {
            let _ = writeln!(out, "  {:>7} {:<24} {:>6.2}%", p.pid, p.name, p.cpu);
        }

        let _ = writeln!(out, "\nTop memory:");
        for p in &self.top_memory {
            let _ = writeln!(out, "  {:>7} {:<24} {:>6.2}% {}", p.pid, p.name, p.memory, p.memory_display());
        }
        out
    }
}

fn top_by(processes: &[ProcessInfo], field: SortField) -> Vec<ProcessInfo> {
    let mut sorted = processes.to_vec();
    ProcessSort::new(field, SortOrder::Desc).apply(&mut sorted);
    sorted.truncate(TOP_PROCESSES);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn process(pid: u32, user: &str, cpu: f64, memory: f64, running: bool) -> ProcessInfo {
        ProcessInfo {
            pid,
            name: format!("proc{pid}"),
            username: user.to_string(),
            status: if running { "Run" } else { "Sleep" }.to_string(),
            cpu,
            memory,
            is_running: running,
            ..Default::default()
        }
    }

    #[test]
    fn aggregates_snapshot() {
        let processes: Vec<ProcessInfo> = (1..=8)
            .map(|pid| {
                let user = if pid % 2 == 0 { "alice" } else { "bob" };
                process(pid, user, pid as f64, 10.0 - pid as f64, pid <= 3)
            })
            .collect();

        let stats = ProcessStats::compute(&processes);
        assert_eq!(stats.total, 8);
        assert_eq!(stats.running, 3);
        assert_eq!(stats.total_cpu, 36.0);
        assert_eq!(stats.avg_cpu, 4.5);
        assert_eq!(stats.status_counts["Run"], 3);
        assert_eq!(stats.status_counts["Sleep"], 5);
        assert_eq!(
            stats.user_counts,
            vec![("alice".to_string(), 4), ("bob".to_string(), 4)]
        );
        let top_cpu: Vec<u32> = stats.top_cpu.iter().map(|p| p.pid).collect();
        assert_eq!(top_cpu, vec![8, 7, 6, 5, 4]);
        let top_mem: Vec<u32> = stats.top_memory.iter().map(|p| p.pid).collect();
        assert_eq!(top_mem, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn empty_snapshot_has_zero_averages() {
        let stats = ProcessStats::compute(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.avg_cpu, 0.0);
        assert!(stats.report(Local::now()).contains("Total processes:   0"));
    }
}
