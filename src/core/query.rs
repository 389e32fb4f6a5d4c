//! Filter and sort value objects applied to every refreshed snapshot

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::models::ProcessInfo;
use crate::error::{errors, TpmResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortField {
    #[default]
    Cpu,
    Memory,
    Pid,
    Name,
    Status,
    User,
    Threads,
    Nice,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Cpu,
        SortField::Memory,
        SortField::Pid,
        SortField::Name,
        SortField::Status,
        SortField::User,
        SortField::Threads,
        SortField::Nice,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortField::Cpu => "cpu",
            SortField::Memory => "memory",
            SortField::Pid => "pid",
            SortField::Name => "name",
            SortField::Status => "status",
            SortField::User => "user",
            SortField::Threads => "threads",
            SortField::Nice => "nice",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|field| field.label() == name).or(match name.as_str() {
            "mem" => Some(SortField::Memory),
            "username" => Some(SortField::User),
            _ => None,
        })
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Asc => "↑",
            SortOrder::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl ProcessSort {
    pub fn new(field: SortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Same field flips the order; a new field starts descending.
    pub fn select(&mut self, field: SortField) {
        if self.field == field {
            self.order = self.order.flipped();
        } else {
            self.field = field;
            self.order = SortOrder::Desc;
        }
    }

    /// Ties are always broken by ascending PID so the order is stable.
    pub fn compare(&self, a: &ProcessInfo, b: &ProcessInfo) -> Ordering {
        let primary = match self.field {
            SortField::Cpu => a.cpu.total_cmp(&b.cpu),
            SortField::Memory => a.memory.total_cmp(&b.memory),
            SortField::Pid => a.pid.cmp(&b.pid),
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Status => a.status.cmp(&b.status),
            SortField::User => a.username.cmp(&b.username),
            SortField::Threads => a.num_threads.cmp(&b.num_threads),
            SortField::Nice => a.nice.cmp(&b.nice),
        };
        let primary = match self.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        primary.then_with(|| a.pid.cmp(&b.pid))
    }

    pub fn apply(&self, processes: &mut [ProcessInfo]) {
        processes.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for ProcessSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.order.arrow())
    }
}

/// Absent bounds do not constrain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessFilter {
    pub search: String,
    pub min_cpu: Option<f64>,
    pub max_cpu: Option<f64>,
    pub min_memory: Option<f64>,
    pub max_memory: Option<f64>,
    pub status: Option<String>,
    pub username: Option<String>,
    pub show_system: bool,
}

impl ProcessFilter {
    pub fn matches(&self, process: &ProcessInfo) -> bool {
        if !self.search.is_empty() {
            let needle = self.search.to_lowercase();
            let hit = process.name.to_lowercase().contains(&needle)
                || process.command.to_lowercase().contains(&needle)
                || process.username.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if self.min_cpu.is_some_and(|min| process.cpu < min)
            || self.max_cpu.is_some_and(|max| process.cpu > max)
            || self.min_memory.is_some_and(|min| process.memory < min)
            || self.max_memory.is_some_and(|max| process.memory > max)
        {
            return false;
        }
        if let Some(status) = &self.status {
            if !process.status.eq_ignore_ascii_case(status) {
                return false;
            }
        }
        if let Some(username) = &self.username {
            if &process.username != username {
                return false;
            }
        }
        self.show_system || !process.is_system()
    }

    /// True when anything beyond the show-system flag narrows the list.
    pub fn is_narrowing(&self) -> bool {
        !self.search.is_empty()
            || self.min_cpu.is_some()
            || self.max_cpu.is_some()
            || self.min_memory.is_some()
            || self.max_memory.is_some()
            || self.status.is_some()
            || self.username.is_some()
    }

    /// Drop every constraint except the show-system flag.
    pub fn clear(&mut self) {
        *self = Self {
            show_system: self.show_system,
            ..Self::default()
        };
    }

    /// Parse the advanced-filter prompt, e.g.
    /// `cpu>5 mem<50 user=root status=running system=on chrome`.
    ///
    /// Words that are not `key<op>value` terms form the search string.
    pub fn parse_expression(input: &str, show_system: bool) -> TpmResult<Self> {
        let mut filter = Self {
            show_system,
            ..Self::default()
        };
        let mut words = Vec::new();

        for token in input.split_whitespace() {
            let Some(idx) = token.find(['>', '<', '=']) else {
                words.push(token);
                continue;
            };
            let (key, rest) = token.split_at(idx);
            let op = &rest[..1];
            let value = &rest[1..];
            match (key.to_ascii_lowercase().as_str(), op) {
                ("cpu", ">") => filter.min_cpu = Some(parse_number("cpu", value)?),
                ("cpu", "<") => filter.max_cpu = Some(parse_number("cpu", value)?),
                ("mem" | "memory", ">") => filter.min_memory = Some(parse_number("mem", value)?),
                ("mem" | "memory", "<") => filter.max_memory = Some(parse_number("mem", value)?),
                ("user" | "username", "=") => filter.username = Some(value.to_string()),
                ("status", "=") => filter.status = Some(value.to_string()),
                ("system", "=") => {
                    filter.show_system = match value.to_ascii_lowercase().as_str() {
                        "on" | "yes" | "true" | "1" => true,
                        "off" | "no" | "false" | "0" => false,
                        other => {
                            return Err(errors::validation_error(
                                "system",
                                format!("expected on/off, got '{other}'"),
                            ))
                        }
                    }
                }
                _ => {
                    return Err(errors::validation_error(
                        "filter",
                        format!("unsupported term '{token}'"),
                    ))
                }
            }
        }

        filter.search = words.join(" ");
        Ok(filter)
    }

    /// Compact description for the status line, e.g. `"cpu>5 user=root"`.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("\"{}\"", self.search));
        }
        if let Some(v) = self.min_cpu {
            parts.push(format!("cpu>{v}"));
        }
        if let Some(v) = self.max_cpu {
            parts.push(format!("cpu<{v}"));
        }
        if let Some(v) = self.min_memory {
            parts.push(format!("mem>{v}"));
        }
        if let Some(v) = self.max_memory {
            parts.push(format!("mem<{v}"));
        }
        if let Some(v) = &self.status {
            parts.push(format!("status={v}"));
        }
        if let Some(v) = &self.username {
            parts.push(format!("user={v}"));
        }
        if self.show_system {
            parts.push("system=on".to_string());
        }
        parts.join(" ")
    }
}

fn parse_number(field: &str, value: &str) -> TpmResult<f64> {
    value
        .trim_end_matches('%')
        .parse::<f64>()
        .map_err(|_| errors::validation_error(field, format!("'{value}' is not a number")))
}

/// Filter + sort handed to the refresh pipeline.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessQuery {
    pub filter: ProcessFilter,
    pub sort: ProcessSort,
}

impl ProcessQuery {
    pub fn new(filter: ProcessFilter, sort: ProcessSort) -> Self {
        Self { filter, sort }
    }

    pub fn apply(&self, processes: Vec<ProcessInfo>) -> Vec<ProcessInfo> {
        let mut selected: Vec<ProcessInfo> = processes
            .into_iter()
            .filter(|process| self.filter.matches(process))
            .collect();
        self.sort.apply(&mut selected);
        selected
    }
}
