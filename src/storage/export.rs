//! Snapshot encodings
//!
//! JSON is the serde shape of `Vec<ProcessInfo>`. CSV is a fixed
//! thirteen-column table that spreadsheets can open directly.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::models::ProcessInfo;
use crate::error::{errors, TpmError, TpmResult};

pub const CSV_HEADER: [&str; 13] = [
    "PID",
    "PPID",
    "Name",
    "Status",
    "CPU%",
    "Memory%",
    "MemoryBytes",
    "Username",
    "Command",
    "WorkingDir",
    "NumThreads",
    "Nice",
    "CreateTime",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// Guess from a file extension, defaulting to JSON.
    pub fn from_path(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
            _ => ExportFormat::Json,
        }
    }

    pub fn encode(self, processes: &[ProcessInfo]) -> TpmResult<String> {
        match self {
            ExportFormat::Json => serde_json::to_string_pretty(processes)
                .map_err(|e| errors::export_error("json", e.to_string())),
            ExportFormat::Csv => encode_csv(processes),
        }
    }

    pub fn decode(self, data: &str) -> TpmResult<Vec<ProcessInfo>> {
        match self {
            ExportFormat::Json => serde_json::from_str(data)
                .map_err(|e| errors::export_error("json", e.to_string())),
            ExportFormat::Csv => decode_csv(data),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = TpmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(errors::validation_error(
                "format",
                format!("unsupported export format '{other}'"),
            )),
        }
    }
}

fn encode_csv(processes: &[ProcessInfo]) -> TpmResult<String> {
    let csv_error = |e: csv::Error| errors::export_error("csv", e.to_string());
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(csv_error)?;
    for process in processes {
        writer
            .write_record([
                process.pid.to_string(),
                process.ppid.to_string(),
                process.name.clone(),
                process.status.clone(),
                format!("{:.2}", process.cpu),
                format!("{:.2}", process.memory),
                process.memory_bytes.to_string(),
                process.username.clone(),
                process.command.clone(),
                process.working_dir.clone(),
                process.num_threads.to_string(),
                process.nice.to_string(),
                process.create_time.to_rfc3339(),
            ])
            .map_err(csv_error)?;
    }
    let data = writer
        .into_inner()
        .map_err(|e| errors::export_error("csv", e.to_string()))?;
    String::from_utf8(data).map_err(|e| errors::export_error("csv", e.to_string()))
}

/// Rows with fewer than thirteen columns are rejected; unparsable numeric
/// cells fall back to zero.
fn decode_csv(data: &str) -> TpmResult<Vec<ProcessInfo>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut processes = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| {
            errors::export_error("csv", format!("failed to read CSV record: {e}"))
        })?;
        if record.len() < CSV_HEADER.len() {
            return Err(errors::export_error(
                "csv",
                format!(
                    "record {} has {} columns, expected {}",
                    index + 1,
                    record.len(),
                    CSV_HEADER.len()
                ),
            ));
        }
        let field = |i: usize| record.get(i).unwrap_or_default();
        let create_time = DateTime::parse_from_rfc3339(field(12))
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(|_| {
                warn!(row = index + 1, value = field(12), "unparsable create time");
                DateTime::<Utc>::default()
            });
        processes.push(ProcessInfo {
            pid: field(0).parse().unwrap_or_default(),
            ppid: field(1).parse().unwrap_or_default(),
            name: field(2).to_string(),
            status: field(3).to_string(),
            cpu: field(4).parse().unwrap_or_default(),
            memory: field(5).parse().unwrap_or_default(),
            memory_bytes: field(6).parse().unwrap_or_default(),
            username: field(7).to_string(),
            command: field(8).to_string(),
            working_dir: field(9).to_string(),
            num_threads: field(10).parse().unwrap_or_default(),
            nice: field(11).parse().unwrap_or_default(),
            is_running: field(3).eq_ignore_ascii_case("run")
                || field(3).eq_ignore_ascii_case("runnable"),
            create_time,
        });
    }
    debug!(count = processes.len(), "decoded csv snapshot");
    Ok(processes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn sample() -> ProcessInfo {
        ProcessInfo {
            pid: 42,
            ppid: 1,
            name: "worker, \"quoted\"".into(),
            status: "Run".into(),
            cpu: 12.346,
            memory: 1.5,
            memory_bytes: 4096,
            create_time: DateTime::parse_from_rfc3339("2024-05-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            username: "alice".into(),
            command: "worker --jobs 4".into(),
            working_dir: "/srv".into(),
            num_threads: 4,
            nice: -5,
            is_running: true,
        }
    }

    #[test]
    fn csv_has_fixed_header_and_two_decimals() {
        let csv = ExportFormat::Csv.encode(&[sample()]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "PID,PPID,Name,Status,CPU%,Memory%,MemoryBytes,Username,Command,WorkingDir,NumThreads,Nice,CreateTime"
        );
        let row = lines.next().unwrap();
        assert!(row.contains(",12.35,1.50,4096,"));
        assert!(row.contains("2024-05-01T10:00:00+00:00"));
    }

    #[test]
    fn csv_import_reads_quoted_fields() {
        let csv = ExportFormat::Csv.encode(&[sample()]).unwrap();
        let imported = ExportFormat::Csv.decode(&csv).unwrap();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].name, "worker, \"quoted\"");
        assert_eq!(imported[0].nice, -5);
        assert!(imported[0].is_running);
    }

    #[test]
    fn short_rows_are_rejected() {
        let data = "PID,PPID,Name\n1,0,init\n";
        let err = ExportFormat::Csv.decode(data).unwrap_err();
        assert!(err.to_string().contains("expected 13"));
    }

    #[test]
    fn header_only_csv_is_an_empty_snapshot() {
        let data = format!("{}\n", CSV_HEADER.join(","));
        assert!(ExportFormat::Csv.decode(&data).unwrap().is_empty());
    }

    #[test_case("json", ExportFormat::Json)]
    #[test_case("CSV", ExportFormat::Csv)]
    #[test_case(" csv ", ExportFormat::Csv)]
    fn parses_format_names(input: &str, expected: ExportFormat) {
        assert_eq!(input.parse::<ExportFormat>().unwrap(), expected);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
