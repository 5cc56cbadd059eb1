//! Console and JSON-file output of aggregated reject counts.
//!
//! File reports land in `<output_dir>/<domain>/<YYYYMMDD-HHMMSS>.json` and are
//! only written once the whole search has succeeded.

use crate::search::query::REJECT_PHRASE;
use crate::search::types::ResultEntry;
use crate::utils::time::{epoch_to_human_readable, QueryWindow};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

/// Report wrapped with the window the search covered, plus prose describing
/// how the numbers were produced so the file can be read on its own.
#[derive(Debug, Serialize)]
pub struct WindowedReport {
    pub description: String,
    pub query_summary: String,
    pub aggregation_logic: String,
    pub note: String,
    pub start_timestamp: i64,
    pub end_timestamp: i64,
    pub start_time: String,
    pub end_time: String,
    pub results: Vec<ResultEntry>,
}

impl WindowedReport {
    pub fn new(domain: &str, window: &QueryWindow, results: Vec<ResultEntry>) -> Self {
        let start_timestamp = window.start_timestamp();
        let end_timestamp = window.end_timestamp();
        let start_time = epoch_to_human_readable(start_timestamp);
        let end_time = epoch_to_human_readable(end_timestamp);

        let query_summary = format!(
            "- Event Type: {phrase}\n\
             - Domain: {domain}\n\
             - Source: from eduroam.{domain}\n\
             - Time Range: {start} to {end}\n\
             - Data Period: Last {days} days from the query execution date",
            phrase = REJECT_PHRASE,
            domain = domain,
            start = start_time,
            end = end_time,
            days = window.span_days(),
        );

        Self {
            description: format!(
                "Access-Reject events per user for the {} domain, aggregated from RADIUS logs.",
                domain
            ),
            query_summary,
            aggregation_logic: AGGREGATION_LOGIC.to_string(),
            note: NOTE.to_string(),
            start_timestamp,
            end_timestamp,
            start_time,
            end_time,
            results,
        }
    }
}

const AGGREGATION_LOGIC: &str = "1. Searched for \"Access-Reject for user\" lines of the domain inside the time range.\n\
2. Grouped the matching lines by full message with a terms aggregation.\n\
3. Extracted the user identity (user@domain.ac.th) from each message and summed the line counts.\n\
4. Sorted users by count, highest first.";

const NOTE: &str = "Counts are authentication failures. Repeated rejects for one user usually mean \
a wrong password or an outdated device profile.";

/// What goes into the JSON file.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ReportBody {
    /// Bare list sorted by count
    Entries(Vec<ResultEntry>),
    Windowed(WindowedReport),
}

/// Write `<user>: <count>` lines.
pub fn print_counts<W: Write>(out: &mut W, counts: &[ResultEntry]) -> Result<()> {
    for entry in counts {
        writeln!(out, "{}: {}", entry.user, entry.count)?;
    }
    Ok(())
}

/// `<output_dir>/<domain>/<YYYYMMDD-HHMMSS>.json`
pub fn report_path(output_dir: &Path, domain: &str, now: &DateTime<Local>) -> PathBuf {
    output_dir
        .join(domain)
        .join(format!("{}.json", now.format("%Y%m%d-%H%M%S")))
}

/// Create the domain directory if needed and write the report as pretty JSON.
pub fn write_report(
    output_dir: &Path,
    domain: &str,
    now: &DateTime<Local>,
    body: &ReportBody,
) -> Result<PathBuf> {
    let mut components = Path::new(domain).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        bail!(
            "Refusing to write report for domain '{}' outside {}",
            domain,
            output_dir.display()
        );
    }

    let path = report_path(output_dir, domain, now);
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let file = File::create(&path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, body)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    writer.flush()?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::Value;
    use tempfile::TempDir;

    fn entry(user: &str, count: u64) -> ResultEntry {
        ResultEntry {
            user: user.to_string(),
            count,
        }
    }

    #[test]
    fn test_print_counts() {
        let mut out = Vec::new();
        print_counts(&mut out, &[entry("a@ku.ac.th", 5), entry("b@ku.ac.th", 2)]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "a@ku.ac.th: 5\nb@ku.ac.th: 2\n"
        );
    }

    #[test]
    fn test_report_path_format() {
        let now = Local.with_ymd_and_hms(2024, 10, 20, 9, 5, 7).unwrap();
        let path = report_path(Path::new("out"), "ku", &now);
        assert_eq!(path, Path::new("out").join("ku").join("20241020-090507.json"));
    }

    #[test]
    fn test_write_bare_list() {
        let dir = TempDir::new().unwrap();
        let now = Local::now();
        let body = ReportBody::Entries(vec![entry("a@ku.ac.th", 5), entry("b@ku.ac.th", 2)]);

        let path = write_report(dir.path(), "ku", &now, &body).unwrap();
        assert!(path.starts_with(dir.path().join("ku")));

        let value: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["user"], "a@ku.ac.th");
        assert_eq!(value[0]["count"], 5);
        assert_eq!(value.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_write_refuses_paths_outside_output_dir() {
        let dir = TempDir::new().unwrap();
        let outside = dir.path().join("outside");
        let body = ReportBody::Entries(vec![entry("a@ku.ac.th", 1)]);

        for domain in [outside.to_str().unwrap(), "ku/../..", "..", "a/b"] {
            assert!(write_report(&dir.path().join("reports"), domain, &Local::now(), &body).is_err());
        }
        assert!(!outside.exists());
        assert!(!dir.path().join("reports").exists());
    }

    #[test]
    fn test_write_windowed() {
        let dir = TempDir::new().unwrap();
        let window =
            QueryWindow::trailing_days(1, Utc.with_ymd_and_hms(2024, 10, 20, 0, 0, 0).unwrap())
                .unwrap();
        let body =
            ReportBody::Windowed(WindowedReport::new("ku", &window, vec![entry("a@ku.ac.th", 1)]));

        let path = write_report(dir.path(), "ku", &Local::now(), &body).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"start_timestamp\""));

        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            value["end_timestamp"].as_i64().unwrap() - value["start_timestamp"].as_i64().unwrap(),
            86400
        );
        assert!(value["start_time"].is_string());
        assert_eq!(value["results"][0]["user"], "a@ku.ac.th");
    }

    #[test]
    fn test_windowed_metadata() {
        let window =
            QueryWindow::trailing_days(7, Utc.with_ymd_and_hms(2024, 10, 20, 0, 0, 0).unwrap())
                .unwrap();
        let report = WindowedReport::new("ku", &window, Vec::new());

        assert!(report.description.contains("ku"));
        assert!(report.query_summary.contains("- Domain: ku\n"));
        assert!(report.query_summary.contains("- Source: from eduroam.ku\n"));
        assert!(report.query_summary.ends_with("Last 7 days from the query execution date"));
        assert!(report
            .query_summary
            .contains(&format!("{} to {}", report.start_time, report.end_time)));
        assert!(report.aggregation_logic.starts_with("1. "));
        assert!(!report.note.is_empty());

        let value = serde_json::to_value(&report).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["description", "query_summary", "aggregation_logic", "note", "results"] {
            assert!(keys.contains(&key));
        }
    }
}
