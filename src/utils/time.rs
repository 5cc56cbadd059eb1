//! Query window construction and timestamp formatting.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Inclusive time range a search is scoped to, in whole UTC seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl QueryWindow {
    /// Window covering `[end - days, end]`, truncated to whole seconds.
    pub fn trailing_days(days: u32, end: DateTime<Utc>) -> Result<Self> {
        if days == 0 {
            bail!("Number of days must be positive");
        }

        let end_ts = end.timestamp();
        let start_ts = end_ts - i64::from(days) * SECONDS_PER_DAY;

        Ok(Self {
            start: from_epoch(start_ts)?,
            end: from_epoch(end_ts)?,
        })
    }

    /// Window covering a whole calendar month, first second to last second.
    pub fn month(year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))?;

        let start = first
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Invalid month start"))?
            .and_utc();
        let end = next
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| anyhow!("Invalid month end"))?
            .and_utc()
            - chrono::Duration::seconds(1);

        Ok(Self { start, end })
    }

    /// The full calendar month before the one containing `now`.
    pub fn previous_month(now: DateTime<Utc>) -> Result<Self> {
        let (year, month) = if now.month() == 1 {
            (now.year() - 1, 12)
        } else {
            (now.year(), now.month() - 1)
        };
        Self::month(year, month)
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_timestamp(&self) -> i64 {
        self.end.timestamp()
    }

    /// Whole days covered, rounding a calendar month's final second up.
    pub fn span_days(&self) -> i64 {
        (self.end_timestamp() - self.start_timestamp() + 1) / SECONDS_PER_DAY
    }

    /// Render as a Quickwit query-language range clause.
    pub fn range_clause(&self) -> String {
        format!(
            "timestamp:[{} TO {}]",
            format_iso(&self.start),
            format_iso(&self.end)
        )
    }
}

/// Parse a `YYYY-MM` month argument into its window.
pub fn parse_month(value: &str) -> Result<QueryWindow> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| anyhow!("Expected month as YYYY-MM, got '{}'", value))?;
    let year: i32 = year
        .parse()
        .with_context(|| format!("Invalid year in '{}'", value))?;
    let month: u32 = month
        .parse()
        .with_context(|| format!("Invalid month in '{}'", value))?;
    QueryWindow::month(year, month)
}

fn from_epoch(ts: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0).ok_or_else(|| anyhow!("Timestamp out of range: {}", ts))
}

/// Format a timestamp as `YYYY-MM-DDTHH:MM:SSZ`
pub fn format_iso(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Format epoch seconds for humans, in the local timezone
pub fn epoch_to_human_readable(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}
