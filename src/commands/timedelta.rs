//! Print a Quickwit `timestamp:[start TO end]` clause for the last N days.
//!
//! Handy for pasting into ad-hoc queries. Makes no network calls.

use crate::utils::time::QueryWindow;
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Range clause for the `days` before `now`
pub fn range_expression(days: u32, now: DateTime<Utc>) -> Result<String> {
    Ok(QueryWindow::trailing_days(days, now)?.range_clause())
}

pub fn run(days: u32) -> Result<()> {
    println!("{}", range_expression(days, Utc::now())?);
    Ok(())
}
