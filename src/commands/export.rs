//! Write the last N days of reject counts to a JSON file.
//!
//! The window is sent to Quickwit as `start_timestamp` / `end_timestamp` and
//! recorded in the output next to the results, both as epoch seconds and as
//! local time. A short description of the query and of how counts were
//! derived travels with the numbers.
//!
//! # Usage
//!
//! ```bash
//! agg-uid export ku        # last 24 hours
//! agg-uid export ku 30     # last 30 days
//! ```
//!
//! # Output
//!
//! ```json
//! {
//!   "description": "Access-Reject events per user for the ku domain, ...",
//!   "query_summary": "- Event Type: Access-Reject for user\n- Domain: ku\n...",
//!   "aggregation_logic": "1. Searched for ...",
//!   "note": "Counts are authentication failures. ...",
//!   "start_timestamp": 1729333800,
//!   "end_timestamp": 1729420200,
//!   "start_time": "2024-10-19 10:30:00",
//!   "end_time": "2024-10-20 10:30:00",
//!   "results": [{ "user": "someone@ku.ac.th", "count": 12 }]
//! }
//! ```

use super::{describe_window, fetch_buckets, print_summary, SearchOptions, Timings};
use crate::report::{write_report, ReportBody, WindowedReport};
use crate::search::aggregate::{aggregate, sort_by_count, Extraction};
use crate::search::query::{BucketFilter, QueryBuilder, TimeScope};
use crate::utils::time::QueryWindow;
use anyhow::Result;
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};
use std::time::Instant;

pub async fn run(
    domain: &str,
    days: u32,
    output_dir: &Path,
    options: &SearchOptions,
) -> Result<PathBuf> {
    let started = Instant::now();
    let window = QueryWindow::trailing_days(days, Utc::now())?;
    let builder = options.apply(
        QueryBuilder::new(domain)?
            .scope(TimeScope::Timestamps(window))
            .filter(BucketFilter::Client),
    );
    let extraction = Extraction::for_domain(domain)?;

    describe_window(Some(&window));
    eprintln!("Covering the last {} days", window.span_days());
    let fetched = fetch_buckets(options, &builder).await?;

    let processing_started = Instant::now();
    let results = sort_by_count(aggregate(&fetched.buckets, &extraction));
    let processing = processing_started.elapsed();
    print_summary(results.len(), results.iter().map(|e| e.count).sum());

    let body = ReportBody::Windowed(WindowedReport::new(domain, &window, results));
    let path = write_report(output_dir, domain, &Local::now(), &body)?;
    println!("Results have been saved to {}", path.display());

    let timings = Timings {
        search: fetched.search_time,
        processing,
        overall: started.elapsed(),
    };
    println!("{}", timings.render());

    Ok(path)
}
