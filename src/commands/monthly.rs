//! Write a calendar month's reject counts to a JSON file.
//!
//! Raw log lines are aggregated by Quickwit and the user identity is
//! extracted locally. The file holds a bare list sorted by count.
//!
//! # Usage
//!
//! ```bash
//! agg-uid monthly ku --month 2024-10
//! # -> ku/20241101-080000.json
//! ```

use super::{describe_window, fetch_buckets, print_summary, SearchOptions};
use crate::report::{write_report, ReportBody};
use crate::search::aggregate::{aggregate, sort_by_count, Extraction};
use crate::search::query::{BucketFilter, QueryBuilder, TimeScope};
use crate::utils::time::QueryWindow;
use anyhow::Result;
use chrono::Local;
use std::path::{Path, PathBuf};

pub async fn run(
    domain: &str,
    window: Option<QueryWindow>,
    output_dir: &Path,
    options: &SearchOptions,
) -> Result<PathBuf> {
    let scope = window.map_or(TimeScope::Unbounded, TimeScope::QueryRange);
    let builder = options.apply(
        QueryBuilder::new(domain)?
            .scope(scope)
            .filter(BucketFilter::Client),
    );
    let extraction = Extraction::for_domain(domain)?;

    describe_window(window.as_ref());
    let fetched = fetch_buckets(options, &builder).await?;
    let results = sort_by_count(aggregate(&fetched.buckets, &extraction));
    print_summary(results.len(), results.iter().map(|e| e.count).sum());

    let path = write_report(output_dir, domain, &Local::now(), &ReportBody::Entries(results))?;
    println!("Results have been saved to {}", path.display());

    Ok(path)
}
