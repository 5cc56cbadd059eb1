//! Print reject counts per user for a calendar month.
//!
//! By default the identity regex is applied by Quickwit inside the terms
//! aggregation, so every bucket key already is `<user>@<domain>.ac.th`.
//! `--client-filter` fetches raw lines instead and extracts locally.
//!
//! # Usage
//!
//! ```bash
//! agg-uid console ku --month 2024-10
//! agg-uid console ku --all-time --client-filter
//! ```

use super::{describe_window, fetch_buckets, print_summary, SearchOptions};
use crate::report::print_counts;
use crate::search::aggregate::{aggregate, sort_by_count, Extraction};
use crate::search::query::{BucketFilter, QueryBuilder, TimeScope};
use crate::search::types::ResultEntry;
use crate::utils::time::QueryWindow;
use anyhow::Result;
use std::io::{self, Write};

/// Search and aggregate without printing.
pub async fn collect(
    domain: &str,
    window: Option<QueryWindow>,
    filter: BucketFilter,
    options: &SearchOptions,
) -> Result<Vec<ResultEntry>> {
    let scope = window.map_or(TimeScope::Unbounded, TimeScope::QueryRange);
    let builder = options.apply(QueryBuilder::new(domain)?.scope(scope).filter(filter));

    let extraction = match filter {
        BucketFilter::Server => Extraction::BucketKey,
        BucketFilter::Client => Extraction::for_domain(domain)?,
    };

    describe_window(window.as_ref());
    let fetched = fetch_buckets(options, &builder).await?;
    let counts = aggregate(&fetched.buckets, &extraction);

    Ok(sort_by_count(counts))
}

pub async fn run(
    domain: &str,
    window: Option<QueryWindow>,
    filter: BucketFilter,
    options: &SearchOptions,
) -> Result<()> {
    let results = collect(domain, window, filter, options).await?;
    print_summary(results.len(), results.iter().map(|e| e.count).sum());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_counts(&mut out, &results)?;
    out.flush()?;
    Ok(())
}
