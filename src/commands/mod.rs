//! Command implementations.
//!
//! Every search command runs the same pipeline: load credentials, build the
//! query, issue one search, aggregate buckets per user, report. They differ
//! in time window, where identities are extracted, and where results go.
//!
//! - [`console`] - Calendar month, server-side regex, prints `user: count`
//! - [`monthly`] - Calendar month, client-side regex, writes a sorted JSON list
//! - [`export`] - Trailing N days, client-side regex, writes JSON with window metadata
//! - [`timedelta`] - Prints the `timestamp:[.. TO ..]` clause for the last N days

pub mod console;
pub mod export;
pub mod monthly;
pub mod timedelta;

use crate::credentials::{Credentials, DEFAULT_CREDENTIALS_FILE};
use crate::quickwit_api::{QuickwitClient, DEFAULT_INDEX};
use crate::search::query::{QueryBuilder, DEFAULT_FIELD, DEFAULT_TERMS_SIZE};
use crate::search::types::Bucket;
use crate::utils::format::format_number;
use crate::utils::progress::Spinner;
use crate::utils::time::{format_iso, QueryWindow};
use anyhow::Result;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Connection and aggregation settings shared by the search commands.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub credentials: PathBuf,
    /// Overrides `QW_URL` from the credentials file
    pub url: Option<String>,
    pub index: String,
    pub field: String,
    pub size: u32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            url: None,
            index: DEFAULT_INDEX.to_string(),
            field: DEFAULT_FIELD.to_string(),
            size: DEFAULT_TERMS_SIZE,
        }
    }
}

impl SearchOptions {
    fn apply(&self, builder: QueryBuilder) -> QueryBuilder {
        builder.field(&self.field).size(self.size)
    }
}

/// Buckets returned by a search, and how long Quickwit took to answer.
pub(crate) struct FetchedBuckets {
    pub buckets: Vec<Bucket>,
    pub search_time: Duration,
}

/// Load credentials, send the query and return the `unique_users` buckets.
pub(crate) async fn fetch_buckets(
    options: &SearchOptions,
    builder: &QueryBuilder,
) -> Result<FetchedBuckets> {
    let credentials = Credentials::from_file(&options.credentials)?;
    info!(
        "Loaded credentials for {} from {}",
        credentials.username,
        options.credentials.display()
    );

    let client = QuickwitClient::from_options(options.url.as_deref(), &credentials)?;
    let request = builder.build();

    eprintln!("=== Quickwit Access-Reject Aggregation ===");
    eprintln!("Endpoint: {}", client.search_url(&options.index));
    eprintln!("Domain: {}", builder.domain());
    eprintln!();

    let spinner = Spinner::start("Searching");
    let started = Instant::now();
    let response = match client.search(&options.index, &request).await {
        Ok(response) => response,
        Err(e) => {
            spinner.clear();
            return Err(e);
        }
    };
    let search_time = started.elapsed();
    spinner.finish_with_message(&format!(
        "Search complete: {} matching lines",
        format_number(response.num_hits)
    ));

    debug!("Search took {} µs on the server", response.elapsed_time_micros);
    let dropped = response.dropped_doc_count();
    if dropped > 0 {
        warn!(
            "{} documents fell outside the {} requested terms buckets; counts are incomplete (raise --size)",
            format_number(dropped),
            format_number(u64::from(options.size))
        );
    }

    let buckets = response.into_buckets()?;
    info!("Received {} buckets", buckets.len());

    Ok(FetchedBuckets {
        buckets,
        search_time,
    })
}

pub(crate) fn describe_window(window: Option<&QueryWindow>) {
    match window {
        Some(w) => eprintln!("Window: {} to {}", format_iso(&w.start), format_iso(&w.end)),
        None => eprintln!("Window: all time"),
    }
}

/// Wall-clock split of a search command, printed once the report is saved.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub search: Duration,
    pub processing: Duration,
    pub overall: Duration,
}

impl Timings {
    pub fn render(&self) -> String {
        format!(
            "Time taken:\n  Quickwit search: {:.3}s\n  Local processing: {:.3}s\n  Overall: {:.3}s",
            self.search.as_secs_f64(),
            self.processing.as_secs_f64(),
            self.overall.as_secs_f64()
        )
    }
}

pub(crate) fn print_summary(users: usize, rejects: u64) {
    eprintln!(
        "Found {} users with {} rejects",
        format_number(users as u64),
        format_number(rejects)
    );
}
