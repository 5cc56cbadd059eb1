//! # NRO Reject Tools
//!
//! Command-line tools that count eduroam RADIUS `Access-Reject` events per
//! user, using the terms aggregation of a Quickwit log index.
//!
//! ## Overview
//!
//! Every search command is one straight pipeline:
//!
//! 1. Read `QW_USER`, `QW_PASS` and optionally `QW_URL` from `qw-auth.properties`
//! 2. Build a query for `"Access-Reject for user"` lines of one domain
//! 3. `POST` it to `<QW_URL>/api/v1/nro-logs/search` with basic auth
//! 4. Sum the returned buckets per `<user>@<domain>.ac.th`
//! 5. Print the counts, or write them to `<domain>/<YYYYMMDD-HHMMSS>.json`
//!
//! ## Architecture
//!
//! - [`credentials`] - Properties-file credential loader
//! - [`search`] - Query documents, query builder and bucket aggregation
//! - [`quickwit_api`] - Quickwit search API client
//! - [`report`] - Console and JSON file output
//! - [`commands`] - The subcommands wiring the pipeline together
//! - [`utils`] - Time windows, number formatting, spinner
//!
//! ## Example Usage
//!
//! ```bash
//! # Print per-user rejects for October 2024 (regex applied by Quickwit)
//! agg-uid console ku --month 2024-10
//!
//! # Same month, extracted locally, saved to ku/<timestamp>.json
//! agg-uid monthly ku --month 2024-10
//!
//! # Last 7 days with the window recorded in the output file
//! agg-uid export ku 7
//!
//! # Range clause for ad-hoc queries
//! agg-uid timedelta 3
//! ```

pub mod commands;
pub mod credentials;
pub mod quickwit_api;
pub mod report;
pub mod search;
pub mod utils;
