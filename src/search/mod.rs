//! Search request construction and result aggregation.
//!
//! - [`types`] - Request and response documents for the Quickwit search API
//! - [`query`] - Builds the Access-Reject query for a domain
//! - [`aggregate`] - Sums bucket counts per user identity

pub mod aggregate;
pub mod query;
pub mod types;
