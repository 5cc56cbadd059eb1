//! Request and response documents for the Quickwit search API.
//!
//! Only the parts of the response the aggregation reads are modelled;
//! unknown fields are ignored by serde.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/<index>/search`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_timestamp: Option<i64>,
    /// Always 0: only the aggregation is wanted, not the documents.
    pub max_hits: u64,
    pub aggs: Aggregations,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregations {
    pub unique_users: TermsAggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsAggregation {
    pub terms: TermsClause,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsClause {
    pub field: String,
    pub size: u32,
    /// Server-side bucket filter. Absent means all raw values are returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub num_hits: u64,
    #[serde(default)]
    pub elapsed_time_micros: u64,
    pub aggregations: Option<AggregationsResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregationsResponse {
    pub unique_users: Option<BucketList>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BucketList {
    #[serde(default)]
    pub buckets: Vec<Bucket>,
    /// Documents whose values fell outside the `size` most frequent terms.
    #[serde(default)]
    pub sum_other_doc_count: u64,
}

/// One distinct field value and the number of documents carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
}

impl SearchResponse {
    /// Documents left out of the returned buckets because the terms size was too small.
    pub fn dropped_doc_count(&self) -> u64 {
        self.aggregations
            .as_ref()
            .and_then(|aggs| aggs.unique_users.as_ref())
            .map_or(0, |list| list.sum_other_doc_count)
    }

    /// Take the `unique_users` buckets out of the response.
    pub fn into_buckets(self) -> Result<Vec<Bucket>> {
        self.aggregations
            .and_then(|aggs| aggs.unique_users)
            .map(|list| list.buckets)
            .ok_or_else(|| anyhow!("Search response has no aggregations.unique_users"))
    }
}

/// Aggregated reject count for one user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub user: String,
    pub count: u64,
}
