//! Sums terms-aggregation buckets per user identity.

use super::query::identity_pattern;
use super::types::{Bucket, ResultEntry};
use anyhow::{Context, Result};
use regex::Regex;
use std::collections::HashMap;

/// How an identity is derived from a bucket key.
#[derive(Debug, Clone)]
pub enum Extraction {
    /// The key already is the identity (server-side regex filtering).
    BucketKey,
    /// Capture group 1 of the pattern is the identity; non-matching keys are dropped.
    Pattern(Regex),
}

impl Extraction {
    /// Client-side extraction of `<user>@<domain>.ac.th` from raw log lines.
    pub fn for_domain(domain: &str) -> Result<Self> {
        let pattern = identity_pattern(domain);
        let regex = Regex::new(&pattern)
            .with_context(|| format!("Failed to compile identity pattern {}", pattern))?;
        Ok(Extraction::Pattern(regex))
    }

    fn identity<'a>(&self, key: &'a str) -> Option<&'a str> {
        match self {
            Extraction::BucketKey => Some(key),
            Extraction::Pattern(regex) => regex
                .captures(key)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
        }
    }
}

/// Total `doc_count` per identity. Buckets without an identity are skipped.
pub fn aggregate(buckets: &[Bucket], extraction: &Extraction) -> HashMap<String, u64> {
    let mut counts: HashMap<String, u64> = HashMap::new();

    for bucket in buckets {
        if let Some(user) = extraction.identity(&bucket.key) {
            *counts.entry(user.to_string()).or_insert(0) += bucket.doc_count;
        }
    }

    counts
}

/// Entries ordered by count, highest first. Equal counts are ordered by user.
pub fn sort_by_count(counts: HashMap<String, u64>) -> Vec<ResultEntry> {
    let mut entries: Vec<ResultEntry> = counts
        .into_iter()
        .map(|(user, count)| ResultEntry { user, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.user.cmp(&b.user)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(key: &str, doc_count: u64) -> Bucket {
        Bucket {
            key: key.to_string(),
            doc_count,
        }
    }

    #[test]
    fn test_client_side_extraction() {
        let buckets = vec![
            bucket("Access-Reject for user a@x.ac.th", 3),
            bucket("Access-Reject for user a@x.ac.th", 2),
            bucket("noise", 5),
        ];
        let counts = aggregate(&buckets, &Extraction::for_domain("x").unwrap());

        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get("a@x.ac.th"), Some(&5));
    }

    #[test]
    fn test_extraction_searches_inside_full_line() {
        let line = "2024-10-20T10:30:00 radius1 radiusd[123]: Access-Reject for user bob@ku.ac.th stationid 00-11 from eduroam.ku to sp (10.0.0.1)";
        let counts = aggregate(&[bucket(line, 7)], &Extraction::for_domain("ku").unwrap());
        assert_eq!(counts.get("bob@ku.ac.th"), Some(&7));
    }

    #[test]
    fn test_other_domain_excluded() {
        let buckets = vec![
            bucket("Access-Reject for user a@ku.ac.th", 1),
            bucket("Access-Reject for user a@cu.ac.th", 4),
            bucket("Access-Reject for user a@kuxac.th", 4),
        ];
        let counts = aggregate(&buckets, &Extraction::for_domain("ku").unwrap());
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["a@ku.ac.th"], 1);
    }

    #[test]
    fn test_sum_preserved_when_all_match() {
        let buckets: Vec<Bucket> = (0..20)
            .map(|i| bucket(&format!("Access-Reject for user u{}@x.ac.th", i % 6), i + 1))
            .collect();
        let expected: u64 = buckets.iter().map(|b| b.doc_count).sum();

        let counts = aggregate(&buckets, &Extraction::for_domain("x").unwrap());
        assert_eq!(counts.values().sum::<u64>(), expected);
        assert_eq!(counts.len(), 6);
    }

    #[test]
    fn test_bucket_key_mode_uses_key_verbatim() {
        let buckets = vec![
            bucket("a@x.ac.th", 3),
            bucket("b@x.ac.th", 1),
            bucket("a@x.ac.th", 2),
        ];
        let counts = aggregate(&buckets, &Extraction::BucketKey);
        assert_eq!(counts["a@x.ac.th"], 5);
        assert_eq!(counts["b@x.ac.th"], 1);
    }

    #[test]
    fn test_sort_descending() {
        let mut counts = HashMap::new();
        counts.insert("low@x.ac.th".to_string(), 1);
        counts.insert("high@x.ac.th".to_string(), 9);
        counts.insert("mid@x.ac.th".to_string(), 4);

        let sorted = sort_by_count(counts);
        let order: Vec<u64> = sorted.iter().map(|e| e.count).collect();
        assert_eq!(order, vec![9, 4, 1]);
        assert_eq!(sorted[0].user, "high@x.ac.th");
    }

    #[test]
    fn test_empty_buckets() {
        let counts = aggregate(&[], &Extraction::BucketKey);
        assert!(counts.is_empty());
        assert!(sort_by_count(counts).is_empty());
    }
}
