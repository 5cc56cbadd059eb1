//! Builds the Access-Reject search request for a domain.
//!
//! The free-text filter always requires three phrases in the message field
//! (`full_message` unless overridden): the reject marker, `@<domain>`, and `from eduroam.<domain>`. The time
//! window is either rendered into the query text, sent as epoch bounds, or
//! left out entirely.

use super::types::{Aggregations, SearchRequest, TermsAggregation, TermsClause};
use crate::utils::time::QueryWindow;
use anyhow::{bail, Result};

/// Phrase every RADIUS reject line starts its message with.
pub const REJECT_PHRASE: &str = "Access-Reject for user";

/// Field holding the raw log line.
pub const DEFAULT_FIELD: &str = "full_message";

/// Terms aggregation size large enough to return every distinct line.
pub const DEFAULT_TERMS_SIZE: u32 = 65_000;

/// How the search is scoped in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeScope {
    Unbounded,
    /// Appended to the query as `timestamp:[start TO end]`
    QueryRange(QueryWindow),
    /// Sent as `start_timestamp` / `end_timestamp` epoch seconds
    Timestamps(QueryWindow),
}

/// Where user identities are carved out of the raw log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketFilter {
    /// The terms aggregation carries the identity regex; bucket keys are identities.
    Server,
    /// Raw lines come back as bucket keys and are matched locally.
    Client,
}

/// Regex whose first capture group is `<user>@<domain>.ac.th`.
pub fn identity_pattern(domain: &str) -> String {
    format!(
        r"{} ([^@]+@{}\.ac\.th)",
        REJECT_PHRASE,
        regex::escape(domain)
    )
}

/// The three conjoined phrase matches for a domain on `field`.
pub fn filter_expression(field: &str, domain: &str) -> String {
    format!(
        r#"{field}:"{phrase}" AND {field}:"@{domain}" AND {field}:"from eduroam.{domain}""#,
        field = field,
        phrase = REJECT_PHRASE,
        domain = domain
    )
}

/// Reject domains that would break the phrase syntax of the query, or that
/// would not name a single directory under the report output directory.
pub fn validate_domain(domain: &str) -> Result<()> {
    if domain.is_empty() {
        bail!("Domain must not be empty");
    }
    if domain
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '"' | '\\' | '/' | ':'))
    {
        bail!(
            "Invalid domain '{}': whitespace, quotes, slashes and colons are not allowed",
            domain
        );
    }
    if domain == "." || domain == ".." {
        bail!("Invalid domain '{}'", domain);
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    domain: String,
    field: String,
    size: u32,
    scope: TimeScope,
    filter: BucketFilter,
}

impl QueryBuilder {
    pub fn new(domain: &str) -> Result<Self> {
        validate_domain(domain)?;
        Ok(Self {
            domain: domain.to_string(),
            field: DEFAULT_FIELD.to_string(),
            size: DEFAULT_TERMS_SIZE,
            scope: TimeScope::Unbounded,
            filter: BucketFilter::Client,
        })
    }

    pub fn field(mut self, field: &str) -> Self {
        self.field = field.to_string();
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn scope(mut self, scope: TimeScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn filter(mut self, filter: BucketFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn build(&self) -> SearchRequest {
        let mut query = filter_expression(&self.field, &self.domain);
        let (mut start_timestamp, mut end_timestamp) = (None, None);

        match &self.scope {
            TimeScope::Unbounded => {}
            TimeScope::QueryRange(window) => {
                query.push_str(" AND ");
                query.push_str(&window.range_clause());
            }
            TimeScope::Timestamps(window) => {
                start_timestamp = Some(window.start_timestamp());
                end_timestamp = Some(window.end_timestamp());
            }
        }

        let regex = match self.filter {
            BucketFilter::Server => Some(identity_pattern(&self.domain)),
            BucketFilter::Client => None,
        };

        SearchRequest {
            query,
            start_timestamp,
            end_timestamp,
            max_hits: 0,
            aggs: Aggregations {
                unique_users: TermsAggregation {
                    terms: TermsClause {
                        field: self.field.clone(),
                        size: self.size,
                        regex,
                    },
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    #[test]
    fn test_filter_expression() {
        assert_eq!(
            filter_expression(DEFAULT_FIELD, "ku"),
            r#"full_message:"Access-Reject for user" AND full_message:"@ku" AND full_message:"from eduroam.ku""#
        );
    }

    #[test]
    fn test_custom_field_used_for_phrases_and_terms() {
        let request = QueryBuilder::new("ku").unwrap().field("message").build();
        assert_eq!(
            request.query,
            r#"message:"Access-Reject for user" AND message:"@ku" AND message:"from eduroam.ku""#
        );
        assert_eq!(request.aggs.unique_users.terms.field, "message");
        assert!(!request.query.contains("full_message"));
    }

    #[test]
    fn test_identity_pattern() {
        assert_eq!(
            identity_pattern("ku"),
            r"Access-Reject for user ([^@]+@ku\.ac\.th)"
        );
        assert_eq!(
            identity_pattern("a.b"),
            r"Access-Reject for user ([^@]+@a\.b\.ac\.th)"
        );
    }

    #[test]
    fn test_server_filter_month_document() {
        let request = QueryBuilder::new("ku")
            .unwrap()
            .scope(TimeScope::QueryRange(QueryWindow::month(2024, 10).unwrap()))
            .filter(BucketFilter::Server)
            .build();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "full_message:\"Access-Reject for user\" AND full_message:\"@ku\" AND full_message:\"from eduroam.ku\" AND timestamp:[2024-10-01T00:00:00Z TO 2024-10-31T23:59:59Z]",
                "max_hits": 0,
                "aggs": {
                    "unique_users": {
                        "terms": {
                            "field": "full_message",
                            "size": 65000,
                            "regex": "Access-Reject for user ([^@]+@ku\\.ac\\.th)"
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_client_filter_trailing_document() {
        let end: DateTime<Utc> = DateTime::from_timestamp(1_729_420_200, 0).unwrap();
        let window = QueryWindow::trailing_days(1, end).unwrap();
        let request = QueryBuilder::new("ku")
            .unwrap()
            .scope(TimeScope::Timestamps(window))
            .build();

        assert_eq!(request.start_timestamp, Some(1_729_420_200 - 86_400));
        assert_eq!(request.end_timestamp, Some(1_729_420_200));
        assert!(!request.query.contains("timestamp:["));
        assert!(request.aggs.unique_users.terms.regex.is_none());
    }

    #[test]
    fn test_unbounded_has_no_window() {
        let request = QueryBuilder::new("ku").unwrap().size(10).build();
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("start_timestamp").is_none());
        assert_eq!(value["aggs"]["unique_users"]["terms"]["size"], 10);
    }

    #[test]
    fn test_invalid_domains() {
        assert!(QueryBuilder::new("").is_err());
        assert!(QueryBuilder::new("ku ac").is_err());
        assert!(QueryBuilder::new("ku\"").is_err());
    }

    #[test]
    fn test_domains_that_escape_the_report_directory() {
        for domain in ["/tmp/elsewhere", "ku/../..", "..", ".", "a/b", "C:evil", "..\\x"] {
            assert!(
                QueryBuilder::new(domain).is_err(),
                "domain {:?} should be rejected",
                domain
            );
        }
        assert!(QueryBuilder::new("ku").is_ok());
        assert!(QueryBuilder::new("mahidol.ac").is_ok());
    }
}
