//! Request and response types for the Reporting API v4 `reports:batchGet` call.
//!
//! The query body is passed through mostly untouched: callers build their
//! `reportRequests` entries as JSON (dimensions, metrics, date ranges, view
//! id) exactly as the API documents them. The only field this crate ever
//! writes is the `pageToken` of the first request entry, during pagination.

use super::error::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `reports:batchGet` request body.
///
/// Pagination requires at least one entry in `report_requests`; the API
/// itself rejects empty bodies as well.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub report_requests: Vec<Value>,
}

impl ReportQuery {
    /// Build a query from raw `reportRequests` entries.
    pub fn new(report_requests: Vec<Value>) -> Self {
        ReportQuery { report_requests }
    }

    /// Return a copy of this query with `pageToken` set on the first
    /// report request. The original query is never mutated.
    pub fn with_page_token(&self, token: &str) -> Result<ReportQuery> {
        let mut next = self.clone();
        let first = next.report_requests.first_mut().ok_or_else(|| {
            AnalyticsError::Config(
                "cannot paginate a query with no reportRequests entries".into(),
            )
        })?;
        if let Value::Object(map) = first {
            map.insert("pageToken".into(), Value::String(token.to_string()));
        } else {
            return Err(AnalyticsError::Config(
                "first reportRequests entry is not a JSON object".into(),
            ));
        }
        Ok(next)
    }
}

/// One or more reports, either a single page straight from the API or the
/// accumulation of every page of a paginated fetch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// A single API-returned report unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub column_header: ColumnHeader,
    #[serde(default)]
    pub data: ReportData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Dimension names plus optional metric descriptors.
///
/// `dimensions` is required: a header without it is a malformed response
/// and fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub dimensions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_header: Option<MetricHeader>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricHeader {
    #[serde(default)]
    pub metric_header_entries: Vec<MetricHeaderEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricHeaderEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
}

/// Declared metric value type, as reported by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetricType {
    Integer,
    Float,
    Currency,
    Percent,
    Time,
    #[serde(other)]
    Unspecified,
}

/// Row data for one report. Missing entirely for reports with no matching
/// rows, hence the `Default`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<ReportRow>,
}

/// One row: dimension values in header order, then one value group per
/// requested date range.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricValues>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricValues {
    #[serde(default)]
    pub values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_with_page_token_sets_first_entry() {
        let query = ReportQuery::new(vec![
            json!({"viewId": "12345", "dimensions": [{"name": "ga:date"}]}),
            json!({"viewId": "67890"}),
        ]);

        let next = query.with_page_token("abc123").unwrap();

        assert_eq!(next.report_requests[0]["pageToken"], json!("abc123"));
        // Second entry untouched
        assert!(next.report_requests[1].get("pageToken").is_none());
        // Original untouched
        assert!(query.report_requests[0].get("pageToken").is_none());
    }

    #[test]
    fn test_with_page_token_empty_query_fails() {
        let query = ReportQuery::new(vec![]);
        let err = query.with_page_token("abc123").unwrap_err();
        assert!(matches!(err, AnalyticsError::Config(_)));
    }

    #[test]
    fn test_response_deserialization() {
        let raw = json!({
            "reports": [{
                "columnHeader": {
                    "dimensions": ["ga:date", "ga:pagePath"],
                    "metricHeader": {
                        "metricHeaderEntries": [
                            {"name": "ga:sessions", "type": "INTEGER"}
                        ]
                    }
                },
                "data": {
                    "rows": [
                        {"dimensions": ["20230115", "/home"],
                         "metrics": [{"values": ["42"]}]}
                    ]
                },
                "nextPageToken": "1000"
            }]
        });

        let resp: RawResponse = serde_json::from_value(raw).unwrap();
        let report = &resp.reports[0];
        assert_eq!(report.column_header.dimensions, vec!["ga:date", "ga:pagePath"]);
        let entries = &report
            .column_header
            .metric_header
            .as_ref()
            .unwrap()
            .metric_header_entries;
        assert_eq!(entries[0].metric_type, MetricType::Integer);
        assert_eq!(report.data.rows[0].metrics[0].values, vec!["42"]);
        assert_eq!(report.next_page_token.as_deref(), Some("1000"));
    }

    #[test]
    fn test_missing_dimensions_is_malformed() {
        let raw = json!({
            "reports": [{"columnHeader": {}, "data": {"rows": []}}]
        });
        assert!(serde_json::from_value::<RawResponse>(raw).is_err());
    }

    #[test]
    fn test_missing_data_defaults_to_no_rows() {
        let raw = json!({
            "reports": [{"columnHeader": {"dimensions": ["ga:date"]}}]
        });
        let resp: RawResponse = serde_json::from_value(raw).unwrap();
        assert!(resp.reports[0].data.rows.is_empty());
    }
}
