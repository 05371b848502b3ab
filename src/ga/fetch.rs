//! Pagination loop over `reports:batchGet`.
//!
//! The API caps each page at a fixed row count and signals further rows with
//! a `nextPageToken` on the first report of the page. The fetcher follows
//! tokens until exhaustion, concatenating reports in arrival order. There is
//! no retry or timeout: a transport failure aborts the whole fetch and any
//! pages already accumulated are discarded.

use super::error::Result;
use super::query::{RawResponse, ReportQuery};

/// Source of single report pages.
///
/// Implemented by `AnalyticsClient` for the real API and by in-memory mocks
/// in tests.
#[allow(async_fn_in_trait)]
pub trait ReportSource {
    async fn batch_get(&self, query: &ReportQuery) -> Result<RawResponse>;
}

/// Assembles the full result set for a query from a page source.
pub struct ReportFetcher<'a, S: ReportSource> {
    source: &'a S,
}

impl<'a, S: ReportSource> ReportFetcher<'a, S> {
    pub fn new(source: &'a S) -> Self {
        ReportFetcher { source }
    }

    /// Fetch a query's result set.
    ///
    /// With `fetch_all` false, exactly one request is issued and its page
    /// returned verbatim. With `fetch_all` true, the loop issues requests
    /// until a page's first report carries no continuation token. The
    /// caller's query is never mutated; each step injects the token into a
    /// fresh copy.
    pub async fn fetch(&self, query: &ReportQuery, fetch_all: bool) -> Result<RawResponse> {
        if !fetch_all {
            return self.source.batch_get(query).await;
        }

        let mut out = RawResponse::default();
        let mut current = query.clone();

        loop {
            let page = self.source.batch_get(&current).await?;

            // The token lives on the first report of the page only.
            let token = page
                .reports
                .first()
                .and_then(|r| r.next_page_token.clone())
                .unwrap_or_default();

            out.reports.extend(page.reports);

            if token.is_empty() {
                break;
            }
            log::debug!("following page token {}", token);
            current = query.with_page_token(&token)?;
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::query::{ColumnHeader, Report, ReportData, ReportRow};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a fixed sequence of pages, recording the queries it saw.
    struct MockSource {
        pages: Mutex<VecDeque<RawResponse>>,
        requests: AtomicUsize,
        seen_tokens: Mutex<Vec<Option<String>>>,
    }

    impl MockSource {
        fn new(pages: Vec<RawResponse>) -> Self {
            MockSource {
                pages: Mutex::new(pages.into()),
                requests: AtomicUsize::new(0),
                seen_tokens: Mutex::new(Vec::new()),
            }
        }
    }

    impl ReportSource for MockSource {
        async fn batch_get(&self, query: &ReportQuery) -> Result<RawResponse> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let token = query.report_requests[0]
                .get("pageToken")
                .and_then(|v| v.as_str())
                .map(String::from);
            self.seen_tokens.lock().unwrap().push(token);
            Ok(self.pages.lock().unwrap().pop_front().expect("page"))
        }
    }

    fn page(dimension_value: &str, token: Option<&str>) -> RawResponse {
        RawResponse {
            reports: vec![Report {
                column_header: ColumnHeader {
                    dimensions: vec!["ga:pagePath".into()],
                    metric_header: None,
                },
                data: ReportData {
                    rows: vec![ReportRow {
                        dimensions: vec![dimension_value.into()],
                        metrics: vec![],
                    }],
                },
                next_page_token: token.map(String::from),
            }],
        }
    }

    fn query() -> ReportQuery {
        ReportQuery::new(vec![json!({"viewId": "12345"})])
    }

    #[tokio::test]
    async fn test_pagination_until_token_exhausted() {
        let source = MockSource::new(vec![
            page("/a", Some("1000")),
            page("/b", Some("2000")),
            page("/c", None),
        ]);

        let out = ReportFetcher::new(&source)
            .fetch(&query(), true)
            .await
            .unwrap();

        assert_eq!(source.requests.load(Ordering::SeqCst), 3);
        assert_eq!(out.reports.len(), 3);
        // Arrival order preserved
        let values: Vec<_> = out
            .reports
            .iter()
            .map(|r| r.data.rows[0].dimensions[0].as_str())
            .collect();
        assert_eq!(values, vec!["/a", "/b", "/c"]);
        // First request carries no token, later ones carry the prior page's
        let seen = source.seen_tokens.lock().unwrap();
        assert_eq!(
            *seen,
            vec![None, Some("1000".to_string()), Some("2000".to_string())]
        );
    }

    #[tokio::test]
    async fn test_empty_token_terminates() {
        let source = MockSource::new(vec![page("/a", Some(""))]);
        let out = ReportFetcher::new(&source)
            .fetch(&query(), true)
            .await
            .unwrap();
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
        assert_eq!(out.reports.len(), 1);
    }

    #[tokio::test]
    async fn test_single_page_mode_ignores_token() {
        let source = MockSource::new(vec![page("/a", Some("1000")), page("/b", None)]);
        let out = ReportFetcher::new(&source)
            .fetch(&query(), false)
            .await
            .unwrap();
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
        assert_eq!(out.reports.len(), 1);
        assert_eq!(out.reports[0].data.rows[0].dimensions[0], "/a");
    }

    #[tokio::test]
    async fn test_empty_response_terminates() {
        let source = MockSource::new(vec![RawResponse::default()]);
        let out = ReportFetcher::new(&source)
            .fetch(&query(), true)
            .await
            .unwrap();
        assert_eq!(source.requests.load(Ordering::SeqCst), 1);
        assert!(out.reports.is_empty());
    }

    #[tokio::test]
    async fn test_caller_query_not_mutated() {
        let source = MockSource::new(vec![page("/a", Some("1000")), page("/b", None)]);
        let q = query();
        ReportFetcher::new(&source).fetch(&q, true).await.unwrap();
        assert!(q.report_requests[0].get("pageToken").is_none());
    }
}
