//! HTTP client for the Analytics Reporting API v4.

use super::auth::{fetch_access_token, ServiceAccountKey, ANALYTICS_READONLY_SCOPE};
use super::error::{AnalyticsError, Result};
use super::fetch::{ReportFetcher, ReportSource};
use super::flatten::flatten;
use super::query::{RawResponse, ReportQuery};
use polars::prelude::DataFrame;
use std::path::Path;

/// Default `reports:batchGet` endpoint.
const DEFAULT_ENDPOINT: &str = "https://analyticsreporting.googleapis.com/v4/reports:batchGet";

/// Authenticated Analytics Reporting client.
///
/// Holds the endpoint and bearer token, both read-only after construction,
/// so one client may serve concurrent callers.
pub struct AnalyticsClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl AnalyticsClient {
    /// Create a client against an explicit endpoint with an existing token.
    pub fn connect(endpoint: String, token: String) -> Self {
        AnalyticsClient {
            http: reqwest::Client::new(),
            endpoint,
            token,
        }
    }

    /// Create a client by authenticating with a service-account JSON key
    /// file, using the read-only analytics scope and the default endpoint.
    pub async fn from_key_file(path: impl AsRef<Path>) -> Result<Self> {
        let key = ServiceAccountKey::from_file(path)?;
        let http = reqwest::Client::new();
        let token = fetch_access_token(&http, &key, ANALYTICS_READONLY_SCOPE).await?;

        Ok(AnalyticsClient {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token,
        })
    }

    /// Create a client from environment variables.
    ///
    /// Required environment variable:
    /// - `GA_CREDENTIALS`: path to the service-account JSON key file
    pub async fn from_env() -> Result<Self> {
        let path = std::env::var("GA_CREDENTIALS").map_err(|_| {
            AnalyticsError::Config("GA_CREDENTIALS environment variable not set".into())
        })?;
        Self::from_key_file(path).await
    }

    /// Execute a query and flatten the response into a DataFrame.
    ///
    /// With `all_results`, every page is fetched before flattening;
    /// otherwise only the first page (the API's row limit per page applies).
    pub async fn execute_query(&self, query: &ReportQuery, all_results: bool) -> Result<DataFrame> {
        let raw = self.execute_query_raw(query, all_results).await?;
        flatten(&raw)
    }

    /// Execute a query and return the accumulated raw response untouched.
    pub async fn execute_query_raw(
        &self,
        query: &ReportQuery,
        all_results: bool,
    ) -> Result<RawResponse> {
        ReportFetcher::new(self).fetch(query, all_results).await
    }
}

impl ReportSource for AnalyticsClient {
    /// Issue a single `reports:batchGet` request and return one page.
    async fn batch_get(&self, query: &ReportQuery) -> Result<RawResponse> {
        log::debug!("POST {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyticsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let page: RawResponse = serde_json::from_str(&body)?;
        Ok(page)
    }
}
