//! google2polars
//!
//! A thin client for the Google Analytics Reporting API v4 that flattens
//! paginated report responses into polars DataFrames.

pub mod ga;
pub mod logging;

pub use ga::{AnalyticsClient, AnalyticsError, RawResponse, ReportQuery, Result};
