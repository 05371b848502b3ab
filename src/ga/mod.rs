//! Google Analytics Reporting API v4 client module
//!
//! Structure:
//! - `auth.rs`: service-account key loading and token exchange
//! - `client.rs`: authenticated HTTP client
//! - `query.rs`: request/response types
//! - `fetch.rs`: pagination loop
//! - `flatten.rs`: response to DataFrame conversion
//! - `error.rs`: error types

pub mod auth;
pub mod client;
pub mod error;
pub mod fetch;
pub mod flatten;
pub mod query;

// Re-exports for convenience
pub use auth::{ServiceAccountKey, ANALYTICS_READONLY_SCOPE};
pub use client::AnalyticsClient;
pub use error::{AnalyticsError, Result};
pub use fetch::{ReportFetcher, ReportSource};
pub use flatten::flatten;
pub use query::{RawResponse, Report, ReportQuery};
