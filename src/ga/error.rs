use thiserror::Error;

/// Errors that can occur when querying the Analytics Reporting API
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// HTTP transport error
    #[error("Transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success response from the reporting API
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    /// Authentication error
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Configuration error (missing env vars, bad key files, invalid queries)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed response shape
    #[error("Malformed response: {0}")]
    Response(#[from] serde_json::Error),

    /// A flattened row had a different number of values than the report has columns
    #[error("Row {row} has {got} values but the report declares {expected} columns")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A value in the `date` column was not an 8-digit YYYYMMDD string
    #[error("Invalid date value '{0}': expected YYYYMMDD")]
    DateParse(String),

    /// DataFrame construction or manipulation error
    #[error("Table error: {0}")]
    Table(#[from] polars::error::PolarsError),
}

/// Type alias for Results using AnalyticsError
pub type Result<T> = std::result::Result<T, AnalyticsError>;
