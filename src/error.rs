//! Error types for the scrape pipeline, storage and startup configuration

use reqwest::StatusCode;
use sea_orm::DbErr;
use thiserror::Error;

/// Transport-level failure retrieving an upstream resource.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: StatusCode },
}

/// An expected structural element is missing from the fetched document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("price table not found (selector `{selector}`)")]
    TableNotFound { selector: String },

    #[error("price table has no data row ({rows} row(s) found)")]
    MissingDataRow { rows: usize },

    #[error("incomplete price row: {cells} cell(s), expected {expected}")]
    IncompleteRow { cells: usize, expected: usize },

    #[error("invalid selector: {0}")]
    InvalidSelector(String),
}

/// A field was found but its content is not usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is not a number: {raw:?}")]
    NotANumber { field: &'static str, raw: String },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: String },

    #[error("{field} is empty")]
    EmptyField { field: &'static str },

    #[error("empty payload from {url}")]
    EmptyPayload { url: String },

    #[error("payload from {url} is not a recognised image")]
    UnrecognisedImage { url: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("record not found after write: {0}")]
    NotFound(String),
}

/// Everything a single scrape run can fail with.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{0} is already running")]
    AlreadyRunning(&'static str),

    #[error("all {0} news source(s) failed")]
    AllSourcesFailed(usize),
}

impl ScrapeError {
    /// Pipeline stage the error was raised in, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            ScrapeError::Fetch(_) => "fetch",
            ScrapeError::Extraction(_) => "extract",
            ScrapeError::Validation(_) => "normalize",
            ScrapeError::Storage(_) => "persist",
            ScrapeError::AlreadyRunning(_) => "guard",
            ScrapeError::AllSourcesFailed(_) => "sources",
        }
    }
}

/// Startup configuration problems. These are the only fatal errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown timezone {0:?}")]
    Timezone(String),

    #[error("invalid cron expression {expr:?} in {key}: expected 6 fields (sec min hour dom mon dow)")]
    Cron { key: &'static str, expr: String },

    #[error("NEWS_SOURCES_JSON is not valid: {0}")]
    NewsSources(#[from] serde_json::Error),

    #[error("DATABASE_URL must be set when STORAGE_BACKEND=database")]
    MissingDatabaseUrl,

    #[error("scheduler error: {0}")]
    Scheduler(String),
}
