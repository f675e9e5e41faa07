//! Pagescope: render a page, profile it, keep the result
//!
//! This crate turns a URL into a persisted scrape job. A job renders the page
//! in a headless browser, extracts a structured profile of it (metadata,
//! headings, links, images, tables, lists, text, technologies, social links,
//! structured data and statistics) and stores the outcome so it can be
//! polled, exported or re-run later.

pub mod config;
pub mod dispatch;
pub mod extract;
pub mod render;
pub mod runner;
pub mod store;

use thiserror::Error;

/// Main error type for Pagescope operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] store::StorageError),

    #[error("Navigation failed ({kind}): {message}")]
    Navigation {
        kind: render::NavigationKind,
        message: String,
    },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Job {0} not found")]
    NotFound(i64),

    #[error("Job {0} has no data yet")]
    NoData(i64),

    #[error("Job {job_id} holds unreadable data: {message}")]
    InvalidData { job_id: i64, message: String },

    #[error("Job {job_id} has no image at index {index}")]
    ImageNotFound { job_id: i64, index: usize },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Stable classification written into a failed job's `error_type` field
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Navigation { kind, .. } => kind.error_type(),
            Self::Extraction(_) | Self::Serialization(_) => "ExtractionError",
            Self::Storage(_) => "StorageError",
            Self::Config(_) => "ConfigError",
            Self::NotFound(_) => "NotFound",
            Self::NoData(_) => "NoData",
            Self::InvalidData { .. } => "InvalidData",
            Self::ImageNotFound { .. } => "ImageNotFound",
            Self::Http { .. } | Self::HttpClient(_) => "HttpError",
            Self::Archive(_) => "ArchiveError",
            Self::Io(_) => "IoError",
        }
    }
}

impl From<render::RenderError> for ScrapeError {
    fn from(err: render::RenderError) -> Self {
        Self::Navigation {
            kind: err.kind,
            message: err.message,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Pagescope operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use dispatch::Dispatcher;
pub use extract::{extract, ResultDocument};
pub use store::{Job, JobStatus, JobStore, SqliteJobStore};
