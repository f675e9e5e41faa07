//! Job store: the persisted record of every scrape job
//!
//! This module handles all database operations for jobs, including:
//! - SQLite database initialization, schema and migrations
//! - Creating jobs and writing their terminal outcome
//! - Listing, reading and deleting jobs
//!
//! The store is the single source of truth for job state. A job's `status`
//! and `data` are always written together by one statement.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteJobStore;
pub use traits::{JobStore, StorageError, StorageResult};

use serde::Serialize;
use std::fmt;

/// Default number of jobs returned by [`JobStore::list`]
pub const DEFAULT_LIST_LIMIT: usize = 50;

/// Represents a job row in the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Job {
    pub id: i64,
    pub url: String,
    pub status: JobStatus,
    /// Serialized result document (completed) or error record (failed)
    pub data: Option<String>,
    pub created_at: String,
}

impl Job {
    /// Summary view used by job listings
    pub fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            url: self.url.clone(),
            status: self.status,
            created_at: self.created_at.clone(),
            has_data: self.data.is_some(),
        }
    }
}

/// Listing view of a job without its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobSummary {
    pub id: i64,
    pub url: String,
    pub status: JobStatus,
    pub created_at: String,
    pub has_data: bool,
}

/// Lifecycle status of a job
///
/// `Pending -> Running -> {Completed, Failed}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    /// Returns true once no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.to_db_string())
    }
}
