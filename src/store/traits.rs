//! Storage traits and error types
//!
//! This module defines the trait interface for job store backends and
//! associated error types.

use crate::store::{Job, JobStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// Implementations must be safe to share between concurrently running jobs
/// and the query path. Every method touches a single row or a short
/// read-only range, so no lock is held beyond one statement.
pub trait JobStore: Send + Sync {
    /// Inserts a new `pending` job and returns its identifier
    fn create(&self, url: &str) -> StorageResult<i64>;

    /// Overwrites status and data of a job in one write
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The row existed and was updated
    /// * `Ok(false)` - No row with this id; nothing was written
    fn update(&self, job_id: i64, status: JobStatus, data: Option<&str>) -> StorageResult<bool>;

    /// Gets a job by ID; `None` when it does not exist
    fn get(&self, job_id: i64) -> StorageResult<Option<Job>>;

    /// Lists the most recent jobs first, at most `limit` of them
    fn list(&self, limit: usize) -> StorageResult<Vec<Job>>;

    /// Deletes a job; true iff a row existed and was removed
    fn delete(&self, job_id: i64) -> StorageResult<bool>;
}
