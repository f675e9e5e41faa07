//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::store::schema::initialize_schema;
use crate::store::traits::{JobStore, StorageError, StorageResult};
use crate::store::{Job, JobStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const JOB_COLUMNS: &str = "id, url, status, data, created_at";

/// SQLite job store
///
/// One connection guarded by a mutex. Each trait method runs a single
/// statement while holding the lock, so readers never see a half-written
/// `(status, data)` pair.
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Opens (or creates) the database at `path`
    ///
    /// Missing parent directories are created.
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<Job> {
    let id: i64 = row.get(0)?;
    let status: String = row.get(2)?;

    // Unknown statuses only come from foreign writers; surface them as failed
    let status = JobStatus::from_db_string(&status).unwrap_or_else(|| {
        tracing::warn!(job_id = id, status = %status, "Unknown job status, reading as failed");
        JobStatus::Failed
    });

    Ok(Job {
        id,
        url: row.get(1)?,
        status,
        data: row.get(3)?,
        created_at: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

impl JobStore for SqliteJobStore {
    fn create(&self, url: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO jobs (url, status, data, created_at) VALUES (?1, ?2, NULL, ?3)",
            params![url, JobStatus::Pending.to_db_string(), now],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn update(&self, job_id: i64, status: JobStatus, data: Option<&str>) -> StorageResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE jobs SET status = ?1, data = ?2 WHERE id = ?3",
            params![status.to_db_string(), data, job_id],
        )?;
        Ok(changed > 0)
    }

    fn get(&self, job_id: i64) -> StorageResult<Option<Job>> {
        let conn = self.conn()?;
        let job = conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
                params![job_id],
                job_from_row,
            )
            .optional()?;
        Ok(job)
    }

    fn list(&self, limit: usize) -> StorageResult<Vec<Job>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM jobs ORDER BY id DESC LIMIT ?1",
            JOB_COLUMNS
        ))?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let jobs = stmt
            .query_map(params![limit], job_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn delete(&self, job_id: i64) -> StorageResult<bool> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM jobs WHERE id = ?1", params![job_id])?;
        Ok(removed > 0)
    }
}
