//! Database schema definitions and migrations

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    data TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status);
"#;

/// Initializes the database schema and applies pending migrations
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    migrate_created_at(conn)?;
    Ok(())
}

/// Adds `created_at` to job tables created before the column existed
fn migrate_created_at(conn: &Connection) -> Result<(), rusqlite::Error> {
    let mut stmt = conn.prepare("PRAGMA table_info(jobs)")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;

    if !columns.iter().any(|c| c == "created_at") {
        tracing::info!("Migrating jobs table: adding created_at column");
        // SQLite refuses non-constant defaults in ALTER TABLE, so backfill instead
        conn.execute_batch(
            "ALTER TABLE jobs ADD COLUMN created_at TIMESTAMP;
             UPDATE jobs SET created_at = CURRENT_TIMESTAMP WHERE created_at IS NULL;",
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_jobs_table_exists_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='jobs'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_legacy_table_gains_created_at() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE jobs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                status TEXT NOT NULL,
                data TEXT
            );
            INSERT INTO jobs (url, status) VALUES ('https://example.com/', 'completed');",
        )
        .unwrap();

        initialize_schema(&conn).unwrap();

        let created_at: Option<String> = conn
            .query_row("SELECT created_at FROM jobs WHERE id = 1", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(created_at.is_some());
    }
}
