//! SQLite record handler
//!
//! Appends every record of a job as a JSON row to a local SQLite database.

use crate::extract::Record;
use crate::output::traits::{Handler, HandlerError, HandlerResult};
use crate::state::JobContext;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        job TEXT NOT NULL,
        position INTEGER NOT NULL,
        data TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_records_job ON records(job);
";

/// Stores records in a `records` table, one JSON document per row
#[derive(Debug, Clone)]
pub struct SqliteHandler {
    path: PathBuf,
}

impl SqliteHandler {
    /// Creates a handler writing to the database at `path`
    ///
    /// The file and schema are created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Opens the database and makes sure the schema exists
fn open_database(path: &Path) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
    ",
    )?;
    conn.execute_batch(SCHEMA)?;
    Ok(conn)
}

/// Inserts all rows inside a single transaction
fn insert_records(path: &Path, job: &str, rows: &[String]) -> Result<(), rusqlite::Error> {
    let mut conn = open_database(path)?;
    let now = Utc::now().to_rfc3339();

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO records (job, position, data, created_at) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, data) in rows.iter().enumerate() {
            stmt.execute(params![job, position as i64, data, now])?;
        }
    }
    tx.commit()
}

#[async_trait]
impl Handler for SqliteHandler {
    async fn process(&self, ctx: &mut JobContext, records: &[Record]) -> HandlerResult<()> {
        let rows = records
            .iter()
            .map(serde_json::to_string)
            .collect::<Result<Vec<_>, _>>()?;
        let count = rows.len();
        let path = self.path.clone();
        let job = ctx.job_name().to_string();

        tokio::task::spawn_blocking(move || insert_records(&path, &job, &rows))
            .await
            .map_err(|e| HandlerError::Storage(format!("SQLite task failed: {}", e)))??;

        tracing::info!(
            parent: ctx.span(),
            "Stored {} records in {}",
            count,
            self.path.display()
        );
        Ok(())
    }
}
