//! Database lifecycle and schema creation.

use crate::error::StorageError;
use crate::{Error, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use super::Database;

/// DDL for the episodes table; the column layout is shared with other tools reading the file.
const CREATE_EPISODES_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS episodes (
        episode_link TEXT PRIMARY KEY,
        title TEXT,
        filename TEXT,
        date_of_publish TEXT,
        description TEXT,
        transcript TEXT
    )
"#;

impl Database {
    /// Open (or create) the SQLite database at `path`
    ///
    /// Only connects; call [`Database::ensure_schema`] before using the episode methods.
    pub async fn new(path: &Path) -> Result<Self> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Storage(StorageError::ConnectionFailed(format!(
                    "Failed to create database directory: {}",
                    e
                )))
            })?;
        }

        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .map_err(|e| {
                Error::Storage(StorageError::ConnectionFailed(format!(
                    "Failed to parse database path: {}",
                    e
                )))
            })?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePool::connect_with(options).await.map_err(|e| {
            Error::Storage(StorageError::ConnectionFailed(format!(
                "Failed to connect to database: {}",
                e
            )))
        })?;

        debug!(path = %path.display(), "Opened episode database");
        Ok(Self { pool })
    }

    /// Create the episodes table if it does not exist yet
    ///
    /// Safe to call on every run; an existing table and its rows are left untouched.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(CREATE_EPISODES_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                Error::Storage(StorageError::SchemaFailed(format!(
                    "Failed to create episodes table: {}",
                    e
                )))
            })?;

        Ok(())
    }

    /// Close the database connection
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Get the underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
