//! Database layer for podcast-ingest
//!
//! Handles SQLite persistence of the episodes table.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by concern:
//! - [`schema`]: connection lifecycle and idempotent table creation
//! - [`episodes`]: episode lookups and batch inserts

use serde::Serialize;
use sqlx::{FromRow, sqlite::SqlitePool};

mod episodes;
mod schema;

/// Episode row from the `episodes` table
///
/// Every column except the primary key is nullable in the schema, so they are
/// decoded as `Option` even though this pipeline always fills them.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct StoredEpisode {
    /// Episode page URL (primary key)
    pub episode_link: String,
    /// Episode title
    pub title: Option<String>,
    /// Audio filename inside the episodes directory
    pub filename: Option<String>,
    /// Publication date as written in the feed
    pub date_of_publish: Option<String>,
    /// Episode description
    pub description: Option<String>,
    /// Transcript text, never populated by this pipeline
    pub transcript: Option<String>,
}

/// Database handle for podcast-ingest
///
/// Owns the connection pool. Callers create it once per run, pass it to the
/// pipeline, and release it with [`Database::close`].
pub struct Database {
    pool: SqlitePool,
}
