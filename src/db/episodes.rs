//! Episode lookups and batch inserts.

use crate::error::StorageError;
use crate::types::EpisodeRecord;
use crate::{Error, Result};
use std::collections::HashSet;
use tracing::{debug, info};

use super::{Database, StoredEpisode};

/// Map an sqlx error, singling out primary-key conflicts
fn query_error(context: &str, e: sqlx::Error) -> Error {
    if let Some(db_err) = e.as_database_error()
        && db_err.is_unique_violation()
    {
        return Error::Storage(StorageError::ConstraintViolation(format!(
            "{}: {}",
            context, db_err
        )));
    }
    Error::Storage(StorageError::QueryFailed(format!("{}: {}", context, e)))
}

impl Database {
    /// Links of all episodes already stored
    pub async fn existing_links(&self) -> Result<HashSet<String>> {
        // A TEXT primary key may hold NULL in SQLite, so decode as Option
        let links: Vec<Option<String>> = sqlx::query_scalar("SELECT episode_link FROM episodes")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| query_error("Failed to load stored episode links", e))?;

        Ok(links.into_iter().flatten().collect())
    }

    /// Insert every episode whose link is not stored yet
    ///
    /// Links are compared verbatim. A link listed twice in `episodes` is inserted
    /// once. All rows go in with a single transaction, so either the whole delta
    /// is stored or none of it is.
    ///
    /// Returns the number of inserted rows.
    pub async fn insert_new(&self, episodes: &[EpisodeRecord]) -> Result<usize> {
        let existing = self.existing_links().await?;

        let mut batch_links = HashSet::new();
        let new_episodes: Vec<&EpisodeRecord> = episodes
            .iter()
            .filter(|ep| !existing.contains(&ep.link) && batch_links.insert(ep.link.as_str()))
            .collect();

        if new_episodes.is_empty() {
            debug!(
                listed = episodes.len(),
                "No new episodes to store, all links already known"
            );
            return Ok(0);
        }

        self.insert_batch(&new_episodes).await?;

        info!(
            inserted = new_episodes.len(),
            listed = episodes.len(),
            "Stored new episodes"
        );
        Ok(new_episodes.len())
    }

    /// Insert rows unconditionally inside one transaction
    ///
    /// A link that already exists fails the whole batch with
    /// [`StorageError::ConstraintViolation`]; the transaction is rolled back on drop.
    pub(crate) async fn insert_batch(&self, episodes: &[&EpisodeRecord]) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| query_error("Failed to begin transaction", e))?;

        for ep in episodes {
            sqlx::query(
                r#"
                INSERT INTO episodes (episode_link, title, filename, date_of_publish, description)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&ep.link)
            .bind(&ep.title)
            .bind(ep.filename())
            .bind(&ep.pub_date)
            .bind(&ep.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| query_error(&format!("Failed to insert episode '{}'", ep.link), e))?;
        }

        tx.commit()
            .await
            .map_err(|e| query_error("Failed to commit episode batch", e))?;

        Ok(())
    }

    /// All stored episodes in insertion order
    pub async fn episodes(&self) -> Result<Vec<StoredEpisode>> {
        sqlx::query_as::<_, StoredEpisode>(
            r#"
            SELECT episode_link, title, filename, date_of_publish, description, transcript
            FROM episodes
            WHERE episode_link IS NOT NULL
            ORDER BY rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| query_error("Failed to list episodes", e))
    }

    /// Look up a single stored episode by link
    pub async fn episode(&self, link: &str) -> Result<Option<StoredEpisode>> {
        sqlx::query_as::<_, StoredEpisode>(
            r#"
            SELECT episode_link, title, filename, date_of_publish, description, transcript
            FROM episodes
            WHERE episode_link = ?
            "#,
        )
        .bind(link)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| query_error("Failed to get episode", e))
    }
}
