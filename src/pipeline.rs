//! Pipeline driver
//!
//! One [`Pipeline::run`] is one ingestion pass:
//!
//! 1. make sure the episodes table exists
//! 2. fetch the feed once
//! 3. store new episode rows and download missing audio, concurrently
//!
//! Steps 3a and 3b only read the fetched list (one touches the database, the
//! other the filesystem), so they are joined rather than sequenced. Nothing is
//! retried here; the first error is handed back to whoever scheduled the run.

use crate::config::Config;
use crate::db::Database;
use crate::downloader::AudioDownloader;
use crate::error::Result;
use crate::feed::FeedFetcher;
use crate::types::RunReport;
use crate::utils::http_client;
use tracing::{info, warn};

/// The three-step ingestion pipeline
pub struct Pipeline {
    fetcher: FeedFetcher,
    db: Database,
    downloader: AudioDownloader,
}

impl Pipeline {
    /// Assemble a pipeline from its parts
    pub fn new(fetcher: FeedFetcher, db: Database, downloader: AudioDownloader) -> Self {
        Self {
            fetcher,
            db,
            downloader,
        }
    }

    /// Build the fetcher and downloader described by `config` around an open database
    ///
    /// Both share one HTTP client.
    pub fn from_config(config: &Config, db: Database) -> Result<Self> {
        let client = http_client(&config.http)?;
        Ok(Self::new(
            FeedFetcher::new(client.clone(), config.feed_url.clone()),
            db,
            AudioDownloader::new(client, config.episodes_dir.clone()),
        ))
    }

    /// The database handle the pipeline writes to
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Execute one ingestion pass
    ///
    /// # Errors
    /// - `Storage` if the schema cannot be created or the new rows cannot be written
    /// - `Fetch` if the feed is unreachable or malformed; nothing is written in that case
    /// - `Download` if any enclosure failed; every other episode was still attempted
    ///
    /// When both branches fail, the storage error is returned and the download
    /// error is logged as a warning. The returned error itself is not logged.
    pub async fn run(&self) -> Result<RunReport> {
        self.db.ensure_schema().await?;

        let episodes = self.fetcher.fetch().await?;

        let (stored, downloaded) = tokio::join!(
            self.db.insert_new(&episodes),
            self.downloader.ensure_downloaded(&episodes),
        );

        match (stored, downloaded) {
            (Ok(inserted), Ok(summary)) => {
                let report = RunReport {
                    fetched: episodes.len(),
                    inserted,
                    downloaded: summary.downloaded,
                    skipped: summary.skipped,
                };
                info!(
                    fetched = report.fetched,
                    inserted = report.inserted,
                    downloaded = report.downloaded,
                    skipped = report.skipped,
                    "Pipeline run complete"
                );
                Ok(report)
            }
            (Err(store_err), download_result) => {
                // Only the store error reaches the caller
                if let Err(download_err) = download_result {
                    warn!(error = %download_err, "Audio download step also failed");
                }
                Err(store_err)
            }
            (Ok(_), Err(download_err)) => Err(download_err),
        }
    }

    /// Release the database handle
    pub async fn close(self) {
        self.db.close().await;
    }
}
