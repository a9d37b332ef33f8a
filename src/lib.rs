//! # podcast-ingest
//!
//! Scheduled ingestion of a podcast RSS feed into SQLite and a local audio directory.
//!
//! ## Design
//!
//! Each run is a fixed three-step pipeline:
//! - **Fetch** the feed once and parse it strictly into [`EpisodeRecord`]s
//! - **Store** episodes whose link is not yet in the `episodes` table
//! - **Download** audio for episodes whose file is not yet on disk
//!
//! Store and download are idempotent, so a failed or interrupted run is repaired
//! by simply running again. Scheduling and retry policy are left to whatever
//! invokes the binary (cron, a systemd timer, a workflow orchestrator).
//!
//! ## Quick Start
//!
//! ```no_run
//! use podcast_ingest::{Config, Database, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config {
//!         feed_url: "https://feeds.example.com/show.xml".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let db = Database::new(&config.database_path).await?;
//!     let pipeline = Pipeline::from_config(&config, db)?;
//!
//!     let report = pipeline.run().await?;
//!     println!("{report}");
//!
//!     pipeline.close().await;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Audio file downloader
pub mod downloader;
/// Error types
pub mod error;
/// Feed fetching and parsing
pub mod feed;
/// Pipeline driver
pub mod pipeline;
/// Core types
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, HttpConfig};
pub use db::{Database, StoredEpisode};
pub use downloader::AudioDownloader;
pub use error::{
    DownloadError, EpisodeFailure, Error, FetchError, IsRetryable, Result, StorageError,
    ToExitCode,
};
pub use feed::{FeedFetcher, parse_feed};
pub use pipeline::Pipeline;
pub use types::{DownloadSummary, EpisodeRecord, RunReport};
