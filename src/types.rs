//! Core types for podcast-ingest

use serde::{Deserialize, Serialize};

use crate::utils::episode_filename;

/// One episode as listed in the feed
///
/// Produced fresh by every fetch and discarded at the end of the run. All
/// fields are the feed's text verbatim; `pub_date` in particular is not parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    /// Episode page URL, the unique key of an episode
    pub link: String,

    /// Episode title
    pub title: String,

    /// Publication date as written in the feed's `pubDate`
    pub pub_date: String,

    /// Episode description
    pub description: String,

    /// Enclosure URL of the audio file
    pub audio_url: String,
}

impl EpisodeRecord {
    /// Filename the audio is stored under (see [`episode_filename`])
    pub fn filename(&self) -> String {
        episode_filename(&self.link)
    }
}

/// Outcome of one downloader pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadSummary {
    /// Files fetched and written in this pass
    pub downloaded: usize,

    /// Episodes whose file was already present
    pub skipped: usize,
}

/// Outcome of one full pipeline run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Episodes listed in the feed
    pub fetched: usize,

    /// New rows written to the episodes table
    pub inserted: usize,

    /// Audio files downloaded
    pub downloaded: usize,

    /// Audio files already on disk
    pub skipped: usize,
}

impl std::fmt::Display for RunReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "fetched {} episodes, stored {} new, downloaded {}, {} already on disk",
            self.fetched, self.inserted, self.downloaded, self.skipped
        )
    }
}
