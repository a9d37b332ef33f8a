//! Audio downloader
//!
//! Makes sure every episode's audio file exists in the episodes directory.
//! Presence is decided by filename alone: a file that is already there is
//! never fetched again, whatever its size or content. Episodes are handled one
//! after another and independently, so one failing enclosure does not stop the
//! rest; failures are collected and reported once all episodes were tried.

use crate::error::{DownloadError, EpisodeFailure, Result};
use crate::types::{DownloadSummary, EpisodeRecord};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What happened to a single episode
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EpisodeOutcome {
    /// File was already on disk, no request made
    Present,
    /// File was fetched and written
    Downloaded {
        /// Size of the written file
        bytes: usize,
    },
}

/// Downloads episode enclosures into a local directory
pub struct AudioDownloader {
    /// HTTP client shared with the feed fetcher
    http_client: reqwest::Client,

    /// Directory the audio files live in
    episodes_dir: PathBuf,
}

impl AudioDownloader {
    /// Create a downloader writing into `episodes_dir`
    pub fn new(http_client: reqwest::Client, episodes_dir: impl Into<PathBuf>) -> Self {
        Self {
            http_client,
            episodes_dir: episodes_dir.into(),
        }
    }

    /// Directory the audio files are written to
    pub fn episodes_dir(&self) -> &Path {
        &self.episodes_dir
    }

    /// Where the audio of `episode` is stored
    pub fn episode_path(&self, episode: &EpisodeRecord) -> PathBuf {
        self.episodes_dir.join(episode.filename())
    }

    /// Download every episode whose file is not present yet
    ///
    /// All episodes are attempted even if some fail. If any failed, the result
    /// is [`DownloadError::Incomplete`] listing them; files written for the
    /// other episodes stay in place.
    pub async fn ensure_downloaded(&self, episodes: &[EpisodeRecord]) -> Result<DownloadSummary> {
        tokio::fs::create_dir_all(&self.episodes_dir)
            .await
            .map_err(|source| DownloadError::Write {
                path: self.episodes_dir.clone(),
                source,
            })?;

        let mut summary = DownloadSummary::default();
        let mut failures = Vec::new();

        for episode in episodes {
            let filename = episode.filename();
            let path = self.episode_path(episode);

            match self.download_episode(episode, &path).await {
                Ok(EpisodeOutcome::Present) => {
                    debug!(filename = %filename, "Audio already present, skipping");
                    summary.skipped += 1;
                }
                Ok(EpisodeOutcome::Downloaded { bytes }) => {
                    info!(filename = %filename, bytes, "Downloaded episode audio");
                    summary.downloaded += 1;
                }
                Err(error) => {
                    warn!(
                        filename = %filename,
                        url = %episode.audio_url,
                        error = %error,
                        "Failed to download episode audio"
                    );
                    failures.push(EpisodeFailure { filename, error });
                }
            }
        }

        if !failures.is_empty() {
            return Err(DownloadError::Incomplete {
                attempted: summary.downloaded + failures.len(),
                failures,
            }
            .into());
        }

        Ok(summary)
    }

    /// Fetch one enclosure unless its file already exists
    async fn download_episode(
        &self,
        episode: &EpisodeRecord,
        path: &Path,
    ) -> std::result::Result<EpisodeOutcome, DownloadError> {
        // An unreadable path fails the episode instead of counting as absent
        let present = tokio::fs::try_exists(path)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        if present {
            return Ok(EpisodeOutcome::Present);
        }

        debug!(path = %path.display(), url = %episode.audio_url, "Downloading episode audio");

        let url = &episode.audio_url;
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        let content = response
            .bytes()
            .await
            .map_err(|source| DownloadError::Request {
                url: url.clone(),
                source,
            })?;

        // create or truncate
        tokio::fs::write(path, &content)
            .await
            .map_err(|source| DownloadError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(EpisodeOutcome::Downloaded {
            bytes: content.len(),
        })
    }
}
