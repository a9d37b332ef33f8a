//! Utility functions shared by the store and the downloader

use crate::config::HttpConfig;
use crate::error::{Error, Result};

/// Extension appended to every episode filename
pub const AUDIO_EXTENSION: &str = "mp3";

/// Derive the on-disk filename for an episode from its link
///
/// The name is the text after the last `/` of the link plus [`AUDIO_EXTENSION`].
/// No URL normalisation happens: a link ending in `/` yields `".mp3"`, and the
/// query string (if any) is kept as part of the last segment.
///
/// # Examples
///
/// ```
/// use podcast_ingest::utils::episode_filename;
///
/// assert_eq!(episode_filename("https://site/ep/42"), "42.mp3");
/// ```
pub fn episode_filename(link: &str) -> String {
    let segment = link.rsplit('/').next().unwrap_or(link);
    format!("{}.{}", segment, AUDIO_EXTENSION)
}

/// Build the HTTP client used for both the feed and the enclosures
pub fn http_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))
}
