//! Feed retrieval and strict RSS parsing.
//!
//! The fetcher issues exactly one GET per call and turns the RSS 2.0 document
//! into typed [`EpisodeRecord`]s. Parsing is all-or-nothing: a malformed
//! document, an empty channel, or any item lacking one of the fields an episode
//! needs fails the whole fetch, so nothing downstream ever sees half a feed.

use crate::error::FetchError;
use crate::types::EpisodeRecord;
use tracing::{debug, info};

/// Fetches and parses the podcast feed
pub struct FeedFetcher {
    /// HTTP client shared with the downloader
    http_client: reqwest::Client,

    /// Feed URL
    url: String,
}

impl FeedFetcher {
    /// Create a fetcher for `url` using an existing HTTP client
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
        }
    }

    /// Fetch the feed and return its episodes in feed order
    ///
    /// # Errors
    /// Returns error if:
    /// - the request fails or times out
    /// - the server answers with a non-success status
    /// - the body is not an RSS document with at least one complete item
    pub async fn fetch(&self) -> Result<Vec<EpisodeRecord>, FetchError> {
        debug!(url = %self.url, "Fetching podcast feed");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        // Check HTTP status before trying to parse the response body
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        // Raw bytes: the XML prolog, not the HTTP charset, decides the encoding
        let content = response.bytes().await.map_err(|source| FetchError::Body {
            url: self.url.clone(),
            source,
        })?;

        let episodes = parse_feed(&content)?;
        info!(url = %self.url, count = episodes.len(), "Found {} episodes", episodes.len());
        Ok(episodes)
    }
}

/// Parse an RSS 2.0 document into episode records
///
/// Every `rss.channel.item` must provide `link`, `title`, `pubDate`,
/// `description` and an `enclosure` with a `url`. `link` and `enclosure@url`
/// must also be non-blank since they become the primary key and the download
/// source.
///
/// `content` is the undecoded document; a non-UTF-8 feed is decoded according
/// to its `<?xml encoding="..."?>` declaration.
pub fn parse_feed(content: &[u8]) -> Result<Vec<EpisodeRecord>, FetchError> {
    let channel = rss::Channel::read_from(content)
        .map_err(|e| FetchError::Parse(e.to_string()))?;

    if channel.items().is_empty() {
        return Err(FetchError::NoEpisodes);
    }

    channel
        .items()
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let missing = |field| FetchError::MissingField { index, field };

            let link = item
                .link()
                .filter(|l| !l.trim().is_empty())
                .ok_or_else(|| missing("link"))?;
            let title = item.title().ok_or_else(|| missing("title"))?;
            let pub_date = item.pub_date().ok_or_else(|| missing("pubDate"))?;
            let description = item.description().ok_or_else(|| missing("description"))?;
            let audio_url = item
                .enclosure()
                .map(|enc| enc.url())
                .filter(|u| !u.trim().is_empty())
                .ok_or_else(|| missing("enclosure@url"))?;

            Ok(EpisodeRecord {
                link: link.to_string(),
                title: title.to_string(),
                pub_date: pub_date.to_string(),
                description: description.to_string(),
                audio_url: audio_url.to_string(),
            })
        })
        .collect()
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
