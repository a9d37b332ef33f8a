//! Error types for podcast-ingest
//!
//! The taxonomy follows the three pipeline steps:
//! - [`FetchError`]: the feed could not be retrieved or parsed; the run aborts before any write
//! - [`StorageError`]: the episode table could not be created, read or written
//! - [`DownloadError`]: one or more enclosures could not be downloaded
//!
//! Nothing in this crate retries. [`ToExitCode`] and [`IsRetryable`] exist so the external
//! orchestrator running the binary can tell failure classes apart and pick its own retry policy.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for podcast-ingest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for podcast-ingest
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "feed_url")
        key: Option<String>,
    },

    /// Feed retrieval or parsing failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Episode store operation failed
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Audio download failed
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a [`Error::Config`] tied to a specific key
    pub fn config(key: &str, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.to_string()),
        }
    }
}

/// Feed retrieval and parsing errors
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP request could not be sent or timed out
    #[error("failed to fetch feed '{url}': {source}")]
    Request {
        /// Feed URL
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status
    #[error("feed '{url}' returned HTTP {status}")]
    Status {
        /// Feed URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be read
    #[error("failed to read feed body from '{url}': {source}")]
    Body {
        /// Feed URL
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The body is not a well-formed RSS document
    #[error("malformed feed: {0}")]
    Parse(String),

    /// The channel has no `item` elements
    #[error("feed has no rss.channel.item entries")]
    NoEpisodes,

    /// An item lacks one of the fields every episode needs
    #[error("feed item {index} is missing '{field}'")]
    MissingField {
        /// Zero-based position of the item in the feed
        index: usize,
        /// Name of the missing element or attribute (e.g., "enclosure@url")
        field: &'static str,
    },
}

/// Episode store errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Failed to open or reach the database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create the episodes table
    #[error("failed to create schema: {0}")]
    SchemaFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Constraint violation (e.g., a concurrent run inserted the same episode link)
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Audio download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP request for an enclosure could not be sent or timed out
    #[error("failed to fetch '{url}': {source}")]
    Request {
        /// Enclosure URL
        url: String,
        /// Underlying HTTP client error
        #[source]
        source: reqwest::Error,
    },

    /// The enclosure URL answered with a non-success status
    #[error("'{url}' returned HTTP {status}")]
    Status {
        /// Enclosure URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The audio file could not be written
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Some episodes failed; the rest were still attempted
    #[error(
        "{} of {attempted} episode downloads failed: {}",
        .failures.len(),
        FailureList(.failures)
    )]
    Incomplete {
        /// Number of episodes that needed a download in this run
        attempted: usize,
        /// One entry per failed episode, in feed order
        failures: Vec<EpisodeFailure>,
    },
}

/// A single failed episode inside [`DownloadError::Incomplete`]
#[derive(Debug)]
pub struct EpisodeFailure {
    /// Target filename of the episode
    pub filename: String,
    /// Why the download failed
    pub error: DownloadError,
}

struct FailureList<'a>(&'a [EpisodeFailure]);

impl fmt::Display for FailureList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{} ({})", failure.filename, failure.error)?;
        }
        Ok(())
    }
}

/// Map errors to process exit codes for the orchestrator
///
/// Codes come from `sysexits.h` so wrappers can branch on the failure class
/// without parsing log output.
pub trait ToExitCode {
    /// Process exit code for this error
    fn exit_code(&self) -> u8;

    /// Machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> u8 {
        match self {
            // EX_CONFIG
            Error::Config { .. } => 78,
            // EX_UNAVAILABLE - the feed source is not usable
            Error::Fetch(_) => 69,
            // EX_IOERR
            Error::Storage(_) => 74,
            // EX_TEMPFAIL - missing files are picked up by the next run
            Error::Download(_) => 75,
            Error::Other(_) => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Fetch(e) => match e {
                FetchError::Request { .. } | FetchError::Body { .. } => "feed_unreachable",
                FetchError::Status { .. } => "feed_http_status",
                FetchError::Parse(_) => "feed_malformed",
                FetchError::NoEpisodes => "feed_empty",
                FetchError::MissingField { .. } => "feed_incomplete_item",
            },
            Error::Storage(e) => match e {
                StorageError::ConnectionFailed(_) => "database_unavailable",
                StorageError::SchemaFailed(_) => "schema_failed",
                StorageError::QueryFailed(_) => "database_error",
                StorageError::ConstraintViolation(_) => "constraint_violation",
            },
            Error::Download(e) => match e {
                DownloadError::Incomplete { .. } => "downloads_incomplete",
                _ => "download_failed",
            },
            Error::Other(_) => "internal_error",
        }
    }
}

/// Classify errors as transient (worth retrying by the orchestrator) or permanent
pub trait IsRetryable {
    /// Returns true if running the pipeline again may succeed without intervention
    fn is_retryable(&self) -> bool;
}

fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Request { source, .. } | FetchError::Body { source, .. } => {
                source.is_timeout() || source.is_connect()
            }
            FetchError::Status { status, .. } => is_transient_status(*status),
            // A broken feed document stays broken until the publisher fixes it
            FetchError::Parse(_) | FetchError::NoEpisodes | FetchError::MissingField { .. } => {
                false
            }
        }
    }
}

impl IsRetryable for DownloadError {
    fn is_retryable(&self) -> bool {
        match self {
            DownloadError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            DownloadError::Status { status, .. } => is_transient_status(*status),
            DownloadError::Write { .. } => false,
            DownloadError::Incomplete { failures, .. } => {
                failures.iter().all(|f| f.error.is_retryable())
            }
        }
    }
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Fetch(e) => e.is_retryable(),
            Error::Download(e) => e.is_retryable(),
            // Lost the insert race to an overlapping run; the next run sees the row
            Error::Storage(StorageError::ConstraintViolation(_)) => true,
            Error::Storage(_) => false,
            Error::Config { .. } => false,
            Error::Other(_) => false,
        }
    }
}
