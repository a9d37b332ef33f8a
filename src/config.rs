//! Configuration types for podcast-ingest
//!
//! Values are layered with [`figment`]: built-in defaults, then an optional TOML
//! file, then `PODCAST_INGEST_*` environment variables (nested keys use `__`,
//! e.g. `PODCAST_INGEST_HTTP__TIMEOUT=60`). The binary merges its command line
//! overrides on top before calling [`Config::from_figment`].

use crate::error::{Error, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "PODCAST_INGEST_";

/// HTTP client settings shared by the feed fetcher and the audio downloader
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for the ingestion pipeline
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// RSS feed to ingest
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// SQLite database holding the `episodes` table (default: "podcast-ingest.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Directory audio files are written to (default: "episodes")
    #[serde(default = "default_episodes_dir")]
    pub episodes_dir: PathBuf,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            database_path: default_database_path(),
            episodes_dir: default_episodes_dir(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Build the standard provider stack: defaults, optional TOML file, environment
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Extract and validate a configuration from a figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| Error::Config {
            key: (!e.path.is_empty()).then(|| e.path.join(".")),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot work at runtime
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.feed_url)
            .map_err(|e| Error::config("feed_url", format!("'{}': {}", self.feed_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(
                "feed_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }

        if self.episodes_dir.as_os_str().is_empty() {
            return Err(Error::config("episodes_dir", "must not be empty"));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(Error::config("database_path", "must not be empty"));
        }

        if self.http.timeout.is_zero() {
            return Err(Error::config("http.timeout", "must be at least one second"));
        }

        Ok(())
    }
}

// Default value functions
fn default_feed_url() -> String {
    "https://www.marketplace.org/feed/podcast/marketplace/".into()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("podcast-ingest.db")
}

fn default_episodes_dir() -> PathBuf {
    PathBuf::from("episodes")
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("podcast-ingest/", env!("CARGO_PKG_VERSION")).into()
}

// Duration serialization helper (as seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
