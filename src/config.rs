//! Configuration types for page-dl

use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::error::{Error, Result};

/// Queue and worker behavior
///
/// Used as a flattened sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QueueConfig {
    /// How often the idle worker re-checks the wait list (default: 1000ms)
    ///
    /// `accept` wakes the worker immediately; the interval is the upper bound
    /// between checks when no wake-up arrives.
    #[serde(default = "default_poll_interval", with = "duration_ms_serde")]
    pub poll_interval: Duration,

    /// Event broadcast buffer size (default: 1000)
    ///
    /// Subscribers that fall further behind receive `RecvError::Lagged`.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,

    /// What to do when an already-queued document is accepted again
    #[serde(default)]
    pub duplicate_action: DuplicateAction,

    /// How long `shutdown` waits for the worker to go idle (default: 30000ms)
    #[serde(default = "default_shutdown_timeout", with = "duration_ms_serde")]
    pub shutdown_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            event_channel_capacity: default_event_channel_capacity(),
            duplicate_action: DuplicateAction::default(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Action to take when an already-queued document is accepted again
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateAction {
    /// Enqueue again without comment
    Allow,
    /// Enqueue again, log a warning and emit an event (default)
    #[default]
    Warn,
    /// Leave the queue unchanged, log and emit an event
    Block,
}

/// On-disk layout used by [`FsStorage`](crate::collaborators::FsStorage)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding one sub-directory per document (default: "./library")
    #[serde(default = "default_root_dir")]
    pub root_dir: PathBuf,

    /// Metadata file name inside each document directory (default: "metadata.json")
    #[serde(default = "default_metadata_file")]
    pub metadata_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            metadata_file: default_metadata_file(),
        }
    }
}

/// HTTP client settings used by [`HttpPageFetcher`](crate::collaborators::HttpPageFetcher)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (default: 30000ms)
    #[serde(default = "default_http_timeout", with = "duration_ms_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every page request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Main configuration for [`DownloadManager`](crate::DownloadManager)
///
/// Queue settings are flattened to the top level; storage and HTTP settings
/// are nested under `storage` and `http`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Queue and worker behavior
    #[serde(flatten)]
    pub queue: QueueConfig,

    /// On-disk layout for the filesystem storage adapter
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP client settings for the page fetcher adapter
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    /// Check settings that would make the worker misbehave
    pub fn validate(&self) -> Result<()> {
        if self.queue.poll_interval.is_zero() {
            return Err(Error::config(
                "poll_interval",
                "poll_interval must be greater than zero",
            ));
        }
        if self.queue.event_channel_capacity == 0 {
            return Err(Error::config(
                "event_channel_capacity",
                "event_channel_capacity must be greater than zero",
            ));
        }
        if self.storage.metadata_file.trim().is_empty() {
            return Err(Error::config(
                "storage.metadata_file",
                "metadata_file must not be empty",
            ));
        }
        Ok(())
    }
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(1000)
}

fn default_event_channel_capacity() -> usize {
    1000
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_root_dir() -> PathBuf {
    PathBuf::from("./library")
}

fn default_metadata_file() -> String {
    "metadata.json".to_string()
}

fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("page-dl/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper (milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
