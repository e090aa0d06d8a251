//! Session manager configuration

use std::path::PathBuf;
use std::time::Duration;

/// Shortest poll or reap period; `tokio::time::interval` rejects zero
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Session manager configuration options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding one `camera_<ID>` working directory per session
    pub streams_root: PathBuf,

    /// Delay between manifest existence checks while a session starts
    pub ready_poll_interval: Duration,

    /// Number of manifest checks before a join gives up
    pub ready_poll_attempts: u32,

    /// How often the background reaper looks for exited transcoders
    pub reap_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            streams_root: PathBuf::from("./streams"),
            ready_poll_interval: Duration::from_secs(1),
            ready_poll_attempts: 30,
            reap_interval: Duration::from_secs(10),
        }
    }
}

impl SessionConfig {
    /// Create a new config rooted at `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            streams_root: root.into(),
            ..Default::default()
        }
    }

    /// Set the streams root directory
    pub fn streams_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.streams_root = root.into();
        self
    }

    /// Set the manifest poll interval (at least one millisecond)
    pub fn ready_poll_interval(mut self, interval: Duration) -> Self {
        self.ready_poll_interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Set the number of manifest polls (at least one)
    pub fn ready_poll_attempts(mut self, attempts: u32) -> Self {
        self.ready_poll_attempts = attempts.max(1);
        self
    }

    /// Set the reaper interval (at least one millisecond)
    pub fn reap_interval(mut self, interval: Duration) -> Self {
        self.reap_interval = interval.max(MIN_INTERVAL);
        self
    }

    /// Upper bound on how long a starting join waits for the manifest
    pub fn ready_timeout(&self) -> Duration {
        self.ready_poll_interval.saturating_mul(self.ready_poll_attempts)
    }
}
