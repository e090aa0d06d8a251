//! Identity types for sources and viewers
//!
//! This module defines the keys the session manager indexes by.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Manifest file name written by the transcoder into each session directory
pub const MANIFEST_FILE: &str = "index.m3u8";

/// Unique identifier for a stream source (camera)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

impl SourceId {
    /// Create a new source ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Name of this source's working directory under the streams root
    pub fn dir_name(&self) -> String {
        format!("camera_{}", self.0)
    }

    /// Working directory for this source under `root`
    pub fn session_dir(&self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }

    /// Manifest path for this source under `root`
    pub fn manifest_path(&self, root: &Path) -> PathBuf {
        self.session_dir(root).join(MANIFEST_FILE)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SourceId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl FromStr for SourceId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Authenticated viewer identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewerId(String);

impl ViewerId {
    /// Create a new viewer ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ViewerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A source ready to be transcoded: its ID and decrypted playback address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSource {
    pub id: SourceId,
    /// Upstream feed location (e.g. `rtsp://...`)
    pub playback_url: String,
}

impl StreamSource {
    /// Create a new stream source
    pub fn new(id: impl Into<SourceId>, playback_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            playback_url: playback_url.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_path_is_derived_from_id() {
        let root = Path::new("./streams");
        let id = SourceId::new(7);

        assert_eq!(id.session_dir(root), Path::new("./streams/camera_7"));
        assert_eq!(
            id.manifest_path(root),
            Path::new("./streams/camera_7/index.m3u8")
        );
    }

    #[test]
    fn test_parse_source_id() {
        assert_eq!("42".parse::<SourceId>().unwrap(), SourceId(42));
        assert_eq!(" 9 ".parse::<SourceId>().unwrap(), SourceId(9));
        assert!("camera".parse::<SourceId>().is_err());
        assert!("-1".parse::<SourceId>().is_err());
    }

    #[test]
    fn test_viewer_display() {
        let viewer = ViewerId::from("alice");
        assert_eq!(viewer.to_string(), "alice");
        assert_eq!(viewer.as_str(), "alice");
    }
}
