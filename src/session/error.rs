//! Session error types
//!
//! Error types for session manager operations.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use super::key::{SourceId, ViewerId};

/// Broad classification of a [`SessionError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source or viewer attachment does not exist
    NotFound,
    /// Transcoder could not be started
    LaunchFailure,
    /// Manifest did not appear in time
    ReadinessTimeout,
    /// Transcoder was killed but its artifacts could not be removed
    TeardownFailure,
    /// Transcoder could not be killed
    KillFailure,
}

/// Error type for session operations
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session is running for the source
    #[error("Session not active: camera {0}")]
    SessionNotActive(SourceId),

    /// Viewer is not attached to the source's session
    #[error("Viewer {viewer} is not attached to camera {source_id}")]
    ViewerNotAttached {
        source_id: SourceId,
        viewer: ViewerId,
    },

    /// The working directory could not be created or the process could not be spawned
    #[error("Failed to launch transcoder for camera {source_id}: {error}")]
    Launch {
        source_id: SourceId,
        #[source]
        error: io::Error,
    },

    /// The manifest did not appear within the readiness budget
    #[error("Timed out after {waited:?} waiting for {}", .manifest.display())]
    ReadinessTimeout {
        source_id: SourceId,
        manifest: PathBuf,
        waited: Duration,
    },

    /// Sending the kill signal failed; the session stays registered
    #[error("Failed to kill transcoder for camera {source_id}: {error}")]
    Kill {
        source_id: SourceId,
        #[source]
        error: io::Error,
    },

    /// Process is gone but the working directory could not be removed
    #[error("Failed to remove {} for camera {source_id}: {error}", .dir.display())]
    Teardown {
        source_id: SourceId,
        dir: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl SessionError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::SessionNotActive(_) | SessionError::ViewerNotAttached { .. } => {
                ErrorKind::NotFound
            }
            SessionError::Launch { .. } => ErrorKind::LaunchFailure,
            SessionError::ReadinessTimeout { .. } => ErrorKind::ReadinessTimeout,
            SessionError::Kill { .. } => ErrorKind::KillFailure,
            SessionError::Teardown { .. } => ErrorKind::TeardownFailure,
        }
    }

    /// Whether the error means the referenced session or attachment does not exist
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
