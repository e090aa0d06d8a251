//! Stream service
//!
//! Glue between a request layer and the session manager. `start` performs
//! the checks a `POST /start/{id}` handler needs (access, camera lookup,
//! address decryption) before joining; `stop` backs `POST /stop/{id}`.
//! Errors carry the HTTP status a handler should answer with.

pub mod directory;

use std::sync::Arc;

use thiserror::Error;

use crate::launcher::{FfmpegLauncher, Launcher};
use crate::session::{
    ErrorKind, JoinOutcome, SessionError, SessionManager, SourceId, StreamSource, ViewerId,
    MANIFEST_FILE,
};

pub use directory::{
    AccessPolicy, BoxError, PlaybackDecryptor, Plaintext, SourceDirectory, SourceRecord,
    StaticAccess, StaticSources,
};

/// Error type for stream service operations
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Path segment is not a camera ID
    #[error("Invalid camera ID: {0:?}")]
    InvalidSourceId(String),

    /// Viewer may not watch the camera
    #[error("Viewer {viewer} may not watch camera {source_id}")]
    AccessDenied {
        source_id: SourceId,
        viewer: ViewerId,
    },

    /// No such camera
    #[error("Camera not found: {0}")]
    UnknownSource(SourceId),

    /// Metadata or access lookup failed
    #[error("Lookup failed for camera {source_id}: {error}")]
    Lookup {
        source_id: SourceId,
        #[source]
        error: BoxError,
    },

    /// Stored playback address could not be decrypted
    #[error("Failed to decrypt playback address for camera {source_id}: {error}")]
    Decrypt {
        source_id: SourceId,
        #[source]
        error: BoxError,
    },

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ServiceError {
    /// HTTP status code a request handler should respond with
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::InvalidSourceId(_) => 400,
            ServiceError::AccessDenied { .. } => 403,
            ServiceError::UnknownSource(_) => 404,
            ServiceError::Lookup { .. } | ServiceError::Decrypt { .. } => 500,
            ServiceError::Session(e) => match e.kind() {
                ErrorKind::NotFound => 404,
                _ => 500,
            },
        }
    }
}

/// Parse a camera ID taken from a request path
pub fn parse_source_id(raw: &str) -> Result<SourceId, ServiceError> {
    raw.parse()
        .map_err(|_| ServiceError::InvalidSourceId(raw.to_string()))
}

/// Public playlist path for a camera, relative to the static `/streams` mount
pub fn playlist_url(source: SourceId) -> String {
    format!("/streams/{}/{}", source.dir_name(), MANIFEST_FILE)
}

/// Successful start
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartResponse {
    /// Human-readable status message
    pub message: String,
    /// Playlist URL for the player
    pub playlist: String,
    pub outcome: JoinOutcome,
}

/// Successful stop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopResponse {
    /// Human-readable status message
    pub message: String,
}

/// Request-facing front of the session manager
pub struct StreamService<D, A, C = Plaintext, L = FfmpegLauncher> {
    manager: Arc<SessionManager<L>>,
    sources: D,
    access: A,
    decryptor: C,
}

impl<D, A, C, L> StreamService<D, A, C, L>
where
    D: SourceDirectory,
    A: AccessPolicy,
    C: PlaybackDecryptor,
    L: Launcher,
{
    /// Create a new service
    pub fn new(manager: Arc<SessionManager<L>>, sources: D, access: A, decryptor: C) -> Self {
        Self {
            manager,
            sources,
            access,
            decryptor,
        }
    }

    /// Get the session manager
    pub fn manager(&self) -> &Arc<SessionManager<L>> {
        &self.manager
    }

    /// Start (or join) the stream of `source` for `viewer`
    pub async fn start(
        &self,
        source: SourceId,
        viewer: &ViewerId,
    ) -> Result<StartResponse, ServiceError> {
        let allowed = self
            .access
            .can_view(source, viewer)
            .await
            .map_err(|error| ServiceError::Lookup {
                source_id: source,
                error,
            })?;
        if !allowed {
            tracing::info!(source = %source, viewer = %viewer, "Access denied");
            return Err(ServiceError::AccessDenied {
                source_id: source,
                viewer: viewer.clone(),
            });
        }

        let record = self
            .sources
            .lookup(source)
            .await
            .map_err(|error| ServiceError::Lookup {
                source_id: source,
                error,
            })?
            .ok_or(ServiceError::UnknownSource(source))?;

        let playback_url = self
            .decryptor
            .decrypt(&record.encrypted_url)
            .map_err(|error| ServiceError::Decrypt {
                source_id: source,
                error,
            })?;

        let outcome = self
            .manager
            .join(&StreamSource::new(source, playback_url), viewer)
            .await?;

        Ok(StartResponse {
            message: format!("Streaming camera {}", record.location),
            playlist: playlist_url(source),
            outcome,
        })
    }

    /// Stop watching `source`
    pub async fn stop(
        &self,
        source: SourceId,
        viewer: &ViewerId,
    ) -> Result<StopResponse, ServiceError> {
        self.manager.leave(source, viewer).await?;

        Ok(StopResponse {
            message: format!("Stopped streaming camera {}", source),
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::io;
    use std::path::Path;
    use std::time::Duration;

    use tokio::process::{Child, Command};
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::session::SessionConfig;

    fn serving(_: &StreamSource, manifest: &Path) -> io::Result<Child> {
        Command::new("sh")
            .arg("-c")
            .arg("echo '#EXTM3U' > \"$1\"; exec sleep 30")
            .arg("sh")
            .arg(manifest)
            .kill_on_drop(true)
            .spawn()
    }

    struct Rot13;

    impl PlaybackDecryptor for Rot13 {
        fn decrypt(&self, encrypted: &str) -> Result<String, BoxError> {
            if encrypted.is_empty() {
                return Err("empty address".into());
            }
            Ok(encrypted
                .chars()
                .map(|c| match c {
                    'a'..='m' | 'A'..='M' => (c as u8 + 13) as char,
                    'n'..='z' | 'N'..='Z' => (c as u8 - 13) as char,
                    _ => c,
                })
                .collect())
        }
    }

    type TestLauncher = fn(&StreamSource, &Path) -> io::Result<Child>;

    fn service(root: &Path) -> StreamService<StaticSources, StaticAccess, Rot13, TestLauncher> {
        let config = SessionConfig::with_root(root).ready_poll_interval(Duration::from_millis(20));
        let manager = Arc::new(SessionManager::with_launcher(config, serving as TestLauncher));

        let sources = StaticSources::new()
            .with(SourceRecord::new(SourceId(7), "Gate", "North entrance", "egfc://pnz7"))
            .with(SourceRecord::new(SourceId(9), "Broken", "Basement", ""));
        let access = StaticAccess::new()
            .grant(SourceId(7), "alice")
            .grant(SourceId(9), "alice")
            .grant(SourceId(404), "alice");

        StreamService::new(manager, sources, access, Rot13)
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());
        let alice = ViewerId::from("alice");

        let response = assert_ok!(service.start(SourceId(7), &alice).await);
        assert_eq!(response.message, "Streaming camera North entrance");
        assert_eq!(response.playlist, "/streams/camera_7/index.m3u8");
        assert_eq!(response.outcome, JoinOutcome::Started);

        let response = assert_ok!(service.stop(SourceId(7), &alice).await);
        assert_eq!(response.message, "Stopped streaming camera 7");
        assert!(!root.path().join("camera_7").exists());
    }

    #[tokio::test]
    async fn test_access_denied() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        let err = assert_err!(service.start(SourceId(7), &ViewerId::from("mallory")).await);
        assert!(matches!(err, ServiceError::AccessDenied { .. }));
        assert_eq!(err.status_code(), 403);
        assert_eq!(service.manager().session_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_source() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        let err = assert_err!(service.start(SourceId(404), &ViewerId::from("alice")).await);
        assert!(matches!(err, ServiceError::UnknownSource(SourceId(404))));
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_decrypt_failure_does_not_launch() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        let err = assert_err!(service.start(SourceId(9), &ViewerId::from("alice")).await);
        assert!(matches!(err, ServiceError::Decrypt { .. }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(service.manager().session_count().await, 0);
    }

    #[tokio::test]
    async fn test_stop_without_session() {
        let root = tempfile::tempdir().unwrap();
        let service = service(root.path());

        let err = assert_err!(service.stop(SourceId(42), &ViewerId::from("carol")).await);
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn test_parse_source_id() {
        assert_eq!(parse_source_id("12").unwrap(), SourceId(12));

        let err = parse_source_id("twelve").unwrap_err();
        assert!(matches!(err, ServiceError::InvalidSourceId(_)));
        assert_eq!(err.status_code(), 400);
    }
}
